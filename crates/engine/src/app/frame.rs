use std::time::{Duration, Instant};

use tracing::info;

use crate::config::EngineConfig;
use crate::error::enforce;
use crate::time::{RealClock, TickReport, Ticker};

use super::context::{Engine, Game, TimingStats};
use super::input::InputCollector;
use super::metrics::{MetricsAccumulator, MetricsHandle};

const METRICS_LOG_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FrameReport {
    pub sim: TickReport,
    pub render: TickReport,
    /// True when at least one render tick ran and the screens should be presented.
    pub present: bool,
}

/// Owns the simulation and render tickers. Kept apart from [`Engine`] so tick
/// callbacks can hand the game a mutable engine.
#[derive(Debug)]
pub(crate) struct FrameDriver {
    sim: Ticker,
    render: Ticker,
    metrics: MetricsAccumulator,
    metrics_handle: MetricsHandle,
    last_fps: f32,
}

impl FrameDriver {
    /// Restarts the engine's wall clock at `start` so load time is not owed.
    pub(crate) fn new(
        config: &EngineConfig,
        engine: &mut Engine,
        metrics_handle: MetricsHandle,
        start: Instant,
    ) -> Self {
        engine.clocks_mut().real = RealClock::starting_at(start);
        let max_per_frame = config.max_ticks_per_frame;
        info!(
            tick_rate_hz = config.tick_rate_hz,
            render_rate_hz = config.render_rate_hz,
            max_ticks_per_frame = max_per_frame,
            time_scale = engine.time_scale(),
            "frame_driver_config"
        );
        Self {
            sim: Ticker::with_rate_hz("sim", config.tick_rate_hz, max_per_frame),
            render: Ticker::with_rate_hz("render", config.render_rate_hz, max_per_frame),
            metrics: MetricsAccumulator::new(METRICS_LOG_INTERVAL, start),
            metrics_handle,
            last_fps: 0.0,
        }
    }

    /// One loop iteration minus presentation: timing controls, clock advance,
    /// simulation ticks on game time, then render ticks on wall time.
    pub(crate) fn run_frame<G>(
        &mut self,
        now: Instant,
        engine: &mut Engine,
        game: &mut G,
        input: &mut InputCollector,
    ) -> FrameReport
    where
        G: Game + ?Sized,
    {
        for control in input.take_timing_controls() {
            engine.apply_timing_control(control);
        }

        let time = engine.clocks_mut().advance_at(now);

        let sim = self.sim.do_ticks(time.game_now, time.real_now, |dt| {
            let snapshot = input.snapshot_for_tick();
            game.update(dt, &snapshot, engine);
        });
        let render = self
            .render
            .do_ticks(time.real_now, time.real_now, |_| game.draw(engine));

        engine.set_timing_stats(TimingStats {
            sim: self.sim.frequency(),
            render: self.render.frequency(),
            sim_backlog: self.sim.backlog(),
            render_backlog: self.render.backlog(),
            sim_ticks_total: self.sim.ticks_total(),
            render_ticks_total: self.render.ticks_total(),
        });

        self.metrics.record_frame(time.real_delta);
        self.metrics
            .record_ticks(sim.executed, render.executed, sim.backlog);
        if let Some(snapshot) = self.metrics.maybe_snapshot(now) {
            self.metrics_handle.publish(snapshot);
            self.last_fps = snapshot.fps;
            info!(
                fps = snapshot.fps,
                sim_tps = snapshot.sim_tps,
                render_tps = snapshot.render_tps,
                frame_time_ms = snapshot.frame_time_ms,
                sim_backlog = snapshot.sim_backlog,
                scale = engine.time_scale(),
                paused = engine.is_paused(),
                "loop_metrics"
            );
        }

        let present = render.executed > 0;
        if present {
            enforce(engine.refresh_overlay(self.last_fps));
        }

        FrameReport {
            sim,
            render,
            present,
        }
    }
}
