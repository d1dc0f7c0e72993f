use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::warn;

static POISON_REPORTED: AtomicBool = AtomicBool::new(false);

/// Logs the first poisoned access and hands back the guard regardless.
fn recover_poisoned<G>(operation: &'static str, poisoned: PoisonError<G>) -> G {
    if !POISON_REPORTED.swap(true, Ordering::Relaxed) {
        warn!(operation, "metrics_lock_poisoned_recovered");
    }
    poisoned.into_inner()
}

/// Loop rates averaged over the last reporting interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub sim_tps: f32,
    pub render_tps: f32,
    pub frame_time_ms: f32,
    pub sim_backlog: u64,
}

/// Shareable read side of the loop metrics.
#[derive(Clone, Debug, Default)]
pub struct MetricsHandle {
    snapshot: Arc<RwLock<LoopMetricsSnapshot>>,
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        *self
            .snapshot
            .read()
            .unwrap_or_else(|poisoned| recover_poisoned("read", poisoned))
    }

    pub(crate) fn publish(&self, snapshot: LoopMetricsSnapshot) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| recover_poisoned("write", poisoned)) = snapshot;
    }
}

/// Totals gathered since the last snapshot.
#[derive(Debug, Default)]
struct IntervalCounters {
    frames: u32,
    frame_time: Duration,
    sim_ticks: u32,
    render_ticks: u32,
}

impl IntervalCounters {
    fn rates(&self, elapsed: Duration, sim_backlog: u64) -> LoopMetricsSnapshot {
        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let per_second = |count: u32| count as f32 / seconds;
        let frame_time_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time.as_secs_f32() * 1000.0 / frames as f32,
        };
        LoopMetricsSnapshot {
            fps: per_second(self.frames),
            sim_tps: per_second(self.sim_ticks),
            render_tps: per_second(self.render_ticks),
            frame_time_ms,
            sim_backlog,
        }
    }
}

/// Folds per-frame timings into one snapshot per `interval` of wall time.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval: Duration,
    interval_start: Instant,
    counters: IntervalCounters,
    sim_backlog: u64,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            interval_start: start,
            counters: IntervalCounters::default(),
            sim_backlog: 0,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.counters.frames = self.counters.frames.saturating_add(1);
        self.counters.frame_time = self.counters.frame_time.saturating_add(frame_dt);
    }

    pub(crate) fn record_ticks(&mut self, sim_ticks: u32, render_ticks: u32, sim_backlog: u64) {
        self.counters.sim_ticks = self.counters.sim_ticks.saturating_add(sim_ticks);
        self.counters.render_ticks = self.counters.render_ticks.saturating_add(render_ticks);
        self.sim_backlog = sim_backlog;
    }

    /// Emits and restarts the interval once `interval` has passed.
    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }
        self.interval_start = now;
        let counters = mem::take(&mut self.counters);
        Some(counters.rates(elapsed, self.sim_backlog))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::RwLock;
    use std::thread;

    use super::*;

    fn poison_lock(lock: &RwLock<LoopMetricsSnapshot>) {
        thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = lock.write().expect("write guard");
                    panic!("poison metrics lock");
                })
                .join();
        });
    }

    #[test]
    fn snapshot_averages_over_the_interval() {
        let base = Instant::now();
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1), base);

        accumulator.record_frame(Duration::from_millis(16));
        accumulator.record_frame(Duration::from_millis(16));
        accumulator.record_ticks(3, 1, 0);
        accumulator.record_ticks(1, 1, 7);

        let snapshot = accumulator
            .maybe_snapshot(base + Duration::from_secs(1))
            .expect("snapshot should be emitted");

        assert!((snapshot.fps - 2.0).abs() < 0.05);
        assert!((snapshot.sim_tps - 4.0).abs() < 0.05);
        assert!((snapshot.render_tps - 2.0).abs() < 0.05);
        assert!((snapshot.frame_time_ms - 16.0).abs() < 0.001);
        assert_eq!(snapshot.sim_backlog, 7);
    }

    #[test]
    fn counters_restart_after_each_snapshot() {
        let base = Instant::now();
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1), base);
        accumulator.record_frame(Duration::from_millis(10));
        accumulator.record_ticks(5, 5, 0);
        accumulator
            .maybe_snapshot(base + Duration::from_secs(1))
            .expect("first");

        let second = accumulator
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("second");
        assert_eq!(second.fps, 0.0);
        assert_eq!(second.sim_tps, 0.0);
        assert_eq!(second.frame_time_ms, 0.0);
    }

    #[test]
    fn snapshot_not_emitted_before_interval() {
        let base = Instant::now();
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1), base);
        accumulator.record_frame(Duration::from_millis(16));

        assert!(accumulator
            .maybe_snapshot(base + Duration::from_millis(500))
            .is_none());
    }

    #[test]
    fn handle_recovers_after_poison_without_panic() {
        let handle = MetricsHandle::default();
        poison_lock(handle.snapshot.as_ref());

        assert_eq!(handle.snapshot(), LoopMetricsSnapshot::default());

        let expected = LoopMetricsSnapshot {
            fps: 15.0,
            sim_tps: 60.0,
            render_tps: 15.0,
            frame_time_ms: 11.0,
            sim_backlog: 3,
        };
        handle.publish(expected);
        assert_eq!(handle.snapshot(), expected);
    }
}
