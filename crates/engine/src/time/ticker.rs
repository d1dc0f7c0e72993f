use std::time::Duration;

use tracing::warn;

use super::frequency::{FrequencyHistory, FrequencyStats};

pub const FREQUENCY_SAMPLE_INTERVAL: Duration = Duration::from_millis(500);
pub const BACKLOG_WARN_TICKS: u64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub owed: u64,
    pub executed: u32,
    pub backlog: u64,
    pub new_frequency_sample: bool,
}

/// Quantizes a clock's continuous time into fixed-period ticks.
///
/// Owed ticks are counted against an accounted boundary that only moves in
/// whole periods, so the tick grid never drifts. At most `max_per_frame`
/// owed ticks run per call; the rest stay in the backlog for later frames.
#[derive(Debug)]
pub struct Ticker {
    label: &'static str,
    period: Duration,
    max_per_frame: u32,
    accounted_until: Duration,
    backlog: u64,
    ticks_total: u64,
    simulated_time: Duration,
    sample_started_at: Duration,
    ticks_since_sample: u32,
    history: FrequencyHistory,
    new_sample: bool,
    backlog_warned: bool,
}

impl Ticker {
    pub fn new(label: &'static str, period: Duration, max_per_frame: u32) -> Self {
        Self {
            label,
            period: if period.is_zero() {
                Duration::from_nanos(1)
            } else {
                period
            },
            max_per_frame: max_per_frame.max(1),
            accounted_until: Duration::ZERO,
            backlog: 0,
            ticks_total: 0,
            simulated_time: Duration::ZERO,
            sample_started_at: Duration::ZERO,
            ticks_since_sample: 0,
            history: FrequencyHistory::default(),
            new_sample: false,
            backlog_warned: false,
        }
    }

    pub fn with_rate_hz(label: &'static str, rate_hz: u32, max_per_frame: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / f64::from(rate_hz.max(1)));
        Self::new(label, period, max_per_frame)
    }

    /// Pays down owed ticks for `clock_now`, calling `on_tick` with the fixed
    /// period in seconds for each one. `wall_now` drives frequency sampling
    /// so paused clocks still report a realized rate of zero.
    pub fn do_ticks<F>(
        &mut self,
        clock_now: Duration,
        wall_now: Duration,
        mut on_tick: F,
    ) -> TickReport
    where
        F: FnMut(f32),
    {
        self.new_sample = false;

        let owed = self.account(clock_now);
        self.backlog = self.backlog.saturating_add(owed);

        let to_run = self.backlog.min(u64::from(self.max_per_frame)) as u32;
        let period_seconds = self.period.as_secs_f32();
        for _ in 0..to_run {
            on_tick(period_seconds);
            self.backlog -= 1;
            self.ticks_total = self.ticks_total.saturating_add(1);
            self.simulated_time = self.simulated_time.saturating_add(self.period);
            self.ticks_since_sample = self.ticks_since_sample.saturating_add(1);
        }

        self.warn_on_backlog_growth();
        self.maybe_sample_frequency(wall_now);

        TickReport {
            owed,
            executed: to_run,
            backlog: self.backlog,
            new_frequency_sample: self.new_sample,
        }
    }

    fn account(&mut self, clock_now: Duration) -> u64 {
        let elapsed = clock_now.saturating_sub(self.accounted_until);
        let period_nanos = self.period.as_nanos();
        let owed = elapsed.as_nanos() / period_nanos;
        let advanced_nanos = owed * period_nanos;
        self.accounted_until = self
            .accounted_until
            .saturating_add(duration_from_nanos(advanced_nanos));
        u64::try_from(owed).unwrap_or(u64::MAX)
    }

    fn warn_on_backlog_growth(&mut self) {
        if self.backlog == 0 {
            self.backlog_warned = false;
            return;
        }
        if self.backlog >= BACKLOG_WARN_TICKS && !self.backlog_warned {
            self.backlog_warned = true;
            warn!(
                ticker = self.label,
                backlog = self.backlog,
                max_per_frame = self.max_per_frame,
                "tick_backlog_growing"
            );
        }
    }

    fn maybe_sample_frequency(&mut self, wall_now: Duration) {
        let elapsed = wall_now.saturating_sub(self.sample_started_at);
        if elapsed < FREQUENCY_SAMPLE_INTERVAL {
            return;
        }
        let hz = self.ticks_since_sample as f32 / elapsed.as_secs_f32().max(f32::EPSILON);
        self.history.push(hz);
        self.sample_started_at = wall_now;
        self.ticks_since_sample = 0;
        self.new_sample = true;
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn max_per_frame(&self) -> u32 {
        self.max_per_frame
    }

    pub fn backlog(&self) -> u64 {
        self.backlog
    }

    pub fn ticks_total(&self) -> u64 {
        self.ticks_total
    }

    pub fn simulated_time(&self) -> Duration {
        self.simulated_time
    }

    pub fn has_new_frequency_sample(&self) -> bool {
        self.new_sample
    }

    pub fn frequency(&self) -> FrequencyStats {
        self.history.stats()
    }
}

fn duration_from_nanos(nanos: u128) -> Duration {
    let secs = nanos / 1_000_000_000;
    let sub = (nanos % 1_000_000_000) as u32;
    Duration::new(u64::try_from(secs).unwrap_or(u64::MAX), sub)
}
