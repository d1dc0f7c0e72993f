use std::time::{Duration, Instant};

pub const DEFAULT_SCALE: f32 = 1.0;
pub const SCALE_STEP: f32 = 0.1;
pub const MAX_SCALE: f32 = 10.0;

/// Monotonic wall clock measured from construction.
#[derive(Debug, Clone)]
pub struct RealClock {
    start: Instant,
    now: Duration,
}

impl RealClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            now: Duration::ZERO,
        }
    }

    /// Samples the wall clock and returns the delta since the previous sample.
    pub fn sample(&mut self) -> Duration {
        self.sample_at(Instant::now())
    }

    pub fn sample_at(&mut self, instant: Instant) -> Duration {
        let since_start = instant.saturating_duration_since(self.start);
        let next = since_start.max(self.now);
        let delta = next - self.now;
        self.now = next;
        delta
    }

    pub fn now(&self) -> Duration {
        self.now
    }
}

impl Default for RealClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Virtual clock driven by real deltas; scalable and pausable.
#[derive(Debug, Clone)]
pub struct GameClock {
    now: Duration,
    scale: f32,
    paused: bool,
}

impl GameClock {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            scale: DEFAULT_SCALE,
            paused: false,
        }
    }

    pub fn advance(&mut self, real_delta: Duration) -> Duration {
        if self.paused || self.scale == 0.0 {
            return Duration::ZERO;
        }
        let game_delta = if self.scale == DEFAULT_SCALE {
            real_delta
        } else {
            real_delta.mul_f32(self.scale)
        };
        self.now = self.now.saturating_add(game_delta);
        game_delta
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = normalize_scale(scale);
    }

    pub fn increment_scale(&mut self) {
        self.set_scale(self.scale + SCALE_STEP);
    }

    pub fn decrement_scale(&mut self) {
        self.set_scale(self.scale - SCALE_STEP);
    }

    pub fn reset_scale(&mut self) {
        self.scale = DEFAULT_SCALE;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_scale(scale: f32) -> f32 {
    if !scale.is_finite() {
        return DEFAULT_SCALE;
    }
    // Rounded to the step grid so repeated +/- presses return to exact values.
    let snapped = (scale / SCALE_STEP).round() * SCALE_STEP;
    snapped.clamp(0.0, MAX_SCALE)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    pub real_delta: Duration,
    pub game_delta: Duration,
    pub real_now: Duration,
    pub game_now: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct ClockPair {
    pub real: RealClock,
    pub game: GameClock,
}

impl ClockPair {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            real: RealClock::starting_at(start),
            game: GameClock::new(),
        }
    }

    pub fn advance(&mut self) -> FrameTime {
        self.advance_at(Instant::now())
    }

    pub fn advance_at(&mut self, instant: Instant) -> FrameTime {
        let real_delta = self.real.sample_at(instant);
        let game_delta = self.game.advance(real_delta);
        FrameTime {
            real_delta,
            game_delta,
            real_now: self.real.now(),
            game_now: self.game.now(),
        }
    }
}
