mod clock;
mod frequency;
mod ticker;

pub use clock::{
    ClockPair, FrameTime, GameClock, RealClock, DEFAULT_SCALE, MAX_SCALE, SCALE_STEP,
};
pub use frequency::{FrequencyStats, FREQUENCY_HISTORY_LEN};
pub use ticker::{TickReport, Ticker, BACKLOG_WARN_TICKS, FREQUENCY_SAMPLE_INTERVAL};
