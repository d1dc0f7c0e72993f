mod context;
mod frame;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod tools;

pub use context::{Engine, Game, TimingStats};
pub use input::{InputAction, InputSnapshot, TimingControl};
pub use loop_runner::{run_app, run_app_with_metrics, AppError, SLOW_FRAME_ENV_VAR};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{
    Compositor, FrameRasterizer, Mirror, PixelMode, PixelShader, PointPosition, PointRasterizer,
    PositionMode, RectStyle, Screen, ScreenId, SizeMode,
};
