mod compositor;
mod rasterizer;
mod screen;
mod surface;

pub use compositor::{Compositor, Mirror, RectStyle};
pub use rasterizer::{FrameRasterizer, PointRasterizer};
pub use screen::{PixelMode, PixelShader, PointPosition, PositionMode, Screen, ScreenId, SizeMode};
pub(crate) use surface::WindowSurface;
