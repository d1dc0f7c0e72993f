use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::context::Engine;

use super::rasterizer::FrameRasterizer;

/// Window-sized `pixels` framebuffer the engine presents into, one device
/// pixel per framebuffer pixel.
pub(crate) struct WindowSurface {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl WindowSurface {
    pub(crate) fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);
        let pixels = Self::build_pixels(Arc::clone(&window), width, height)?;
        Ok(Self {
            window,
            pixels,
            width,
            height,
        })
    }

    pub(crate) fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn present(&mut self, engine: &Engine) -> Result<(), Error> {
        match FrameRasterizer::new(self.pixels.frame_mut(), self.width, self.height) {
            Some(mut rasterizer) => engine.present(&mut rasterizer),
            None => {
                warn!(
                    width = self.width,
                    height = self.height,
                    "surface_frame_size_mismatch"
                );
                return Ok(());
            }
        }
        self.pixels.render()
    }
}
