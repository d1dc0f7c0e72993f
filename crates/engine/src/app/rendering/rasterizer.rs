use crate::content::Color4;

use super::screen::PointPosition;

/// Device bridge the compositor presents through: one point draw call per
/// enabled screen, bracketed by a clear and a swap.
pub trait PointRasterizer {
    fn clear(&mut self, color: Color4);
    fn draw_points(&mut self, colors: &[Color4], points: &[PointPosition], point_size: u32);
    fn swap(&mut self);
}

/// Rasterizes points into a top-down RGBA8 frame, such as the `pixels`
/// surface buffer. Points are squares of `point_size` device pixels.
pub struct FrameRasterizer<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameRasterizer<'a> {
    /// Returns `None` when `frame` is not exactly `width * height` RGBA8 pixels.
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Option<Self> {
        if frame.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            frame,
            width,
            height,
        })
    }

    fn fill_square(&mut self, left: i32, bottom: i32, size: i32, rgba: [u8; 4]) {
        let x0 = left.max(0);
        let x1 = (left + size).min(self.width as i32);
        let y0 = bottom.max(0);
        let y1 = (bottom + size).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let stride = self.width as usize * 4;
        for y_up in y0..y1 {
            let row = (self.height as i32 - 1 - y_up) as usize;
            let start = row * stride + x0 as usize * 4;
            let end = row * stride + x1 as usize * 4;
            for chunk in self.frame[start..end].chunks_exact_mut(4) {
                chunk.copy_from_slice(&rgba);
            }
        }
    }
}

impl PointRasterizer for FrameRasterizer<'_> {
    fn clear(&mut self, color: Color4) {
        let rgba = color.to_array();
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&rgba);
        }
    }

    fn draw_points(&mut self, colors: &[Color4], points: &[PointPosition], point_size: u32) {
        let size = point_size as i32;
        let half = point_size as f32 / 2.0;
        for (color, point) in colors.iter().zip(points) {
            if color.is_transparent() {
                continue;
            }
            let left = (point.x - half).round() as i32;
            let bottom = (point.y - half).round() as i32;
            self.fill_square(left, bottom, size, color.to_array());
        }
    }

    // The owner of the frame presents it.
    fn swap(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(frame: &[u8], width: u32, x: u32, row_from_top: u32) -> [u8; 4] {
        let offset = (row_from_top * width + x) as usize * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn rejects_mismatched_frame_length() {
        let mut frame = vec![0u8; 10];
        assert!(FrameRasterizer::new(&mut frame, 2, 2).is_none());
    }

    #[test]
    fn points_become_squares_with_y_flipped() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        {
            let mut rasterizer = FrameRasterizer::new(&mut frame, 4, 4).expect("rasterizer");
            rasterizer.clear(Color4::BLACK);
            rasterizer.draw_points(
                &[Color4::RED, Color4::TRANSPARENT],
                &[
                    PointPosition { x: 1.0, y: 1.0 },
                    PointPosition { x: 3.0, y: 3.0 },
                ],
                2,
            );
        }

        // Bottom-left 2x2 block is the bottom two rows of the top-down frame.
        assert_eq!(pixel(&frame, 4, 0, 3), [255, 0, 0, 255]);
        assert_eq!(pixel(&frame, 4, 1, 2), [255, 0, 0, 255]);
        assert_eq!(pixel(&frame, 4, 2, 2), [0, 0, 0, 255]);
        // Transparent point left the clear colour in place.
        assert_eq!(pixel(&frame, 4, 3, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn squares_are_clipped_at_the_frame_edge() {
        let mut frame = vec![0u8; 2 * 2 * 4];
        {
            let mut rasterizer = FrameRasterizer::new(&mut frame, 2, 2).expect("rasterizer");
            rasterizer.draw_points(&[Color4::GREEN], &[PointPosition { x: 2.0, y: 0.0 }], 4);
        }
        assert_eq!(pixel(&frame, 2, 0, 1), [0, 255, 0, 255]);
        assert_eq!(pixel(&frame, 2, 1, 0), [0, 255, 0, 255]);
    }
}
