use std::fmt;

use crate::content::Color4;
use crate::geometry::IVec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(pub usize);

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeMode {
    /// One device pixel per virtual pixel.
    AutoMin,
    /// Largest integer scale that fits the window on both axes.
    #[default]
    AutoMax,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionMode {
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMode {
    Normal,
    Shader,
}

/// Per-pixel hook `(color, x, y) -> color` run on every primitive write while
/// the screen is in shader mode.
pub type PixelShader = Box<dyn Fn(Color4, i32, i32) -> Color4>;

/// Centre of a virtual pixel in window space, y-up with the origin at the
/// bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointPosition {
    pub x: f32,
    pub y: f32,
}

/// Grid of virtual pixels with a fixed resolution. Resizing the window only
/// changes `pixel_size`, `position` and the point positions.
pub struct Screen {
    width: u32,
    height: u32,
    pixels: Vec<Color4>,
    points: Vec<PointPosition>,
    pixel_size: u32,
    position: IVec2,
    size_mode: SizeMode,
    position_mode: PositionMode,
    manual_pixel_size: u32,
    manual_position: IVec2,
    enabled: bool,
    shader: Option<PixelShader>,
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixel_size", &self.pixel_size)
            .field("position", &self.position)
            .field("size_mode", &self.size_mode)
            .field("position_mode", &self.position_mode)
            .field("enabled", &self.enabled)
            .field("pixel_mode", &self.pixel_mode())
            .finish()
    }
}

impl Screen {
    pub(crate) fn new(width: u32, height: u32, window_size: (u32, u32)) -> Self {
        let count = width as usize * height as usize;
        let mut screen = Self {
            width,
            height,
            pixels: vec![Color4::TRANSPARENT; count],
            points: vec![PointPosition::default(); count],
            pixel_size: 1,
            position: IVec2::ZERO,
            size_mode: SizeMode::default(),
            position_mode: PositionMode::default(),
            manual_pixel_size: 1,
            manual_position: IVec2::ZERO,
            enabled: true,
            shader: None,
        };
        screen.relayout(window_size);
        screen
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color4] {
        &self.pixels
    }

    pub fn points(&self) -> &[PointPosition] {
        &self.points
    }

    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    /// Bottom-left corner of the screen in window space.
    pub fn position(&self) -> IVec2 {
        self.position
    }

    pub fn size_mode(&self) -> SizeMode {
        self.size_mode
    }

    pub fn position_mode(&self) -> PositionMode {
        self.position_mode
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn pixel_mode(&self) -> PixelMode {
        if self.shader.is_some() {
            PixelMode::Shader
        } else {
            PixelMode::Normal
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Color4> {
        self.index_of(x, y).map(|index| self.pixels[index])
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_size_mode(&mut self, mode: SizeMode, window_size: (u32, u32)) {
        self.size_mode = mode;
        self.relayout(window_size);
    }

    pub(crate) fn set_position_mode(&mut self, mode: PositionMode, window_size: (u32, u32)) {
        self.position_mode = mode;
        self.relayout(window_size);
    }

    pub(crate) fn set_manual_pixel_size(&mut self, pixel_size: u32, window_size: (u32, u32)) {
        self.manual_pixel_size = pixel_size;
        self.relayout(window_size);
    }

    pub(crate) fn set_manual_position(&mut self, position: IVec2, window_size: (u32, u32)) {
        self.manual_position = position;
        self.relayout(window_size);
    }

    pub(crate) fn set_shader(&mut self, shader: Option<PixelShader>) {
        self.shader = shader;
    }

    pub(crate) fn relayout(&mut self, (window_width, window_height): (u32, u32)) {
        self.pixel_size = match self.size_mode {
            SizeMode::AutoMin => 1,
            SizeMode::AutoMax => (window_width / self.width)
                .min(window_height / self.height)
                .max(1),
            SizeMode::Manual => self.manual_pixel_size,
        };

        let extent_x = extent(self.width, self.pixel_size).unwrap_or(i32::MAX);
        let extent_y = extent(self.height, self.pixel_size).unwrap_or(i32::MAX);
        let free_x = window_span(window_width).saturating_sub(extent_x);
        let free_y = window_span(window_height).saturating_sub(extent_y);
        self.position = match self.position_mode {
            PositionMode::Center => IVec2::new(free_x / 2, free_y / 2),
            PositionMode::TopLeft => IVec2::new(0, free_y),
            PositionMode::TopRight => IVec2::new(free_x, free_y),
            PositionMode::BottomLeft => IVec2::ZERO,
            PositionMode::BottomRight => IVec2::new(free_x, 0),
            PositionMode::Manual => self.manual_position,
        };

        let size = self.pixel_size as f32;
        let half = size / 2.0;
        for y in 0..self.height {
            for x in 0..self.width {
                let index = y as usize * self.width as usize + x as usize;
                self.points[index] = PointPosition {
                    x: self.position.x as f32 + x as f32 * size + half,
                    y: self.position.y as f32 + y as f32 * size + half,
                };
            }
        }
    }

    pub(crate) fn clear(&mut self, color: Color4) {
        self.pixels.fill(color);
    }

    /// Writes one pixel, clipped, skipping alpha-keyed colours and running
    /// the shader when one is installed.
    pub(crate) fn plot(&mut self, x: i32, y: i32, color: Color4) {
        if color.is_transparent() {
            return;
        }
        let Some(index) = self.index_of(x, y) else {
            return;
        };
        self.pixels[index] = match &self.shader {
            Some(shader) => shader(color, x, y),
            None => color,
        };
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

fn window_span(size: u32) -> i32 {
    i32::try_from(size).unwrap_or(i32::MAX)
}

/// Device-space span of `pixels` virtual pixels, `None` past `i32::MAX`.
pub(crate) fn extent(pixels: u32, pixel_size: u32) -> Option<i32> {
    pixels
        .checked_mul(pixel_size)
        .and_then(|span| i32::try_from(span).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_max_centres_arcade_screen_in_window() {
        let screen = Screen::new(224, 256, (800, 600));

        assert_eq!(screen.pixel_size(), 2);
        assert_eq!(screen.position(), IVec2::new(176, 44));
    }

    #[test]
    fn corner_modes_pin_the_matching_edges() {
        let mut screen = Screen::new(100, 50, (800, 600));
        screen.set_size_mode(SizeMode::AutoMin, (800, 600));

        screen.set_position_mode(PositionMode::TopRight, (800, 600));
        assert_eq!(screen.position(), IVec2::new(700, 550));

        screen.set_position_mode(PositionMode::BottomLeft, (800, 600));
        assert_eq!(screen.position(), IVec2::ZERO);

        screen.set_position_mode(PositionMode::TopLeft, (800, 600));
        assert_eq!(screen.position(), IVec2::new(0, 550));

        screen.set_position_mode(PositionMode::BottomRight, (800, 600));
        assert_eq!(screen.position(), IVec2::new(700, 0));
    }

    #[test]
    fn auto_max_never_drops_below_one() {
        let screen = Screen::new(1000, 1000, (800, 600));
        assert_eq!(screen.pixel_size(), 1);
        assert_eq!(screen.position(), IVec2::new(-100, -200));
    }

    #[test]
    fn manual_modes_use_stored_values() {
        let mut screen = Screen::new(10, 10, (800, 600));
        screen.set_manual_pixel_size(3, (800, 600));
        screen.set_size_mode(SizeMode::Manual, (800, 600));
        screen.set_manual_position(IVec2::new(5, 7), (800, 600));
        screen.set_position_mode(PositionMode::Manual, (800, 600));

        assert_eq!(screen.pixel_size(), 3);
        assert_eq!(screen.position(), IVec2::new(5, 7));
        assert_eq!(screen.points()[0], PointPosition { x: 6.5, y: 8.5 });
        assert_eq!(screen.points()[11], PointPosition { x: 9.5, y: 11.5 });
    }

    #[test]
    fn resize_keeps_the_buffer_and_moves_the_points() {
        let mut screen = Screen::new(224, 256, (800, 600));
        screen.plot(3, 4, Color4::RED);

        screen.relayout((1920, 1080));

        assert_eq!(screen.pixel_size(), 4);
        assert_eq!(screen.pixels().len(), 224 * 256);
        assert_eq!(screen.get(3, 4), Some(Color4::RED));
        assert_eq!(screen.points()[0], PointPosition { x: 514.0, y: 30.0 });
    }

    #[test]
    fn plot_clips_and_skips_alpha_key() {
        let mut screen = Screen::new(4, 4, (4, 4));
        screen.plot(-1, 0, Color4::RED);
        screen.plot(4, 0, Color4::RED);
        screen.plot(1, 1, Color4::TRANSPARENT);
        screen.plot(2, 2, Color4::GREEN);

        assert_eq!(screen.get(1, 1), Some(Color4::TRANSPARENT));
        assert_eq!(screen.get(2, 2), Some(Color4::GREEN));
        assert_eq!(
            screen.pixels().iter().filter(|px| !px.is_transparent()).count(),
            1
        );
    }

    #[test]
    fn shader_sees_coordinates_and_rewrites_colour() {
        let mut screen = Screen::new(4, 4, (4, 4));
        screen.set_shader(Some(Box::new(|color, x, _y| {
            if x % 2 == 0 {
                Color4::BLUE
            } else {
                color
            }
        })));
        assert_eq!(screen.pixel_mode(), PixelMode::Shader);

        screen.plot(0, 0, Color4::RED);
        screen.plot(1, 0, Color4::RED);

        assert_eq!(screen.get(0, 0), Some(Color4::BLUE));
        assert_eq!(screen.get(1, 0), Some(Color4::RED));
    }
}
