/// Alpha value treated as "not drawn". There is no blending.
pub const ALPHA_KEY: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color4 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color4 {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const fn is_transparent(self) -> bool {
        self.a == ALPHA_KEY
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Color4 {
    fn from(value: [u8; 4]) -> Self {
        Self::rgba(value[0], value[1], value[2], value[3])
    }
}

/// Owned pixel grid, row-major with row 0 at the bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<Color4>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, fill: Color4) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Returns `None` when `pixels` does not hold exactly `width * height` entries.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color4>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds a bitmap from top-down RGBA8 rows, the layout image decoders produce.
    pub fn from_rgba8_top_down(width: u32, height: u32, rgba: &[u8]) -> Option<Self> {
        let row_len = width as usize * 4;
        if rgba.len() != row_len * height as usize {
            return None;
        }
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for row in rgba.chunks_exact(row_len.max(1)).rev() {
            pixels.extend(row.chunks_exact(4).map(|px| Color4::rgba(px[0], px[1], px[2], px[3])));
        }
        Some(Self {
            width,
            height,
            pixels,
        })
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

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Color4> {
        self.index_of(x, y).map(|index| self.pixels[index])
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color4) -> bool {
        match self.index_of(x, y) {
            Some(index) => {
                self.pixels[index] = color;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_down_rows_are_flipped_to_bottom_up() {
        let rgba = [
            1, 1, 1, 255, 2, 2, 2, 255, // top row
            3, 3, 3, 255, 4, 4, 4, 0, // bottom row
        ];
        let bitmap = Bitmap::from_rgba8_top_down(2, 2, &rgba).expect("bitmap");

        assert_eq!(bitmap.get(0, 0), Some(Color4::rgba(3, 3, 3, 255)));
        assert_eq!(bitmap.get(1, 0), Some(Color4::rgba(4, 4, 4, 0)));
        assert_eq!(bitmap.get(0, 1), Some(Color4::rgba(1, 1, 1, 255)));
    }

    #[test]
    fn mismatched_buffer_lengths_are_rejected() {
        assert!(Bitmap::from_rgba8_top_down(2, 2, &[0; 12]).is_none());
        assert!(Bitmap::from_pixels(3, 1, vec![Color4::BLACK; 2]).is_none());
    }

    #[test]
    fn out_of_bounds_access_is_checked() {
        let mut bitmap = Bitmap::new(4, 2, Color4::TRANSPARENT);
        assert_eq!(bitmap.get(4, 0), None);
        assert!(!bitmap.set(0, 2, Color4::RED));
        assert!(bitmap.set(3, 1, Color4::RED));
        assert_eq!(bitmap.index_of(3, 1), Some(7));
    }
}
