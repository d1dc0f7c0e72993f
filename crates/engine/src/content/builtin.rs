use crate::geometry::IVec2;

use super::bitmap::{Bitmap, Color4};
use super::types::{Font, FontMetrics, Glyph, Sprite, Spritesheet, FIRST_GLYPH_CODE, GLYPH_COUNT};

pub const ERROR_SHEET_SIZE: u32 = 16;
const ERROR_CHECKER_CELL: u32 = 4;

pub const DEBUG_GLYPH_WIDTH: i32 = 3;
pub const DEBUG_GLYPH_HEIGHT: i32 = 5;
const DEBUG_GLYPH_CELL: i32 = DEBUG_GLYPH_WIDTH + 1;
const DEBUG_LINE_HEIGHT: i32 = DEBUG_GLYPH_HEIGHT + 2;

/// Magenta/black checker with a single sprite covering the whole sheet.
pub(crate) fn error_spritesheet() -> Spritesheet {
    let mut bitmap = Bitmap::new(ERROR_SHEET_SIZE, ERROR_SHEET_SIZE, Color4::BLACK);
    for y in 0..ERROR_SHEET_SIZE {
        for x in 0..ERROR_SHEET_SIZE {
            if (x / ERROR_CHECKER_CELL + y / ERROR_CHECKER_CELL) % 2 == 0 {
                bitmap.set(x, y, Color4::MAGENTA);
            }
        }
    }
    let size = ERROR_SHEET_SIZE as i32;
    Spritesheet {
        bitmap,
        sprites: vec![Sprite {
            position: IVec2::ZERO,
            size: IVec2::new(size, size),
            origin: IVec2::ZERO,
        }],
    }
}

/// 3x5 font covering every printable ASCII code. Serves as the error font
/// and as the performance overlay font.
pub(crate) fn debug_font() -> Font {
    let atlas_width = (GLYPH_COUNT as i32 * DEBUG_GLYPH_CELL) as u32;
    let mut bitmap = Bitmap::new(atlas_width, DEBUG_GLYPH_HEIGHT as u32, Color4::TRANSPARENT);
    let mut glyphs = Vec::with_capacity(GLYPH_COUNT);

    for (index, rows) in GLYPH_ROWS.iter().enumerate() {
        let cell_x = index as i32 * DEBUG_GLYPH_CELL;
        for (row_index, row_bits) in rows.iter().enumerate() {
            // Rows are listed top first; bitmaps are bottom-up.
            let y = DEBUG_GLYPH_HEIGHT - 1 - row_index as i32;
            for col in 0..DEBUG_GLYPH_WIDTH {
                if row_bits & (1 << (DEBUG_GLYPH_WIDTH - 1 - col)) != 0 {
                    bitmap.set((cell_x + col) as u32, y as u32, Color4::WHITE);
                }
            }
        }
        glyphs.push(Glyph {
            ascii: FIRST_GLYPH_CODE + index as u8,
            x: cell_x,
            y: 0,
            width: DEBUG_GLYPH_WIDTH,
            height: DEBUG_GLYPH_HEIGHT,
            x_offset: 0,
            y_offset: 0,
            x_advance: DEBUG_GLYPH_WIDTH,
        });
    }

    Font {
        bitmap,
        glyphs,
        metrics: FontMetrics {
            line_height: DEBUG_LINE_HEIGHT,
            baseline: 0,
            glyph_space: 1,
        },
    }
}

// ASCII 32..=126, rows top to bottom, bit 2 is the leftmost column.
#[rustfmt::skip]
const GLYPH_ROWS: [[u8; DEBUG_GLYPH_HEIGHT as usize]; GLYPH_COUNT] = [
    [0b000, 0b000, 0b000, 0b000, 0b000],
    [0b010, 0b010, 0b010, 0b000, 0b010],
    [0b101, 0b101, 0b000, 0b000, 0b000],
    [0b101, 0b111, 0b101, 0b111, 0b101],
    [0b111, 0b110, 0b111, 0b011, 0b111],
    [0b101, 0b001, 0b010, 0b100, 0b101],
    [0b010, 0b101, 0b010, 0b101, 0b011],
    [0b010, 0b010, 0b000, 0b000, 0b000],
    [0b001, 0b010, 0b010, 0b010, 0b001],
    [0b100, 0b010, 0b010, 0b010, 0b100],
    [0b000, 0b101, 0b010, 0b101, 0b000],
    [0b000, 0b010, 0b111, 0b010, 0b000],
    [0b000, 0b000, 0b000, 0b010, 0b100],
    [0b000, 0b000, 0b111, 0b000, 0b000],
    [0b000, 0b000, 0b000, 0b000, 0b010],
    [0b001, 0b001, 0b010, 0b100, 0b100],
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
    [0b000, 0b010, 0b000, 0b010, 0b000],
    [0b000, 0b010, 0b000, 0b010, 0b100],
    [0b001, 0b010, 0b100, 0b010, 0b001],
    [0b000, 0b111, 0b000, 0b111, 0b000],
    [0b100, 0b010, 0b001, 0b010, 0b100],
    [0b111, 0b001, 0b011, 0b000, 0b010],
    [0b111, 0b101, 0b111, 0b100, 0b111],
    [0b010, 0b101, 0b111, 0b101, 0b101],
    [0b110, 0b101, 0b110, 0b101, 0b110],
    [0b111, 0b100, 0b100, 0b100, 0b111],
    [0b110, 0b101, 0b101, 0b101, 0b110],
    [0b111, 0b100, 0b110, 0b100, 0b111],
    [0b111, 0b100, 0b110, 0b100, 0b100],
    [0b111, 0b100, 0b101, 0b101, 0b111],
    [0b101, 0b101, 0b111, 0b101, 0b101],
    [0b111, 0b010, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b001, 0b101, 0b111],
    [0b101, 0b101, 0b110, 0b101, 0b101],
    [0b100, 0b100, 0b100, 0b100, 0b111],
    [0b101, 0b111, 0b111, 0b101, 0b101],
    [0b101, 0b111, 0b111, 0b111, 0b101],
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b110, 0b101, 0b110, 0b100, 0b100],
    [0b111, 0b101, 0b101, 0b111, 0b001],
    [0b110, 0b101, 0b110, 0b101, 0b101],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b010, 0b010, 0b010, 0b010],
    [0b101, 0b101, 0b101, 0b101, 0b111],
    [0b101, 0b101, 0b101, 0b101, 0b010],
    [0b101, 0b101, 0b111, 0b111, 0b101],
    [0b101, 0b101, 0b010, 0b101, 0b101],
    [0b101, 0b101, 0b010, 0b010, 0b010],
    [0b111, 0b001, 0b010, 0b100, 0b111],
    [0b110, 0b100, 0b100, 0b100, 0b110],
    [0b100, 0b100, 0b010, 0b001, 0b001],
    [0b011, 0b001, 0b001, 0b001, 0b011],
    [0b010, 0b101, 0b000, 0b000, 0b000],
    [0b000, 0b000, 0b000, 0b000, 0b111],
    [0b100, 0b010, 0b000, 0b000, 0b000],
    [0b000, 0b111, 0b001, 0b111, 0b111],
    [0b100, 0b100, 0b110, 0b101, 0b110],
    [0b000, 0b111, 0b100, 0b100, 0b111],
    [0b001, 0b001, 0b111, 0b101, 0b111],
    [0b000, 0b111, 0b110, 0b100, 0b111],
    [0b011, 0b100, 0b110, 0b100, 0b100],
    [0b000, 0b111, 0b101, 0b111, 0b001],
    [0b100, 0b100, 0b110, 0b101, 0b101],
    [0b010, 0b000, 0b010, 0b010, 0b010],
    [0b001, 0b000, 0b001, 0b101, 0b010],
    [0b100, 0b101, 0b110, 0b101, 0b101],
    [0b100, 0b100, 0b100, 0b100, 0b111],
    [0b000, 0b110, 0b111, 0b101, 0b101],
    [0b000, 0b110, 0b101, 0b101, 0b101],
    [0b000, 0b111, 0b101, 0b101, 0b111],
    [0b000, 0b110, 0b101, 0b110, 0b100],
    [0b000, 0b111, 0b101, 0b111, 0b001],
    [0b000, 0b110, 0b101, 0b100, 0b100],
    [0b000, 0b111, 0b110, 0b001, 0b111],
    [0b010, 0b111, 0b010, 0b010, 0b011],
    [0b000, 0b101, 0b101, 0b101, 0b111],
    [0b000, 0b101, 0b101, 0b101, 0b010],
    [0b000, 0b101, 0b101, 0b111, 0b010],
    [0b000, 0b101, 0b010, 0b010, 0b101],
    [0b000, 0b101, 0b101, 0b111, 0b001],
    [0b000, 0b111, 0b001, 0b010, 0b111],
    [0b011, 0b010, 0b110, 0b010, 0b011],
    [0b010, 0b010, 0b010, 0b010, 0b010],
    [0b110, 0b010, 0b011, 0b010, 0b110],
    [0b000, 0b011, 0b110, 0b000, 0b000],
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::types::GlyphTable;
    use crate::content::validate::{build_font, build_spritesheet};

    fn opaque_pixels(font: &Font, ch: char) -> usize {
        let glyph = font.glyph(ch).expect("glyph");
        let mut count = 0;
        for x in 0..glyph.width {
            for y in 0..glyph.height {
                let px = font.bitmap().get((glyph.x + x) as u32, (glyph.y + y) as u32);
                if px.is_some_and(|px| !px.is_transparent()) {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn error_sheet_is_opaque_and_valid() {
        let sheet = error_spritesheet();
        assert!(sheet.bitmap().pixels().iter().all(|px| !px.is_transparent()));
        assert_eq!(sheet.bitmap().get(0, 0), Some(Color4::MAGENTA));
        assert_eq!(sheet.bitmap().get(4, 0), Some(Color4::BLACK));
        assert!(build_spritesheet(sheet.bitmap.clone(), sheet.sprites.clone()).is_ok());
    }

    #[test]
    fn debug_font_is_valid() {
        let font = debug_font();
        let table = GlyphTable {
            metrics: font.metrics,
            glyphs: font.glyphs.clone(),
        };
        assert!(build_font(font.bitmap.clone(), table).is_ok());
    }

    #[test]
    fn space_is_blank_and_letters_are_not() {
        let font = debug_font();
        assert_eq!(opaque_pixels(&font, ' '), 0);
        assert!(opaque_pixels(&font, 'A') > 0);
        assert!(opaque_pixels(&font, '~') > 0);
    }

    #[test]
    fn first_glyph_row_lands_on_top_bitmap_row() {
        let font = debug_font();
        let glyph = font.glyph('T').expect("glyph");
        for col in 0..DEBUG_GLYPH_WIDTH {
            assert_eq!(
                font.bitmap().get((glyph.x + col) as u32, 4),
                Some(Color4::WHITE)
            );
        }
        assert_eq!(font.bitmap().get(glyph.x as u32, 0), Some(Color4::TRANSPARENT));
    }
}
