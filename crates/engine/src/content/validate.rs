use crate::geometry::{Aabb, IVec2};

use super::bitmap::Bitmap;
use super::types::{
    Font, Glyph, GlyphTable, LoadError, Sprite, Spritesheet, FIRST_GLYPH_CODE,
    GLYPH_CODE_CHECKSUM, GLYPH_COUNT, LAST_GLYPH_CODE,
};

pub(crate) fn build_spritesheet(
    bitmap: Bitmap,
    sprites: Vec<Sprite>,
) -> Result<Spritesheet, LoadError> {
    if sprites.is_empty() {
        return Err(LoadError::NoSprites);
    }
    let bounds = bitmap_bounds(&bitmap);
    for (index, sprite) in sprites.iter().enumerate() {
        if sprite.size.x <= 0 || sprite.size.y <= 0 {
            return Err(LoadError::EmptySprite {
                index,
                size: sprite.size,
            });
        }
        let fits = sprite
            .sheet_rect()
            .is_some_and(|rect| contains_rect(&bounds, &rect));
        if !fits {
            return Err(LoadError::SpriteOutOfBounds {
                index,
                position: sprite.position,
                size: sprite.size,
                width: bitmap.width(),
                height: bitmap.height(),
            });
        }
        if !origin_within(sprite.origin, sprite.size) {
            return Err(LoadError::OriginOutsideSprite {
                index,
                origin: sprite.origin,
                size: sprite.size,
            });
        }
    }
    Ok(Spritesheet { bitmap, sprites })
}

pub(crate) fn build_font(bitmap: Bitmap, table: GlyphTable) -> Result<Font, LoadError> {
    if table.glyphs.len() != GLYPH_COUNT {
        return Err(LoadError::GlyphCount {
            found: table.glyphs.len(),
            expected: GLYPH_COUNT,
        });
    }
    let checksum: u32 = table.glyphs.iter().map(|glyph| u32::from(glyph.ascii)).sum();
    if checksum != GLYPH_CODE_CHECKSUM {
        return Err(LoadError::GlyphChecksum {
            found: checksum,
            expected: GLYPH_CODE_CHECKSUM,
        });
    }

    let bounds = bitmap_bounds(&bitmap);
    let mut slots: Vec<Option<Glyph>> = vec![None; GLYPH_COUNT];
    for glyph in table.glyphs {
        if !(FIRST_GLYPH_CODE..=LAST_GLYPH_CODE).contains(&glyph.ascii) {
            return Err(LoadError::BadGlyphCode { ascii: glyph.ascii });
        }
        let slot = &mut slots[usize::from(glyph.ascii - FIRST_GLYPH_CODE)];
        if slot.is_some() {
            return Err(LoadError::BadGlyphCode { ascii: glyph.ascii });
        }
        // Zero-sized glyphs (space) only advance the pen.
        let drawn = glyph.width > 0 && glyph.height > 0;
        let fits = !drawn
            || Aabb::checked_from_min_size(
                IVec2::new(glyph.x, glyph.y),
                IVec2::new(glyph.width, glyph.height),
            )
            .is_some_and(|rect| contains_rect(&bounds, &rect));
        if glyph.width < 0 || glyph.height < 0 || !fits {
            return Err(LoadError::GlyphOutOfBounds {
                ascii: glyph.ascii,
                width: bitmap.width(),
                height: bitmap.height(),
            });
        }
        *slot = Some(glyph);
    }

    // Count and checksum passed and there were no duplicates, so every slot is filled.
    let glyphs: Vec<Glyph> = slots.into_iter().flatten().collect();
    if glyphs.len() != GLYPH_COUNT {
        return Err(LoadError::GlyphCount {
            found: glyphs.len(),
            expected: GLYPH_COUNT,
        });
    }
    Ok(Font {
        bitmap,
        glyphs,
        metrics: table.metrics,
    })
}

fn bitmap_bounds(bitmap: &Bitmap) -> Aabb {
    Aabb::from_min_size(
        IVec2::ZERO,
        IVec2::new(bitmap.width() as i32, bitmap.height() as i32),
    )
}

fn contains_rect(outer: &Aabb, inner: &Aabb) -> bool {
    !inner.is_empty()
        && inner.xmin >= outer.xmin
        && inner.ymin >= outer.ymin
        && inner.xmax <= outer.xmax
        && inner.ymax <= outer.ymax
}

fn origin_within(origin: IVec2, size: IVec2) -> bool {
    origin.x >= 0 && origin.y >= 0 && origin.x < size.x && origin.y < size.y
}
