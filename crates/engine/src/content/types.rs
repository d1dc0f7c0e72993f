use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::asset_names::AssetNameError;
use crate::error::ErrorKind;
use crate::geometry::{Aabb, IVec2};

use super::bitmap::Bitmap;

pub const FIRST_GLYPH_CODE: u8 = 32;
pub const LAST_GLYPH_CODE: u8 = 126;
pub const GLYPH_COUNT: usize = (LAST_GLYPH_CODE - FIRST_GLYPH_CODE + 1) as usize;
/// Sum of every printable ASCII code; a font's glyph codes must add up to it.
pub const GLYPH_CODE_CHECKSUM: u32 = (FIRST_GLYPH_CODE as u32 + LAST_GLYPH_CODE as u32)
    * GLYPH_COUNT as u32
    / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(pub u32);

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sub-rectangle of a spritesheet bitmap. `position` is the bottom-left
/// pixel in sheet space; `origin` is the draw anchor relative to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub position: IVec2,
    pub size: IVec2,
    pub origin: IVec2,
}

impl Sprite {
    /// Area covered in the parent bitmap, `None` if it does not fit in i32.
    pub fn sheet_rect(&self) -> Option<Aabb> {
        Aabb::checked_from_min_size(self.position, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ascii: u8,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub x_advance: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontMetrics {
    pub line_height: i32,
    pub baseline: i32,
    pub glyph_space: i32,
}

/// Decoded, unvalidated font metadata as delivered by an asset source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphTable {
    pub metrics: FontMetrics,
    pub glyphs: Vec<Glyph>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spritesheet {
    pub(crate) bitmap: Bitmap,
    pub(crate) sprites: Vec<Sprite>,
}

impl Spritesheet {
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprite(&self, index: usize) -> Option<&Sprite> {
        self.sprites.get(index)
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.bitmap.width() as i32, self.bitmap.height() as i32)
    }
}

/// Bitmap font with exactly one glyph per printable ASCII code, indexed by
/// `code - FIRST_GLYPH_CODE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    pub(crate) bitmap: Bitmap,
    pub(crate) glyphs: Vec<Glyph>,
    pub(crate) metrics: FontMetrics,
}

impl Font {
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        let code = u32::from(ch);
        if code < u32::from(FIRST_GLYPH_CODE) || code > u32::from(LAST_GLYPH_CODE) {
            return None;
        }
        self.glyphs.get((code - u32::from(FIRST_GLYPH_CODE)) as usize)
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid asset name: {0}")]
    InvalidName(#[from] AssetNameError),
    #[error("asset not found: {name}")]
    NotFound { name: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to parse metadata {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
    #[error("metadata {path}: expected root element <{expected}>, found <{found}>")]
    UnexpectedRoot {
        path: PathBuf,
        expected: &'static str,
        found: String,
    },
    #[error("metadata {path}: <{element}> attribute '{attribute}' is missing or not an integer")]
    BadAttribute {
        path: PathBuf,
        element: &'static str,
        attribute: &'static str,
    },
    #[error("spritesheet has no sprites")]
    NoSprites,
    #[error("sprite {index} has an empty size {size:?}")]
    EmptySprite { index: usize, size: IVec2 },
    #[error("sprite {index} at {position:?} size {size:?} exceeds bitmap {width}x{height}")]
    SpriteOutOfBounds {
        index: usize,
        position: IVec2,
        size: IVec2,
        width: u32,
        height: u32,
    },
    #[error("sprite {index} origin {origin:?} is outside its size {size:?}")]
    OriginOutsideSprite {
        index: usize,
        origin: IVec2,
        size: IVec2,
    },
    #[error("font has {found} glyphs, expected {expected}")]
    GlyphCount { found: usize, expected: usize },
    #[error("font glyph code checksum is {found}, expected {expected}")]
    GlyphChecksum { found: u32, expected: u32 },
    #[error("font glyph code {ascii} is not printable ASCII or is duplicated")]
    BadGlyphCode { ascii: u8 },
    #[error("glyph {ascii} rect exceeds bitmap {width}x{height}")]
    GlyphOutOfBounds { ascii: u8, width: u32, height: u32 },
    #[error("decoded image {path} has a pixel buffer that does not match {width}x{height}")]
    DecodedSizeMismatch {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}

impl LoadError {
    /// Load failures never reach the caller; they are swapped for the error resource.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::LoadFallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Color4;

    #[test]
    fn decode_mismatch_names_the_file_and_falls_back() {
        let error = LoadError::DecodedSizeMismatch {
            path: PathBuf::from("sprites/ships.png"),
            width: 16,
            height: 8,
        };
        let message = error.to_string();
        assert!(message.contains("sprites/ships.png"));
        assert!(message.contains("16x8"));
        assert!(!message.contains("not found"));
        assert_eq!(error.kind(), ErrorKind::LoadFallback);
    }

    #[test]
    fn glyph_checksum_matches_printable_ascii_sum() {
        let sum: u32 = (32u32..=126).sum();
        assert_eq!(GLYPH_CODE_CHECKSUM, sum);
        assert_eq!(GLYPH_COUNT, 95);
    }

    #[test]
    fn font_glyph_lookup_ignores_non_printable_characters() {
        let glyphs = (FIRST_GLYPH_CODE..=LAST_GLYPH_CODE)
            .map(|ascii| Glyph {
                ascii,
                x: 0,
                y: 0,
                width: 1,
                height: 1,
                x_offset: 0,
                y_offset: 0,
                x_advance: 1,
            })
            .collect();
        let font = Font {
            bitmap: Bitmap::new(1, 1, Color4::WHITE),
            glyphs,
            metrics: FontMetrics::default(),
        };

        assert_eq!(font.glyph('A').map(|glyph| glyph.ascii), Some(b'A'));
        assert_eq!(font.glyph('~').map(|glyph| glyph.ascii), Some(b'~'));
        assert!(font.glyph('\n').is_none());
        assert!(font.glyph('é').is_none());
    }
}
