mod bitmap;
mod builtin;
mod cache;
mod source;
mod types;
mod validate;

pub use bitmap::{Bitmap, Color4, ALPHA_KEY};
pub use builtin::{DEBUG_GLYPH_HEIGHT, DEBUG_GLYPH_WIDTH, ERROR_SHEET_SIZE};
pub use cache::Resources;
pub use source::{AssetKind, AssetSource, FsAssetSource, MemoryAssetSource};
pub use types::{
    Font, FontMetrics, Glyph, GlyphTable, LoadError, ResourceKey, Sprite, Spritesheet,
    FIRST_GLYPH_CODE, GLYPH_CODE_CHECKSUM, GLYPH_COUNT, LAST_GLYPH_CODE,
};
