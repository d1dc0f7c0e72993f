use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::ImageReader;

use crate::geometry::IVec2;

use super::bitmap::Bitmap;
use super::types::{FontMetrics, Glyph, GlyphTable, LoadError, Sprite};

const BITMAP_EXTENSIONS: [&str; 2] = ["png", "bmp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Spritesheet,
    Font,
}

impl AssetKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            AssetKind::Spritesheet => "sprites",
            AssetKind::Font => "fonts",
        }
    }
}

/// Decoding collaborator behind the resource cache. Implementations turn a
/// logical asset name into decoded pixels and metadata; they never see keys
/// or reference counts.
pub trait AssetSource {
    fn load_bitmap(&self, kind: AssetKind, name: &str) -> Result<Bitmap, LoadError>;
    fn load_sprite_table(&self, name: &str) -> Result<Vec<Sprite>, LoadError>;
    fn load_glyph_table(&self, name: &str) -> Result<GlyphTable, LoadError>;
}

impl<S: AssetSource + ?Sized> AssetSource for Rc<S> {
    fn load_bitmap(&self, kind: AssetKind, name: &str) -> Result<Bitmap, LoadError> {
        (**self).load_bitmap(kind, name)
    }

    fn load_sprite_table(&self, name: &str) -> Result<Vec<Sprite>, LoadError> {
        (**self).load_sprite_table(name)
    }

    fn load_glyph_table(&self, name: &str) -> Result<GlyphTable, LoadError> {
        (**self).load_glyph_table(name)
    }
}

/// Reads `<root>/<sprites|fonts>/<name>.{png,bmp}` plus a `<name>.xml` metadata file.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn asset_path(&self, kind: AssetKind, name: &str, extension: &str) -> PathBuf {
        self.root
            .join(kind.dir_name())
            .join(format!("{name}.{extension}"))
    }

    fn read_metadata(&self, kind: AssetKind, name: &str) -> Result<(PathBuf, String), LoadError> {
        let path = self.asset_path(kind, name, "xml");
        if !path.is_file() {
            return Err(LoadError::NotFound {
                name: name.to_string(),
            });
        }
        let text = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        Ok((path, text))
    }
}

impl AssetSource for FsAssetSource {
    fn load_bitmap(&self, kind: AssetKind, name: &str) -> Result<Bitmap, LoadError> {
        let Some(path) = BITMAP_EXTENSIONS
            .iter()
            .map(|extension| self.asset_path(kind, name, extension))
            .find(|path| path.is_file())
        else {
            return Err(LoadError::NotFound {
                name: name.to_string(),
            });
        };
        decode_bitmap_file(&path)
    }

    fn load_sprite_table(&self, name: &str) -> Result<Vec<Sprite>, LoadError> {
        let (path, text) = self.read_metadata(AssetKind::Spritesheet, name)?;
        parse_sprite_table(&path, &text)
    }

    fn load_glyph_table(&self, name: &str) -> Result<GlyphTable, LoadError> {
        let (path, text) = self.read_metadata(AssetKind::Font, name)?;
        parse_glyph_table(&path, &text)
    }
}

fn decode_bitmap_file(path: &Path) -> Result<Bitmap, LoadError> {
    let reader = ImageReader::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| LoadError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    let (width, height) = (image.width(), image.height());
    Bitmap::from_rgba8_top_down(width, height, image.as_raw()).ok_or_else(|| {
        LoadError::DecodedSizeMismatch {
            path: path.to_path_buf(),
            width,
            height,
        }
    })
}

pub(crate) fn parse_sprite_table(path: &Path, text: &str) -> Result<Vec<Sprite>, LoadError> {
    let document = parse_document(path, text)?;
    let root = expect_root(path, &document, "spritesheet")?;

    let mut sprites = Vec::new();
    for node in root.children().filter(|node| node.has_tag_name("sprite")) {
        let attr = |name: &'static str| int_attribute(path, &node, "sprite", name);
        sprites.push(Sprite {
            position: IVec2::new(attr("x")?, attr("y")?),
            size: IVec2::new(attr("w")?, attr("h")?),
            origin: IVec2::new(attr("ox")?, attr("oy")?),
        });
    }
    Ok(sprites)
}

pub(crate) fn parse_glyph_table(path: &Path, text: &str) -> Result<GlyphTable, LoadError> {
    let document = parse_document(path, text)?;
    let root = expect_root(path, &document, "font")?;
    let font_attr = |name: &'static str| int_attribute(path, &root, "font", name);
    let metrics = FontMetrics {
        line_height: font_attr("lineHeight")?,
        baseline: font_attr("baseline")?,
        glyph_space: font_attr("glyphSpace")?,
    };

    let mut glyphs = Vec::new();
    for node in root.children().filter(|node| node.has_tag_name("glyph")) {
        let attr = |name: &'static str| int_attribute(path, &node, "glyph", name);
        let ascii = u8::try_from(attr("ascii")?).map_err(|_| LoadError::BadAttribute {
            path: path.to_path_buf(),
            element: "glyph",
            attribute: "ascii",
        })?;
        glyphs.push(Glyph {
            ascii,
            x: attr("x")?,
            y: attr("y")?,
            width: attr("width")?,
            height: attr("height")?,
            x_offset: attr("xoffset")?,
            y_offset: attr("yoffset")?,
            x_advance: attr("xadvance")?,
        });
    }
    Ok(GlyphTable { metrics, glyphs })
}

fn parse_document<'a>(path: &Path, text: &'a str) -> Result<roxmltree::Document<'a>, LoadError> {
    roxmltree::Document::parse(text).map_err(|source| LoadError::Xml {
        path: path.to_path_buf(),
        source,
    })
}

fn expect_root<'a, 'input>(
    path: &Path,
    document: &'a roxmltree::Document<'input>,
    expected: &'static str,
) -> Result<roxmltree::Node<'a, 'input>, LoadError> {
    let root = document.root_element();
    if root.tag_name().name() != expected {
        return Err(LoadError::UnexpectedRoot {
            path: path.to_path_buf(),
            expected,
            found: root.tag_name().name().to_string(),
        });
    }
    Ok(root)
}

fn int_attribute(
    path: &Path,
    node: &roxmltree::Node<'_, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<i32, LoadError> {
    node.attribute(attribute)
        .and_then(|raw| raw.trim().parse::<i32>().ok())
        .ok_or_else(|| LoadError::BadAttribute {
            path: path.to_path_buf(),
            element,
            attribute,
        })
}

/// Asset source backed by in-memory tables, for tests and procedurally built art.
#[derive(Debug, Default)]
pub struct MemoryAssetSource {
    bitmaps: HashMap<(AssetKind, String), Bitmap>,
    sprite_tables: HashMap<String, Vec<Sprite>>,
    glyph_tables: HashMap<String, GlyphTable>,
    bitmap_loads: Cell<usize>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_spritesheet(&mut self, name: &str, bitmap: Bitmap, sprites: Vec<Sprite>) {
        self.bitmaps
            .insert((AssetKind::Spritesheet, name.to_string()), bitmap);
        self.sprite_tables.insert(name.to_string(), sprites);
    }

    pub fn insert_font(&mut self, name: &str, bitmap: Bitmap, table: GlyphTable) {
        self.bitmaps.insert((AssetKind::Font, name.to_string()), bitmap);
        self.glyph_tables.insert(name.to_string(), table);
    }

    /// Number of bitmap decodes served so far.
    pub fn bitmap_loads(&self) -> usize {
        self.bitmap_loads.get()
    }
}

impl AssetSource for MemoryAssetSource {
    fn load_bitmap(&self, kind: AssetKind, name: &str) -> Result<Bitmap, LoadError> {
        self.bitmap_loads.set(self.bitmap_loads.get() + 1);
        self.bitmaps
            .get(&(kind, name.to_string()))
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                name: name.to_string(),
            })
    }

    fn load_sprite_table(&self, name: &str) -> Result<Vec<Sprite>, LoadError> {
        self.sprite_tables
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                name: name.to_string(),
            })
    }

    fn load_glyph_table(&self, name: &str) -> Result<GlyphTable, LoadError> {
        self.glyph_tables
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::content::Color4;

    #[test]
    fn parses_sprite_metadata() {
        let xml = r#"<spritesheet>
            <sprite x="0" y="0" w="8" h="8" ox="4" oy="0"/>
            <sprite x="8" y="0" w="16" h="8" ox="0" oy="7"/>
        </spritesheet>"#;
        let sprites = parse_sprite_table(Path::new("ships.xml"), xml).expect("sprites");

        assert_eq!(sprites.len(), 2);
        assert_eq!(sprites[1].position, IVec2::new(8, 0));
        assert_eq!(sprites[1].size, IVec2::new(16, 8));
        assert_eq!(sprites[1].origin, IVec2::new(0, 7));
    }

    #[test]
    fn missing_sprite_attribute_is_reported() {
        let xml = r#"<spritesheet><sprite x="0" y="0" w="8" ox="0" oy="0"/></spritesheet>"#;
        let result = parse_sprite_table(Path::new("ships.xml"), xml);
        assert!(matches!(
            result,
            Err(LoadError::BadAttribute { attribute: "h", .. })
        ));
    }

    #[test]
    fn wrong_root_element_is_reported() {
        let result = parse_glyph_table(Path::new("f.xml"), "<spritesheet/>");
        assert!(matches!(
            result,
            Err(LoadError::UnexpectedRoot {
                expected: "font",
                ..
            })
        ));
    }

    #[test]
    fn parses_font_metrics_and_glyphs() {
        let xml = r#"<font lineHeight="9" baseline="2" glyphSpace="1">
            <glyph ascii="65" x="0" y="0" width="5" height="7" xoffset="0" yoffset="-2" xadvance="6"/>
        </font>"#;
        let table = parse_glyph_table(Path::new("f.xml"), xml).expect("table");

        assert_eq!(table.metrics.line_height, 9);
        assert_eq!(table.metrics.glyph_space, 1);
        assert_eq!(table.glyphs[0].ascii, b'A');
        assert_eq!(table.glyphs[0].y_offset, -2);
    }

    #[test]
    fn malformed_xml_is_a_load_error() {
        let result = parse_sprite_table(Path::new("bad.xml"), "<spritesheet>");
        assert!(matches!(result, Err(LoadError::Xml { .. })));
    }

    #[test]
    fn fs_source_reports_missing_files_as_not_found() {
        let temp = TempDir::new().expect("temp");
        let source = FsAssetSource::new(temp.path());

        assert!(matches!(
            source.load_bitmap(AssetKind::Spritesheet, "ships"),
            Err(LoadError::NotFound { .. })
        ));
        assert!(matches!(
            source.load_glyph_table("small"),
            Err(LoadError::NotFound { .. })
        ));
    }

    #[test]
    fn fs_source_decodes_png_bottom_up() {
        let temp = TempDir::new().expect("temp");
        let dir = temp.path().join("sprites");
        fs::create_dir_all(&dir).expect("mkdir");
        let mut image = image::RgbaImage::new(2, 2);
        image.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        image.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        image.save(dir.join("tiny.png")).expect("save png");
        fs::write(
            dir.join("tiny.xml"),
            r#"<spritesheet><sprite x="0" y="0" w="2" h="2" ox="0" oy="0"/></spritesheet>"#,
        )
        .expect("write xml");

        let source = FsAssetSource::new(temp.path());
        let bitmap = source
            .load_bitmap(AssetKind::Spritesheet, "tiny")
            .expect("bitmap");
        assert_eq!(bitmap.get(0, 1), Some(Color4::RED));
        assert_eq!(bitmap.get(0, 0), Some(Color4::BLUE));
        assert_eq!(source.load_sprite_table("tiny").expect("table").len(), 1);
    }

    #[test]
    fn memory_source_counts_bitmap_loads() {
        let mut source = MemoryAssetSource::new();
        source.insert_spritesheet("a", Bitmap::new(1, 1, Color4::WHITE), Vec::new());

        assert!(source.load_bitmap(AssetKind::Spritesheet, "a").is_ok());
        assert!(source.load_bitmap(AssetKind::Font, "a").is_err());
        assert_eq!(source.bitmap_loads(), 2);
    }
}
