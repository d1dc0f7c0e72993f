use std::fmt;

use tracing::{debug, warn};

use crate::asset_names::validate_asset_name;
use crate::error::ContractViolation;
use crate::geometry::IVec2;

use super::builtin::{debug_font, error_spritesheet};
use super::source::{AssetKind, AssetSource};
use super::types::{Font, LoadError, ResourceKey, Sprite, Spritesheet};
use super::validate::{build_font, build_spritesheet};

pub(crate) const ERROR_RESOURCE_NAME: &str = "<error>";

/// Hands out process-unique keys shared by every resource class.
#[derive(Debug, Default)]
pub(crate) struct KeyAllocator {
    next: u32,
}

impl KeyAllocator {
    pub(crate) fn allocate(&mut self) -> ResourceKey {
        let key = ResourceKey(self.next);
        self.next += 1;
        key
    }
}

#[derive(Debug)]
struct CacheEntry<R> {
    name: String,
    key: ResourceKey,
    ref_count: u32,
    resource: R,
}

/// Reference-counted cache for one resource class. Entry 0 is the class's
/// error resource and is never evicted.
#[derive(Debug)]
pub(crate) struct ResourceCache<R> {
    class: &'static str,
    entries: Vec<CacheEntry<R>>,
}

impl<R> ResourceCache<R> {
    pub(crate) fn new(class: &'static str, error_resource: R, keys: &mut KeyAllocator) -> Self {
        Self {
            class,
            entries: vec![CacheEntry {
                name: ERROR_RESOURCE_NAME.to_string(),
                key: keys.allocate(),
                ref_count: 0,
                resource: error_resource,
            }],
        }
    }

    pub(crate) fn error_key(&self) -> ResourceKey {
        self.entries[0].key
    }

    /// Returns the cached key for `name`, producing the resource on a miss.
    /// A failed production hands out the error resource instead.
    pub(crate) fn load_with<F>(
        &mut self,
        name: &str,
        keys: &mut KeyAllocator,
        produce: F,
    ) -> ResourceKey
    where
        F: FnOnce() -> Result<R, LoadError>,
    {
        if let Some(entry) = self.entries.iter_mut().skip(1).find(|entry| entry.name == name) {
            entry.ref_count += 1;
            return entry.key;
        }

        match produce() {
            Ok(resource) => {
                let key = keys.allocate();
                self.entries.push(CacheEntry {
                    name: name.to_string(),
                    key,
                    ref_count: 1,
                    resource,
                });
                debug!(class = self.class, name, key = key.0, "resource_loaded");
                key
            }
            Err(error) => {
                warn!(
                    class = self.class,
                    name,
                    kind = ?error.kind(),
                    error = %error,
                    "resource_load_failed_using_error_resource"
                );
                self.entries[0].ref_count += 1;
                self.entries[0].key
            }
        }
    }

    pub(crate) fn unload(&mut self, key: ResourceKey) {
        let Some(index) = self.index_of(key) else {
            warn!(class = self.class, key = key.0, "resource_unload_unknown_key_ignored");
            return;
        };
        let entry = &mut self.entries[index];
        entry.ref_count = entry.ref_count.saturating_sub(1);
        if index == 0 || entry.ref_count > 0 {
            return;
        }
        let evicted = self.entries.remove(index);
        debug!(class = self.class, name = %evicted.name, key = key.0, "resource_evicted");
    }

    pub(crate) fn get(&self, key: ResourceKey) -> Option<&R> {
        self.index_of(key).map(|index| &self.entries[index].resource)
    }

    pub(crate) fn ref_count(&self, key: ResourceKey) -> Option<u32> {
        self.index_of(key).map(|index| self.entries[index].ref_count)
    }

    /// Live entries, not counting the error resource.
    pub(crate) fn loaded_count(&self) -> usize {
        self.entries.len() - 1
    }

    fn index_of(&self, key: ResourceKey) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }
}

/// Spritesheet and font caches over one asset source and one key space.
pub struct Resources {
    source: Box<dyn AssetSource>,
    keys: KeyAllocator,
    spritesheets: ResourceCache<Spritesheet>,
    fonts: ResourceCache<Font>,
}

impl fmt::Debug for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resources")
            .field("keys", &self.keys)
            .field("spritesheets", &self.spritesheets.loaded_count())
            .field("fonts", &self.fonts.loaded_count())
            .finish_non_exhaustive()
    }
}

impl Resources {
    pub fn new(source: impl AssetSource + 'static) -> Self {
        let mut keys = KeyAllocator::default();
        let spritesheets = ResourceCache::new("spritesheet", error_spritesheet(), &mut keys);
        let fonts = ResourceCache::new("font", debug_font(), &mut keys);
        Self {
            source: Box::new(source),
            keys,
            spritesheets,
            fonts,
        }
    }

    pub fn load_spritesheet(&mut self, name: &str) -> ResourceKey {
        let source = &*self.source;
        self.spritesheets.load_with(name, &mut self.keys, || {
            validate_asset_name(name)?;
            let bitmap = source.load_bitmap(AssetKind::Spritesheet, name)?;
            let sprites = source.load_sprite_table(name)?;
            build_spritesheet(bitmap, sprites)
        })
    }

    pub fn load_font(&mut self, name: &str) -> ResourceKey {
        let source = &*self.source;
        self.fonts.load_with(name, &mut self.keys, || {
            validate_asset_name(name)?;
            let bitmap = source.load_bitmap(AssetKind::Font, name)?;
            let table = source.load_glyph_table(name)?;
            build_font(bitmap, table)
        })
    }

    pub fn unload_spritesheet(&mut self, key: ResourceKey) {
        self.spritesheets.unload(key);
    }

    pub fn unload_font(&mut self, key: ResourceKey) {
        self.fonts.unload(key);
    }

    pub fn is_error_resource(&self, key: ResourceKey) -> bool {
        key == self.spritesheets.error_key() || key == self.fonts.error_key()
    }

    pub fn error_spritesheet_key(&self) -> ResourceKey {
        self.spritesheets.error_key()
    }

    /// The built-in 3x5 font; also what failed font loads resolve to.
    pub fn debug_font_key(&self) -> ResourceKey {
        self.fonts.error_key()
    }

    pub fn spritesheet(&self, key: ResourceKey) -> Result<&Spritesheet, ContractViolation> {
        self.spritesheets
            .get(key)
            .ok_or(ContractViolation::UnknownSpritesheet { key })
    }

    pub fn font(&self, key: ResourceKey) -> Result<&Font, ContractViolation> {
        self.fonts.get(key).ok_or(ContractViolation::UnknownFont { key })
    }

    pub fn sprite(&self, key: ResourceKey, index: usize) -> Result<&Sprite, ContractViolation> {
        let sheet = self.spritesheet(key)?;
        sheet
            .sprite(index)
            .ok_or(ContractViolation::SpriteOutOfRange {
                key,
                index,
                count: sheet.sprites().len(),
            })
    }

    pub fn sprite_size(&self, key: ResourceKey, index: usize) -> Result<IVec2, ContractViolation> {
        self.sprite(key, index).map(|sprite| sprite.size)
    }

    pub fn spritesheet_size(&self, key: ResourceKey) -> Result<IVec2, ContractViolation> {
        self.spritesheet(key).map(Spritesheet::size)
    }

    pub fn sprite_count(&self, key: ResourceKey) -> Result<usize, ContractViolation> {
        self.spritesheet(key).map(|sheet| sheet.sprites().len())
    }

    /// Reference count for a key of either class; `None` once evicted.
    pub fn ref_count(&self, key: ResourceKey) -> Option<u32> {
        self.spritesheets
            .ref_count(key)
            .or_else(|| self.fonts.ref_count(key))
    }

    /// Loaded spritesheets and fonts, not counting the error resources.
    pub fn loaded_count(&self) -> usize {
        self.spritesheets.loaded_count() + self.fonts.loaded_count()
    }
}
