use thiserror::Error;
use tracing::error;

use crate::content::ResourceKey;
use crate::app::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller broke an API contract. Fatal in debug builds.
    ContractViolation,
    /// Asset could not be produced; the caller was handed an error resource.
    LoadFallback,
    /// Window, surface or event loop could not be created.
    Environment,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("unknown spritesheet key {key}")]
    UnknownSpritesheet { key: ResourceKey },
    #[error("unknown font key {key}")]
    UnknownFont { key: ResourceKey },
    #[error("sprite index {index} out of range for spritesheet {key} ({count} sprites)")]
    SpriteOutOfRange {
        key: ResourceKey,
        index: usize,
        count: usize,
    },
    #[error("character {character:?} has no glyph in font {key}")]
    GlyphOutOfRange { key: ResourceKey, character: char },
    #[error("unknown screen {id}")]
    UnknownScreen { id: ScreenId },
    #[error("screen resolution must be non-zero, got {width}x{height}")]
    ZeroResolution { width: u32, height: u32 },
    #[error("manual pixel size must be at least 1")]
    ZeroPixelSize,
    #[error("pixel size {pixel_size} makes a {width}x{height} screen too large to place")]
    PixelSizeTooLarge {
        pixel_size: u32,
        width: u32,
        height: u32,
    },
}

impl ContractViolation {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ContractViolation
    }
}

/// Applies the contract policy to a checked call: debug builds panic, release
/// builds log the violation and carry on without the value.
#[track_caller]
pub fn enforce<T>(result: Result<T, ContractViolation>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(violation) => {
            error!(kind = ?violation.kind(), error = %violation, "contract_violation");
            if cfg!(debug_assertions) {
                panic!("contract violation: {violation}");
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enforce_passes_through_ok_values() {
        assert_eq!(enforce::<u32>(Ok(7)), Some(7));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "contract violation")]
    fn enforce_panics_in_debug_builds() {
        let _ = enforce::<()>(Err(ContractViolation::ZeroPixelSize));
    }

    #[test]
    fn violations_report_contract_kind() {
        let violation = ContractViolation::UnknownScreen { id: ScreenId(3) };
        assert_eq!(violation.kind(), ErrorKind::ContractViolation);
        assert_eq!(violation.to_string(), "unknown screen 3");
    }
}
