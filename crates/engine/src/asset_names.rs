use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetNameError {
    #[error("asset name must not be empty")]
    Empty,
    #[error("asset name must not start with '/'")]
    LeadingSlash,
    #[error("asset name must not contain '\\\\'")]
    Backslash,
    #[error("asset name must not contain '..'")]
    ParentTraversal,
    #[error("asset name contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

pub(crate) fn validate_asset_name(name: &str) -> Result<(), AssetNameError> {
    if name.is_empty() {
        return Err(AssetNameError::Empty);
    }
    if name.starts_with('/') {
        return Err(AssetNameError::LeadingSlash);
    }
    if name.contains('\\') {
        return Err(AssetNameError::Backslash);
    }
    if name.contains("..") {
        return Err(AssetNameError::ParentTraversal);
    }
    for ch in name.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-') {
            continue;
        }
        return Err(AssetNameError::InvalidCharacter { character: ch });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_lowercase_names() {
        assert_eq!(validate_asset_name("invaders/ship_1"), Ok(()));
        assert_eq!(validate_asset_name("font-small"), Ok(()));
    }

    #[test]
    fn rejects_traversal_and_odd_characters() {
        assert_eq!(validate_asset_name(""), Err(AssetNameError::Empty));
        assert_eq!(
            validate_asset_name("/abs"),
            Err(AssetNameError::LeadingSlash)
        );
        assert_eq!(validate_asset_name(r"a\b"), Err(AssetNameError::Backslash));
        assert_eq!(
            validate_asset_name("a/../b"),
            Err(AssetNameError::ParentTraversal)
        );
        assert_eq!(
            validate_asset_name("Ship"),
            Err(AssetNameError::InvalidCharacter { character: 'S' })
        );
    }
}
