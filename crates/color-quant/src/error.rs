//! Error types for the color-quant public API.
//!
//! [`QuantError`] covers every precondition the engine checks. All checks run
//! before any state is touched, so a failed call leaves the extractor or
//! palette exactly as it was.

use std::num::ParseIntError;

use thiserror::Error;

/// Error type for parsing hex color strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    /// Hex string has invalid length (must be 3 or 6 digits after the prefix)
    #[error("invalid hex color length (expected 3 or 6 characters)")]
    InvalidLength,
    /// Invalid hexadecimal character encountered
    #[error("invalid hex character: {0}")]
    InvalidHex(#[from] ParseIntError),
}

/// Unified error type for extraction, palette construction and mapping.
///
/// # Example
///
/// ```
/// use color_quant::{Palette, QuantError};
///
/// let err = Palette::from_packed(&[], true).unwrap_err();
/// assert_eq!(err, QuantError::EmptyColorTable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantError {
    /// Requested table length is smaller than the number of forced colors.
    #[error("table length {requested} is smaller than the {forced} forced colors")]
    InvalidTableSize { requested: usize, forced: usize },

    /// A color table with no entries, or an extraction with nothing to select from.
    #[error("color table is empty")]
    EmptyColorTable,

    /// More than 256 entries; indices must fit in one byte.
    #[error("color table has {len} entries, at most 256 are supported")]
    TableTooLarge { len: usize },

    /// Zero width/height or a pixel buffer shorter than `width * height`.
    #[error("invalid dimensions {width}x{height} for a buffer of {len} pixels")]
    InvalidDimensions {
        width: usize,
        height: usize,
        len: usize,
    },

    /// The palette was released before this call.
    #[error("palette used after release")]
    UseAfterRelease,

    /// A color appears twice in a color table.
    #[error("duplicate color found at index {index}")]
    DuplicateColor { index: usize },

    /// The extractor already produced a table; `reset()` it first.
    #[error("extractor already produced a color table; reset it before reuse")]
    ExtractorFinalized,

    /// Invalid hex color string
    #[error("invalid color: {0}")]
    ParseColor(#[from] ParseColorError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = QuantError::InvalidTableSize {
            requested: 2,
            forced: 5,
        };
        assert_eq!(
            err.to_string(),
            "table length 2 is smaller than the 5 forced colors"
        );
        assert_eq!(
            QuantError::TableTooLarge { len: 300 }.to_string(),
            "color table has 300 entries, at most 256 are supported"
        );
        assert_eq!(
            QuantError::InvalidDimensions {
                width: 4,
                height: 0,
                len: 16
            }
            .to_string(),
            "invalid dimensions 4x0 for a buffer of 16 pixels"
        );
    }

    #[test]
    fn test_parse_error_source_chain() {
        let parse = "zz".parse::<u8>().unwrap_err();
        let err = QuantError::from(ParseColorError::from(parse));
        let source = std::error::Error::source(&err).expect("has source");
        assert!(source.to_string().starts_with("invalid hex character"));
    }
}
