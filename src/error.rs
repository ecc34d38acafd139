//! Error types for histcolorbar operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring, building, or rendering a colorbar.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// Invalid dimensions for a framebuffer or axes.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Invalid binning directive (zero bins, bad edges, unknown rule).
    #[error("Invalid bins: {0}")]
    InvalidBins(String),

    /// Histogram fraction outside (0, 1], or too small for a bounded grid.
    #[error("Histogram fraction must be in (0, 1] and keep the composite width bounded, got {0}")]
    InvalidFraction(f32),

    /// Alpha outside [0, 1].
    #[error("Alpha must be in [0, 1], got {0}")]
    InvalidAlpha(f32),

    /// Color parsing error.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Inconsistent or unknown colorbar option.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Normalization domain error (e.g., log of non-positive value).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// Configuration document could not be parsed.
    #[cfg(feature = "config")]
    #[error("Config parse error at line {line}: {message}")]
    ConfigParse {
        /// Line of the offending entry (0 when unknown).
        line: usize,
        /// Parser message.
        message: String,
    },

    /// Rendering error.
    #[error("Rendering error: {0}")]
    Rendering(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidDimensions { width: 0, height: 100 };
        assert!(err.to_string().contains("Invalid dimensions"));
    }

    #[test]
    fn test_invalid_fraction_display() {
        let err = Error::InvalidFraction(1.5);
        assert!(err.to_string().contains("1.5"));
        assert!(err.to_string().contains("(0, 1]"));
    }

    #[test]
    fn test_io_from() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, Error::Io(_)));
    }
}
