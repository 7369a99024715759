//! Error types for the template analysis library.
//!
//! Fatal conditions become [`Error`] variants and propagate to the caller;
//! per-region conditions (OCR failures, font attribution misses) and a
//! malformed prior snapshot are degraded with a warning inside the pipeline
//! and never abort a run.

/// Result type alias for template analysis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during template analysis.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed hex color input, rejected before segmentation runs
    #[error("Invalid placeholder color: '{0}' (expected #rrggbb)")]
    InvalidColor(String),

    /// The color mask matched no pixels at the given tolerance
    #[error("No regions found for placeholder color {color} (tolerance={tolerance})")]
    NoRegionsFound {
        /// Placeholder color the mask was built for
        color: String,
        /// Per-channel tolerance used
        tolerance: u8,
    },

    /// Image decode/encode error
    #[error("Image error: {0}")]
    Image(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize or write the outgoing metadata document
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// A prior metadata snapshot exists but cannot be read or parsed.
    ///
    /// The identity merger catches this and degrades to "no prior metadata".
    #[error("Malformed prior metadata: {0}")]
    MalformedPriorMetadata(String),

    /// Label font loading error
    #[error("Font error: {0}")]
    Font(String),

    /// OCR engine error; callers treat this as empty text
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Text span extraction error from a vector source
    #[error("Span error: {0}")]
    Span(String),
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_color_error() {
        let err = Error::InvalidColor("#zzz".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid placeholder color"));
        assert!(msg.contains("#zzz"));
    }

    #[test]
    fn test_no_regions_found_error() {
        let err = Error::NoRegionsFound {
            color: "#6fe600".to_string(),
            tolerance: 20,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("#6fe600"));
        assert!(msg.contains("tolerance=20"));
    }

    #[test]
    fn test_malformed_prior_metadata_error() {
        let err = Error::MalformedPriorMetadata("unexpected end of input".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Malformed prior metadata"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
