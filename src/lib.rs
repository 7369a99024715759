//! # Template Oxide
//!
//! Turns a flyer/poster mockup containing solid-color placeholder boxes into
//! structured metadata describing where dynamic content regions sit, what
//! background they blend into and what semantic role each plays, so that
//! downstream tooling can paint content into those exact positions.
//!
//! ## Pipeline
//!
//! 1. **Segmenter** — per-channel color mask → region candidates in reading
//!    order ([`segmenter`])
//! 2. **Background estimator** — infers the fill color behind each region
//!    ([`background`])
//! 3. **Role classifier** — pure-geometry semantic roles ([`classifier`])
//! 4. **Compositor** — clean template + annotated reference rasters
//!    ([`compositor`])
//! 5. **Identity merger** — preserves curated roles across re-analysis
//!    ([`merger`])
//! 6. **Font attributor** — vector-source font/size metadata ([`fonts`])
//!
//! Raster decode/encode, OCR recognition, contour extraction and vector text
//! extraction are collaborator concerns behind narrow trait interfaces.
//!
//! ## Quick start
//!
//! ```no_run
//! use template_oxide::{AnalyzerConfig, TemplateAnalyzer};
//!
//! # fn main() -> template_oxide::Result<()> {
//! let analyzer = TemplateAnalyzer::new(AnalyzerConfig::default());
//! let report = analyzer.import_file("mockup.png".as_ref(), "templates".as_ref())?;
//! println!("{} regions -> {}", report.region_count, report.metadata.display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Value types
pub mod color;
pub mod geometry;
pub mod region;

// Pipeline stages
pub mod background;
pub mod classifier;
pub mod compositor;
pub mod merger;
pub mod segmenter;

// Collaborator seams
pub mod fonts;
pub mod ocr;

// Persisted artifact
pub mod metadata;

// Orchestration
pub mod analyzer;

// Re-exports
pub use analyzer::{Analysis, AnalyzerConfig, ImportReport, TemplateAnalyzer};
pub use color::Rgb;
pub use error::{Error, Result};
pub use geometry::{Rect, RegionBox};
pub use metadata::{RegionRecord, TemplateMetadata};
pub use region::Region;

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.starts_with("0."));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "template_oxide");
    }
}
