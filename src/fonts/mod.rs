//! Font metadata for vector (PDF) sources.
//!
//! This module defines the collaborator contracts for reading text spans and
//! embedded font names out of a vector document, plus the attribution pass
//! that maps a dominant `(font, size)` to each region.

pub mod attribution;

pub use attribution::{FontAttributor, estimate_from_geometry};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Rect;

/// A run of document text sharing one font and size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// Bounding box in point space
    pub bbox: Rect,
    /// Raw font name as the document reports it (subset prefix included)
    pub font: String,
    /// Font size in points
    pub size: f32,
    /// Number of characters in the span
    pub chars: usize,
}

/// Vertical origin convention of reported span coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOrigin {
    /// Y grows downward from the top edge (already normalized)
    TopLeft,
    /// Y grows upward from the bottom edge; the attributor flips it
    BottomLeft,
}

/// First page's text geometry as supplied by a span service.
#[derive(Debug, Clone)]
pub struct PageText {
    /// Page width in points
    pub width_pt: f32,
    /// Page height in points
    pub height_pt: f32,
    /// Coordinate convention the spans use
    pub origin: TextOrigin,
    /// All text spans on the page
    pub spans: Vec<TextSpan>,
}

/// Text span extraction from a vector source (external engine).
pub trait SpanSource {
    /// Extract the first page's spans. An empty span list means the source
    /// has no usable text layer.
    fn page_text(&self) -> Result<PageText>;
}

/// Embedded font discovery from a vector source's object table (external
/// engine; used only by the last-resort estimate).
pub trait FontCatalog {
    /// Embedded font names in object-table order, subset prefixes intact.
    fn font_names(&self) -> Vec<String>;
}

/// Dominant font metadata attributed to one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontAttribution {
    /// Normalized font family name
    pub font: String,
    /// Font size in points
    pub size: f32,
}

/// Strip a PDF font-subsetting prefix (`ABCDE+Name` → `Name`) and trim
/// whitespace. Style suffixes (`-Bold`, …) are left intact.
pub fn normalize_font_name(name: &str) -> String {
    let s = name.trim();
    match s.split_once('+') {
        Some((_, rest)) => rest.to_string(),
        None => s.to_string(),
    }
}
