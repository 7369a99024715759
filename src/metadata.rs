//! The persisted template metadata document.
//!
//! This is the sole hand-off to the downstream content-compositing consumer:
//! placeholder color, template pixel dimensions, stylesheet references and
//! the ordered region list. Serialized as JSON (`regions.json`) next to the
//! composited rasters.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fonts::FontAttribution;
use crate::geometry::RegionBox;
use crate::region::Region;

/// File name of the metadata document inside a template project directory.
pub const METADATA_FILE: &str = "regions.json";

/// One region entry in the persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    /// Region id (1..N in detection order)
    pub id: u32,
    /// Detected (OCR) or curated display name
    #[serde(default)]
    pub name: String,
    /// Semantic role tag, empty if unclassified
    #[serde(default)]
    pub role: String,
    /// X coordinate of the bounding box, pixels
    pub x: u32,
    /// Y coordinate of the bounding box, pixels
    pub y: u32,
    /// Bounding box width, pixels
    pub width: u32,
    /// Bounding box height, pixels
    pub height: u32,
    /// Inferred background color, `#rrggbb`
    pub background_color: String,
    /// Dominant font family, vector sources only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Dominant font size in points, vector sources only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
}

impl RegionRecord {
    /// The `(x, y, width, height)` identity key used by the merger.
    pub fn key(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.width, self.height)
    }

    /// The bounding box of this record.
    pub fn bbox(&self) -> RegionBox {
        RegionBox::new(self.x, self.y, self.width, self.height)
    }
}

/// The persisted metadata document for one template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    /// Placeholder color the regions were detected with, `#rrggbb`
    pub content_color: String,
    /// Template raster width in pixels
    pub width: u32,
    /// Template raster height in pixels
    pub height: u32,
    /// Stylesheet references for the downstream compositor
    #[serde(default)]
    pub css: Vec<String>,
    /// Ordered region list (detection order)
    pub regions: Vec<RegionRecord>,
}

impl TemplateMetadata {
    /// Assemble the document from finalized pipeline output.
    ///
    /// `roles` maps region id to its classified role; `fonts` (vector
    /// sources only) maps region id to attributed font metadata.
    pub fn from_regions(
        content_color: &str,
        width: u32,
        height: u32,
        regions: &[Region],
        roles: &BTreeMap<u32, String>,
        fonts: &BTreeMap<u32, FontAttribution>,
    ) -> Self {
        let records = regions
            .iter()
            .map(|r| {
                let attribution = fonts.get(&r.id);
                RegionRecord {
                    id: r.id,
                    name: r.text.clone(),
                    role: roles.get(&r.id).cloned().unwrap_or_default(),
                    x: r.bbox.x,
                    y: r.bbox.y,
                    width: r.bbox.width,
                    height: r.bbox.height,
                    background_color: r.background.to_hex(),
                    font: attribution.map(|a| a.font.clone()),
                    font_size: attribution.map(|a| a.size),
                }
            })
            .collect();
        Self {
            content_color: content_color.to_lowercase(),
            width,
            height,
            css: Vec::new(),
            regions: records,
        }
    }

    /// Write the document as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Metadata(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously persisted document.
    ///
    /// Returns [`Error::MalformedPriorMetadata`] when the file exists but
    /// cannot be read or parsed; the caller decides whether that is fatal
    /// (it is not during identity merge).
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).map_err(|e| Error::MalformedPriorMetadata(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| Error::MalformedPriorMetadata(e.to_string()))
    }
}
