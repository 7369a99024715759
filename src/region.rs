//! The [`Region`] entity: one detected placeholder area.
//!
//! Regions are created once per analysis run by the segmenter and decorated
//! by later stages (background color, OCR text). They are flat value structs
//! collected in an id-ordered `Vec`; the contour footprint is exclusively
//! owned by its region and is only consumed by the compositor for fill and
//! dilation.

use crate::color::Rgb;
use crate::geometry::RegionBox;

/// A single point on a region's exterior contour, in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContourPoint {
    /// X pixel coordinate
    pub x: u32,
    /// Y pixel coordinate
    pub y: u32,
}

/// One detected placeholder area with geometry, inferred background and
/// OCR-derived label text.
#[derive(Debug, Clone)]
pub struct Region {
    /// Unique id, assigned 1..N in ascending `(y, x)` order of the bounding
    /// boxes. Never reused within a run.
    pub id: u32,
    /// Axis-aligned bounding box in source-image pixel space.
    pub bbox: RegionBox,
    /// Exterior boundary of the exact pixel footprint. Holes are ignored.
    pub contour: Vec<ContourPoint>,
    /// Inferred color of the surrounding background. Always resolvable;
    /// falls back to black when nothing around the region is sampleable.
    pub background: Rgb,
    /// OCR-derived label text, empty if unavailable.
    pub text: String,
}

impl Region {
    /// Create a region with no background estimate or text yet.
    pub fn new(id: u32, bbox: RegionBox, contour: Vec<ContourPoint>) -> Self {
        Self {
            id,
            bbox,
            contour,
            background: Rgb::new(0, 0, 0),
            text: String::new(),
        }
    }
}
