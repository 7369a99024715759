//! Placeholder region segmentation.
//!
//! Builds a binary selection mask from the placeholder color, hands it to a
//! [`ContourExtractor`] and turns the returned exterior boundaries into
//! [`Region`] candidates ordered top-to-bottom, left-to-right.
//!
//! The mask test is an axis-aligned box in color space: a pixel is
//! foreground iff every channel independently deviates from the target by at
//! most `tolerance`. This is intentionally not a Euclidean distance — the
//! set of qualifying near-colors differs, and downstream behavior depends on
//! it.

use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType};

use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::geometry::RegionBox;
use crate::region::{ContourPoint, Region};

/// An exterior boundary reported by a contour extractor, with its
/// axis-aligned bounding box.
#[derive(Debug, Clone)]
pub struct MaskContour {
    /// Boundary pixels of one simply-connected foreground component
    pub points: Vec<ContourPoint>,
    /// Inclusive bounding box of the boundary
    pub bbox: RegionBox,
}

/// Connected-component boundary extraction over a binary mask.
///
/// Modeled as an injected capability so the segmenter's own logic (masking,
/// ordering, id assignment) is testable with synthetic boundary lists. Only
/// exterior boundaries are required; holes are ignored.
pub trait ContourExtractor {
    /// Return the exterior boundaries of all foreground components in
    /// `mask` (non-zero pixels are foreground).
    fn contours(&self, mask: &GrayImage) -> Vec<MaskContour>;
}

/// [`ContourExtractor`] backed by `imageproc`'s border-following contour
/// finder.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageprocContours;

impl ContourExtractor for ImageprocContours {
    fn contours(&self, mask: &GrayImage) -> Vec<MaskContour> {
        find_contours::<u32>(mask)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && !c.points.is_empty())
            .map(|c| {
                let mut min_x = u32::MAX;
                let mut min_y = u32::MAX;
                let mut max_x = 0u32;
                let mut max_y = 0u32;
                for p in &c.points {
                    min_x = min_x.min(p.x);
                    min_y = min_y.min(p.y);
                    max_x = max_x.max(p.x);
                    max_y = max_y.max(p.y);
                }
                let points = c
                    .points
                    .into_iter()
                    .map(|p| ContourPoint { x: p.x, y: p.y })
                    .collect();
                MaskContour {
                    points,
                    // Boundary pixels are inside the component, so the box is
                    // inclusive on both ends.
                    bbox: RegionBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1),
                }
            })
            .collect()
    }
}

/// Build the binary selection mask for `target` at the given per-channel
/// tolerance. Foreground pixels are 255.
pub fn build_color_mask(image: &RgbImage, target: Rgb, tolerance: u8) -> GrayImage {
    let tol = tolerance as i16;
    let mut mask = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let hit = (pixel.0[0] as i16 - target.r as i16).abs() <= tol
            && (pixel.0[1] as i16 - target.g as i16).abs() <= tol
            && (pixel.0[2] as i16 - target.b as i16).abs() <= tol;
        if hit {
            mask.put_pixel(x, y, Luma([255u8]));
        }
    }
    mask
}

/// Detect placeholder regions in `image`.
///
/// Validates the placeholder color eagerly, builds the selection mask, asks
/// `extractor` for exterior boundaries, sorts the results ascending by
/// `(y, x)` of their bounding boxes and assigns ids `1..N` in that order.
///
/// The `(y, x)` ordering is load-bearing: the classifier and human curation
/// workflows both reference regions "in reading order".
pub fn segment(
    image: &RgbImage,
    placeholder_color: &str,
    tolerance: u8,
    extractor: &dyn ContourExtractor,
) -> Result<Vec<Region>> {
    let target = Rgb::from_hex(placeholder_color)?;
    let mask = build_color_mask(image, target, tolerance);

    let mut contours = extractor.contours(&mask);
    if contours.is_empty() {
        return Err(Error::NoRegionsFound {
            color: placeholder_color.to_string(),
            tolerance,
        });
    }

    contours.sort_by_key(|c| (c.bbox.y, c.bbox.x));
    log::debug!("segmenter: {} region candidate(s)", contours.len());

    Ok(contours
        .into_iter()
        .enumerate()
        .map(|(i, c)| Region::new(i as u32 + 1, c.bbox, c.points))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Extractor that replays a fixed boundary list, for ordering tests.
    struct FixedContours(Vec<MaskContour>);

    impl ContourExtractor for FixedContours {
        fn contours(&self, _mask: &GrayImage) -> Vec<MaskContour> {
            self.0.clone()
        }
    }

    fn contour_at(x: u32, y: u32, w: u32, h: u32) -> MaskContour {
        MaskContour {
            points: vec![
                ContourPoint { x, y },
                ContourPoint { x: x + w - 1, y },
                ContourPoint { x: x + w - 1, y: y + h - 1 },
                ContourPoint { x, y: y + h - 1 },
            ],
            bbox: RegionBox::new(x, y, w, h),
        }
    }

    fn blank(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, image::Rgb([255, 255, 255]))
    }

    #[test]
    fn test_ids_follow_reading_order() {
        // Supplied bottom-first; ids must still follow ascending (y, x)
        let extractor = FixedContours(vec![
            contour_at(100, 120, 80, 50),
            contour_at(10, 10, 50, 40),
            contour_at(150, 10, 30, 30),
        ]);
        let regions = segment(&blank(300, 300), "#6fe600", 20, &extractor).unwrap();
        let boxes: Vec<_> = regions.iter().map(|r| (r.id, r.bbox.x, r.bbox.y)).collect();
        assert_eq!(boxes, vec![(1, 10, 10), (2, 150, 10), (3, 100, 120)]);
    }

    #[test]
    fn test_invalid_color_rejected_eagerly() {
        let extractor = FixedContours(vec![contour_at(0, 0, 10, 10)]);
        let err = segment(&blank(100, 100), "#nothex", 20, &extractor).unwrap_err();
        assert!(matches!(err, Error::InvalidColor(_)));
    }

    #[test]
    fn test_no_regions_is_fatal() {
        let extractor = FixedContours(vec![]);
        let err = segment(&blank(100, 100), "#6fe600", 20, &extractor).unwrap_err();
        assert!(matches!(err, Error::NoRegionsFound { .. }));
    }

    #[test]
    fn test_mask_is_per_channel_box_not_euclidean() {
        let target = Rgb::from_hex("#646464").unwrap();
        let mut img = blank(3, 1);
        // deviates 20 on every channel: inside the box, though the Euclidean
        // distance (~34.6) is well past 20
        img.put_pixel(0, 0, image::Rgb([120, 120, 120]));
        // deviates 21 on one channel only: outside the box
        img.put_pixel(1, 0, image::Rgb([121, 100, 100]));
        let mask = build_color_mask(&img, target, 20);
        assert_eq!(mask.get_pixel(0, 0).0[0], 255);
        assert_eq!(mask.get_pixel(1, 0).0[0], 0);
    }

    #[test]
    fn test_imageproc_extractor_finds_rectangles() {
        let mut mask = GrayImage::new(100, 100);
        for y in 10..50u32 {
            for x in 10..60u32 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let found = ImageprocContours.contours(&mask);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].bbox, RegionBox::new(10, 10, 50, 40));
    }
}
