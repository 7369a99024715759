//! Template and reference raster composition.
//!
//! The *template* raster is the source image with every placeholder erased:
//! each region's contour footprint is dilated by a square structuring
//! element and painted with the region's inferred background color, so the
//! halo also covers the anti-aliased edge (the background estimator samples
//! outside a comparable offset for exactly this reason).
//!
//! The *reference* raster overlays the template with placeholder-colored
//! outlines and a centered, adaptively sized id label per region, drawn with
//! a white outline under a black fill so it stays legible on any background.

use std::fs;
use std::path::PathBuf;

use ab_glyph::{FontVec, PxScale};
use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::drawing::{draw_hollow_rect_mut, draw_polygon_mut, draw_text_mut, text_size};
use imageproc::morphology::dilate;
use imageproc::point::Point as ImgPoint;
use imageproc::rect::Rect as ImgRect;

use crate::color::Rgb;
use crate::region::Region;

/// Fraction of a region's width/height a label may occupy.
const LABEL_MARGIN_FACTOR: f32 = 0.85;

/// Composites the clean template and the annotated reference rasters.
pub struct Compositor {
    /// Side of the square structuring element used to erase placeholders
    pub edge_dilation: u32,
    /// Label font; `None` degrades the reference raster to outlines only
    pub label_font: Option<FontVec>,
}

impl Compositor {
    /// Create a compositor.
    pub fn new(edge_dilation: u32, label_font: Option<FontVec>) -> Self {
        Self {
            edge_dilation,
            label_font,
        }
    }

    /// Paint every region's dilated footprint with its background color.
    pub fn template_image(&self, source: &RgbImage, regions: &[Region]) -> RgbImage {
        let mut out = source.clone();
        let radius = (self.edge_dilation.max(1) / 2).min(u8::MAX as u32) as u8;

        for region in regions {
            let mut mask = GrayImage::new(source.width(), source.height());
            fill_contour(&mut mask, region);
            let mask = if radius > 0 {
                dilate(&mask, Norm::LInf, radius)
            } else {
                mask
            };
            let fill: image::Rgb<u8> = region.background.into();
            for (x, y, p) in mask.enumerate_pixels() {
                if p.0[0] > 0 {
                    out.put_pixel(x, y, fill);
                }
            }
        }
        out
    }

    /// Draw region outlines and centered id labels over the template.
    pub fn reference_image(
        &self,
        template: &RgbImage,
        regions: &[Region],
        placeholder: Rgb,
    ) -> RgbImage {
        let mut out = template.clone();
        let outline_color: image::Rgb<u8> = placeholder.into();

        for region in regions {
            let b = region.bbox;
            // 2px outline as two nested hollow rectangles.
            for t in 0..2u32 {
                let inner_w = b.width.saturating_sub(2 * t);
                let inner_h = b.height.saturating_sub(2 * t);
                if inner_w > 0 && inner_h > 0 {
                    let rect = ImgRect::at((b.x + t) as i32, (b.y + t) as i32)
                        .of_size(inner_w, inner_h);
                    draw_hollow_rect_mut(&mut out, rect, outline_color);
                }
            }
        }

        let Some(font) = &self.label_font else {
            log::warn!("no label font available; reference image drawn without labels");
            return out;
        };

        for region in regions {
            let label = if region.text.is_empty() {
                region.id.to_string()
            } else {
                format!("{}: {}", region.id, region.text)
            };
            self.draw_label(&mut out, region, &label, font);
        }
        out
    }

    /// Center `label` in the region at the largest point size that fits 85%
    /// of both dimensions, found by binary search.
    fn draw_label(&self, out: &mut RgbImage, region: &Region, label: &str, font: &FontVec) {
        let b = region.bbox;
        let target_w = (b.width as f32 * LABEL_MARGIN_FACTOR) as i32;
        let target_h = (b.height as f32 * LABEL_MARGIN_FACTOR) as i32;

        let min_dim = b.width.min(b.height);
        let mut lo = 12u32.max(min_dim / 20);
        let mut hi = (lo + 10).max(min_dim * 2);
        let mut best = lo;
        while lo <= hi {
            let mid = (lo + hi) / 2;
            let (tw, th) = text_size(PxScale::from(mid as f32), font, label);
            if tw as i32 <= target_w && th as i32 <= target_h {
                best = mid;
                lo = mid + 1;
            } else {
                hi = mid - 1;
            }
        }

        let scale = PxScale::from(best as f32);
        let (tw, th) = text_size(scale, font, label);
        let (tw, th) = (tw as i32, th as i32);
        let tx = b.x as i32 + (b.width as i32 - tw) / 2;
        let ty = b.y as i32 + (b.height as i32 - th) / 2;

        // White outline under a solid black fill; thickness grows with the
        // rendered label so large labels stay readable.
        let outline = ((tw + th) / 90).clamp(4, 18);
        for dx in -outline..=outline {
            for dy in -outline..=outline {
                if dx == 0 && dy == 0 {
                    continue;
                }
                draw_text_mut(
                    out,
                    image::Rgb([255, 255, 255]),
                    tx + dx,
                    ty + dy,
                    scale,
                    font,
                    label,
                );
            }
        }
        draw_text_mut(out, image::Rgb([0, 0, 0]), tx, ty, scale, font, label);
    }
}

/// Rasterize a region's exterior contour as a filled polygon.
fn fill_contour(mask: &mut GrayImage, region: &Region) {
    let mut points: Vec<ImgPoint<i32>> = region
        .contour
        .iter()
        .map(|p| ImgPoint::new(p.x as i32, p.y as i32))
        .collect();
    // draw_polygon_mut rejects a closed polygon.
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    match points.len() {
        0 => {},
        1 | 2 => {
            for p in &points {
                if p.x >= 0 && p.y >= 0 && (p.x as u32) < mask.width() && (p.y as u32) < mask.height()
                {
                    mask.put_pixel(p.x as u32, p.y as u32, Luma([255]));
                }
            }
        },
        _ => draw_polygon_mut(mask, &points, Luma([255])),
    }
}

/// Load the first readable font from `paths`.
///
/// Returns `None` (with a warning per unreadable candidate that exists)
/// when no path yields a parseable font.
pub fn load_label_font(paths: &[PathBuf]) -> Option<FontVec> {
    for path in paths {
        let Ok(bytes) = fs::read(path) else { continue };
        match FontVec::try_from_vec(bytes) {
            Ok(font) => {
                log::debug!("label font: {}", path.display());
                return Some(font);
            },
            Err(e) => log::warn!("unusable label font {}: {}", path.display(), e),
        }
    }
    None
}
