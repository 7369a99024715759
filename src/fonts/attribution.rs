//! Region font attribution for vector sources.
//!
//! Three passes, each only covering regions the previous pass left
//! unassigned:
//!
//! 1. *Intersection*: character counts of every span overlapping the
//!    (margin-expanded) region box accumulate per `(font, size)`; the
//!    largest count wins.
//! 2. *Proximity*: spans whose centroid lies within a page-relative radius
//!    of the region centroid vote with weight `chars / (1 + distance)`;
//!    the heaviest font wins with a weight-averaged size.
//! 3. *Page*: the most character-frequent `(font, size)` on the whole page.
//!
//! Sources without any text layer bypass all three — see
//! [`estimate_from_geometry`].

use std::collections::BTreeMap;

use crate::fonts::{normalize_font_name, FontAttribution, FontCatalog, PageText, TextOrigin};
use crate::geometry::Rect;
use crate::region::Region;

/// Region font attribution over a page's text spans.
#[derive(Debug, Clone)]
pub struct FontAttributor {
    /// DPI the source was rasterized at (pixel → point conversion)
    pub dpi: f32,
    /// Pre-conversion box expansion in pixels, absorbing rasterization drift
    pub margin_px: f32,
}

impl Default for FontAttributor {
    fn default() -> Self {
        Self {
            dpi: 600.0,
            margin_px: 8.0,
        }
    }
}

impl FontAttributor {
    /// Create an attributor for a source rasterized at `dpi`.
    pub fn new(dpi: f32) -> Self {
        Self {
            dpi,
            ..Default::default()
        }
    }

    /// Attribute a dominant font and size to each region.
    ///
    /// Regions some pass could not cover are simply absent from the result;
    /// with an empty span list the result is empty.
    pub fn attribute(&self, page: &PageText, regions: &[Region]) -> BTreeMap<u32, FontAttribution> {
        let px_to_pt = 72.0 / self.dpi;
        let rects: Vec<(u32, Rect)> = regions
            .iter()
            .map(|r| (r.id, r.bbox.to_points(self.margin_px, px_to_pt)))
            .collect();

        // Normalize span boxes to a top-left origin and drop empty spans.
        let spans: Vec<(Rect, &str, f32, usize)> = page
            .spans
            .iter()
            .filter(|s| s.chars > 0)
            .map(|s| {
                let bbox = match page.origin {
                    TextOrigin::TopLeft => s.bbox,
                    TextOrigin::BottomLeft => Rect::new(
                        s.bbox.x,
                        page.height_pt - s.bbox.y - s.bbox.height,
                        s.bbox.width,
                        s.bbox.height,
                    ),
                };
                (bbox, s.font.as_str(), s.size, s.chars)
            })
            .collect();

        let mut result: BTreeMap<u32, FontAttribution> = BTreeMap::new();

        // Pass 1: intersection-based counting.
        for (id, rect) in &rects {
            let mut counts: BTreeMap<(String, u32), usize> = BTreeMap::new();
            for (bbox, font, size, chars) in &spans {
                if bbox.intersects(rect) {
                    *counts.entry((font.to_string(), size.to_bits())).or_insert(0) += *chars;
                }
            }
            if let Some(((font, size_bits), _)) = first_max(&counts) {
                result.insert(
                    *id,
                    FontAttribution {
                        font: normalize_font_name(font),
                        size: f32::from_bits(*size_bits),
                    },
                );
            }
        }

        // Pass 2: proximity vote for regions with no intersecting spans.
        let page_diag = (page.width_pt.powi(2) + page.height_pt.powi(2)).sqrt();
        let radius = 36.0f32.max(page_diag * 0.10);
        for (id, rect) in &rects {
            if result.contains_key(id) {
                continue;
            }
            let center = rect.center();
            let mut weights: BTreeMap<&str, f64> = BTreeMap::new();
            let mut sizes: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
            for (bbox, font, size, chars) in &spans {
                let dist = bbox.center().distance(&center);
                if dist > radius {
                    continue;
                }
                let weight = *chars as f64 / (1.0 + dist as f64);
                *weights.entry(*font).or_insert(0.0) += weight;
                if *size > 0.0 {
                    let acc = sizes.entry(*font).or_insert((0.0, 0.0));
                    acc.0 += *size as f64 * weight;
                    acc.1 += weight;
                }
            }
            if let Some((font, _)) = first_max_f64(&weights) {
                let size = match sizes.get(font) {
                    Some((ws, ww)) if *ww > 0.0 => (ws / ww) as f32,
                    _ => 0.0,
                };
                result.insert(
                    *id,
                    FontAttribution {
                        font: normalize_font_name(font),
                        size,
                    },
                );
            }
        }

        // Pass 3: page-dominant (font, size) for anything still missing.
        if result.len() < rects.len() && !spans.is_empty() {
            let mut page_counts: BTreeMap<(String, u32), usize> = BTreeMap::new();
            for (_, font, size, chars) in &spans {
                *page_counts
                    .entry((font.to_string(), size.to_bits()))
                    .or_insert(0) += *chars;
            }
            if let Some(((font, size_bits), _)) = first_max(&page_counts) {
                let attribution = FontAttribution {
                    font: normalize_font_name(font),
                    size: f32::from_bits(*size_bits),
                };
                for (id, _) in &rects {
                    result.entry(*id).or_insert_with(|| attribution.clone());
                }
            }
        }

        result
    }
}

/// Last-resort attribution when the source has no text layer at all:
/// estimate a single-line size from region height and take the first
/// embedded font family, defaulting to a generic one.
pub fn estimate_from_geometry(
    regions: &[Region],
    catalog: Option<&dyn FontCatalog>,
    dpi: f32,
) -> BTreeMap<u32, FontAttribution> {
    let family = catalog
        .map(|c| c.font_names())
        .unwrap_or_default()
        .into_iter()
        .map(|n| normalize_font_name(&n))
        .find(|n| !n.is_empty())
        .unwrap_or_else(|| "Helvetica".to_string());

    regions
        .iter()
        .map(|r| {
            let size_pt = (r.bbox.height as f32 * 0.5 * 72.0 / dpi).clamp(8.0, 72.0);
            let size_pt = (size_pt * 10.0).round() / 10.0;
            (
                r.id,
                FontAttribution {
                    font: family.clone(),
                    size: size_pt,
                },
            )
        })
        .collect()
}

/// First entry holding the strict maximum value, in map order.
fn first_max<K: Ord>(counts: &BTreeMap<K, usize>) -> Option<(&K, &usize)> {
    let mut best: Option<(&K, &usize)> = None;
    for (k, v) in counts {
        if best.map_or(true, |(_, bv)| v > bv) {
            best = Some((k, v));
        }
    }
    best
}

/// First entry holding the strict maximum weight, in map order.
fn first_max_f64<'m, 's>(weights: &'m BTreeMap<&'s str, f64>) -> Option<(&'s str, f64)> {
    let mut best: Option<(&'s str, f64)> = None;
    for (k, v) in weights {
        if best.map_or(true, |(_, bv)| *v > bv) {
            best = Some((*k, *v));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::TextSpan;
    use crate::geometry::RegionBox;

    fn region(id: u32, x: u32, y: u32, w: u32, h: u32) -> Region {
        Region::new(id, RegionBox::new(x, y, w, h), vec![])
    }

    fn span(x: f32, y: f32, w: f32, h: f32, font: &str, size: f32, chars: usize) -> TextSpan {
        TextSpan {
            bbox: Rect::new(x, y, w, h),
            font: font.to_string(),
            size,
            chars,
        }
    }

    fn page(spans: Vec<TextSpan>) -> PageText {
        PageText {
            width_pt: 612.0,
            height_pt: 792.0,
            origin: TextOrigin::TopLeft,
            spans,
        }
    }

    #[test]
    fn test_enclosed_span_attributes_with_prefix_stripped() {
        // 600 DPI: region (600, 600, 1000x200)px maps to 72..192 x 72..96 pt
        let regions = vec![region(1, 600, 600, 1000, 200)];
        let p = page(vec![span(80.0, 75.0, 60.0, 14.0, "ABCDE+Helvetica-Bold", 12.0, 24)]);
        let out = FontAttributor::default().attribute(&p, &regions);
        assert_eq!(out[&1].font, "Helvetica-Bold");
        assert_eq!(out[&1].size, 12.0);
    }

    #[test]
    fn test_dominant_count_wins_primary_pass() {
        let regions = vec![region(1, 600, 600, 1000, 200)];
        let p = page(vec![
            span(80.0, 75.0, 60.0, 14.0, "Georgia", 10.0, 5),
            span(80.0, 80.0, 60.0, 14.0, "Futura", 18.0, 40),
        ]);
        let out = FontAttributor::default().attribute(&p, &regions);
        assert_eq!(out[&1].font, "Futura");
        assert_eq!(out[&1].size, 18.0);
    }

    #[test]
    fn test_proximity_fallback_weights_nearby_spans() {
        // Region at 72..96pt square, span just outside it but well within
        // the proximity radius (~100pt for a letter page).
        let regions = vec![region(1, 600, 600, 200, 200)];
        let p = page(vec![span(130.0, 80.0, 40.0, 12.0, "XY+Garamond", 11.0, 12)]);
        let out = FontAttributor::default().attribute(&p, &regions);
        assert_eq!(out[&1].font, "Garamond");
        assert!((out[&1].size - 11.0).abs() < 1e-3);
    }

    #[test]
    fn test_page_fallback_covers_distant_regions() {
        // Span far beyond the radius: only the page-dominant pass applies.
        let regions = vec![region(1, 600, 600, 200, 200)];
        let p = page(vec![span(500.0, 700.0, 40.0, 12.0, "Courier", 9.0, 30)]);
        let out = FontAttributor::default().attribute(&p, &regions);
        assert_eq!(out[&1].font, "Courier");
        assert_eq!(out[&1].size, 9.0);
    }

    #[test]
    fn test_bottom_left_origin_is_flipped() {
        // Same span as the primary-pass test, reported in bottom-left
        // coordinates: y_bl = 792 - 75 - 14 = 703.
        let regions = vec![region(1, 600, 600, 1000, 200)];
        let mut p = page(vec![span(80.0, 703.0, 60.0, 14.0, "Helvetica", 12.0, 24)]);
        p.origin = TextOrigin::BottomLeft;
        let out = FontAttributor::default().attribute(&p, &regions);
        assert_eq!(out[&1].font, "Helvetica");
    }

    #[test]
    fn test_empty_spans_produce_no_attribution() {
        let regions = vec![region(1, 0, 0, 100, 100)];
        let out = FontAttributor::default().attribute(&page(vec![]), &regions);
        assert!(out.is_empty());
    }

    #[test]
    fn test_zero_char_spans_are_ignored() {
        let regions = vec![region(1, 600, 600, 1000, 200)];
        let p = page(vec![span(80.0, 75.0, 60.0, 14.0, "Ghost", 12.0, 0)]);
        let out = FontAttributor::default().attribute(&p, &regions);
        assert!(out.is_empty());
    }

    struct Catalog(Vec<&'static str>);

    impl FontCatalog for Catalog {
        fn font_names(&self) -> Vec<String> {
            self.0.iter().map(|s| s.to_string()).collect()
        }
    }

    #[test]
    fn test_estimate_from_geometry_uses_first_embedded_font() {
        let regions = vec![region(1, 0, 0, 100, 400)];
        let out = estimate_from_geometry(&regions, Some(&Catalog(vec!["AB+Lato", "Roboto"])), 600.0);
        assert_eq!(out[&1].font, "Lato");
        // 0.5 * 400px * 72/600 = 24pt
        assert_eq!(out[&1].size, 24.0);
    }

    #[test]
    fn test_estimate_clamps_size_and_defaults_family() {
        let regions = vec![region(1, 0, 0, 100, 10), region(2, 0, 0, 100, 5000)];
        let out = estimate_from_geometry(&regions, None, 600.0);
        assert_eq!(out[&1].font, "Helvetica");
        assert_eq!(out[&1].size, 8.0);
        assert_eq!(out[&2].size, 72.0);
    }
}
