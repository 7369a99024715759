//! Background color estimation.
//!
//! For each region we sample thin strips of pixels just *outside* its left
//! and right edges, restricted to the middle 60% of the region's height —
//! far enough out to dodge the placeholder fill and its anti-aliased edge,
//! and away from corner artifacts. When neither side fits in the image the
//! sampling falls back to strips above/below the region. Pooled samples are
//! channel-quantized to suppress noise, and the most frequent quantized
//! color wins.

use std::collections::BTreeMap;

use image::RgbImage;

use crate::color::Rgb;
use crate::geometry::RegionBox;

/// Background sampling parameters.
#[derive(Debug, Clone)]
pub struct BackgroundEstimator {
    /// Gap in pixels between the region edge and the sampled strip
    pub offset: i64,
    /// Thickness of the sampled strip in pixels
    pub strip_width: i64,
    /// Channel quantization step for the mode computation
    pub quantize_step: u8,
}

impl Default for BackgroundEstimator {
    fn default() -> Self {
        Self {
            offset: 5,
            strip_width: 2,
            quantize_step: 8,
        }
    }
}

impl BackgroundEstimator {
    /// Create an estimator with a custom edge offset.
    pub fn with_offset(offset: i64) -> Self {
        Self {
            offset,
            ..Default::default()
        }
    }

    /// Estimate the background color surrounding `bbox`.
    ///
    /// Never fails: with zero sampleable pixels the result is exactly black
    /// (`#000000`).
    pub fn estimate(&self, image: &RgbImage, bbox: &RegionBox) -> Rgb {
        let width = image.width() as i64;
        let height = image.height() as i64;
        let (x, y) = (bbox.x as i64, bbox.y as i64);
        let (w, h) = (bbox.width as i64, bbox.height as i64);

        // Vertical band covering the middle 60% of the region's height.
        let mut y0 = (y as f64 + h as f64 * 0.2).round() as i64;
        let mut y1 = (y as f64 + h as f64 * 0.8).round() as i64;
        y0 = y0.clamp(0, height - 1);
        y1 = y1.clamp(0, height);
        if y1 <= y0 {
            y0 = y.max(0);
            y1 = (y + h).min(height);
        }

        let mut samples: Vec<Rgb> = Vec::new();
        let collect = |x_range: (i64, i64), y_range: (i64, i64), out: &mut Vec<Rgb>| {
            for sy in y_range.0.max(0)..y_range.1.min(height) {
                for sx in x_range.0.max(0)..x_range.1.min(width) {
                    out.push(Rgb::from(*image.get_pixel(sx as u32, sy as u32)));
                }
            }
        };

        let left_x = x - self.offset;
        if left_x >= 0 {
            collect((left_x - self.strip_width, left_x + 1), (y0, y1), &mut samples);
        }
        let right_x = x + w + self.offset;
        if right_x < width {
            collect((right_x, right_x + self.strip_width + 1), (y0, y1), &mut samples);
        }

        // Neither side fits: fall back to horizontal strips above/below.
        if samples.is_empty() {
            let top_y = y - self.offset;
            if top_y >= 0 {
                collect((x, x + w), (top_y - self.strip_width, top_y + 1), &mut samples);
            }
            let bottom_y = y + h + self.offset;
            if bottom_y < height {
                collect((x, x + w), (bottom_y, bottom_y + self.strip_width + 1), &mut samples);
            }
        }

        if samples.is_empty() {
            return Rgb::new(0, 0, 0);
        }

        // Mode over quantized samples. BTreeMap iteration order makes the
        // tie-break deterministic: the smallest color in RGB order wins.
        let mut counts: BTreeMap<Rgb, usize> = BTreeMap::new();
        for s in samples {
            *counts.entry(s.quantize(self.quantize_step)).or_insert(0) += 1;
        }
        let mut best = Rgb::new(0, 0, 0);
        let mut best_count = 0usize;
        for (color, count) in counts {
            if count > best_count {
                best = color;
                best_count = count;
            }
        }
        best
    }
}
