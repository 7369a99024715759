//! OCR collaborator seam.
//!
//! Character recognition itself is delegated to an external engine; the
//! pipeline only needs "raster region in, text out". Engine failures are
//! caught per region and degrade to empty text — OCR is never fatal.

use image::RgbImage;

use crate::error::Result;
use crate::region::Region;

/// Text recognition over a cropped region raster.
pub trait OcrEngine {
    /// Recognize text in `crop`. Implementations may fail; callers treat
    /// any error as "no text".
    fn recognize(&self, crop: &RgbImage) -> Result<String>;
}

/// Engine that recognizes nothing. The default when no OCR backend is
/// wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOcr;

impl OcrEngine for NullOcr {
    fn recognize(&self, _crop: &RgbImage) -> Result<String> {
        Ok(String::new())
    }
}

/// Run OCR over every region and store whitespace-normalized text on it.
///
/// A failing engine logs a warning for that region and leaves its text
/// empty; the pipeline continues.
pub fn extract_region_text(image: &RgbImage, regions: &mut [Region], engine: &dyn OcrEngine) {
    for region in regions.iter_mut() {
        let b = region.bbox;
        let crop = image::imageops::crop_imm(image, b.x, b.y, b.width, b.height).to_image();
        region.text = match engine.recognize(&crop) {
            Ok(raw) => raw.split_whitespace().collect::<Vec<_>>().join(" "),
            Err(e) => {
                log::warn!("OCR failed for region {}: {}", region.id, e);
                String::new()
            },
        };
    }
}
