//! Pipeline orchestration.
//!
//! [`TemplateAnalyzer`] runs the synchronous, single-threaded pipeline per
//! template: segment → estimate backgrounds → OCR names → composite →
//! classify, then (on import) identity-merge against a prior snapshot and
//! persist the project directory. Batch imports process sources strictly
//! sequentially with ordered progress reporting.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::background::BackgroundEstimator;
use crate::classifier::{classify, RegionShape};
use crate::compositor::{load_label_font, Compositor};
use crate::error::Result;
use crate::fonts::{estimate_from_geometry, FontAttribution, FontAttributor, FontCatalog, SpanSource};
use crate::merger::merge_prior_roles;
use crate::metadata::{TemplateMetadata, METADATA_FILE};
use crate::ocr::{extract_region_text, NullOcr, OcrEngine};
use crate::region::Region;
use crate::segmenter::{segment, ContourExtractor, ImageprocContours};

/// File name of the source copy inside a project directory.
pub const SRC_FILE: &str = "src.png";
/// File name of the clean template raster.
pub const TEMPLATE_FILE: &str = "template.png";
/// File name of the annotated reference raster.
pub const REFERENCE_FILE: &str = "reference.png";

/// Analysis configuration.
///
/// Everything that was ambient state in earlier tooling (placeholder color,
/// tolerance, offsets, font discovery) is explicit here.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Placeholder fill color marking dynamic regions, `#rrggbb`
    pub placeholder_color: String,
    /// Per-channel color tolerance for the selection mask
    pub tolerance: u8,
    /// Side of the square dilation element used to erase placeholders
    pub edge_dilation: u32,
    /// Gap between a region edge and the background sampling strip
    pub background_offset: i64,
    /// Candidate label font paths, tried in order
    pub label_font_paths: Vec<PathBuf>,
    /// Overwrite a prior metadata snapshot instead of preserving roles
    pub replace: bool,
    /// Raster DPI assumed for vector-source font attribution
    pub dpi: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            placeholder_color: "#6fe600".to_string(),
            tolerance: 20,
            edge_dilation: 5,
            background_offset: 5,
            label_font_paths: vec![
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
                PathBuf::from("/Library/Fonts/Arial Bold.ttf"),
                PathBuf::from("/Library/Fonts/Arial.ttf"),
            ],
            replace: false,
            dpi: 600.0,
        }
    }
}

impl AnalyzerConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder color.
    pub fn with_placeholder_color(mut self, color: impl Into<String>) -> Self {
        self.placeholder_color = color.into();
        self
    }

    /// Set the mask tolerance.
    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the erase dilation kernel side.
    pub fn with_edge_dilation(mut self, edge_dilation: u32) -> Self {
        self.edge_dilation = edge_dilation;
        self
    }

    /// Set the background sampling offset.
    pub fn with_background_offset(mut self, offset: i64) -> Self {
        self.background_offset = offset;
        self
    }

    /// Set the label font search paths.
    pub fn with_label_font_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.label_font_paths = paths;
        self
    }

    /// Replace prior metadata instead of preserving curated roles.
    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }
}

/// In-memory result of one analysis run.
#[derive(Debug)]
pub struct Analysis {
    /// Detected regions in id order, fully decorated
    pub regions: Vec<Region>,
    /// Classified role per region id (empty string = unclassified)
    pub roles: BTreeMap<u32, String>,
    /// Clean template raster (placeholders erased)
    pub template: RgbImage,
    /// Annotated reference raster
    pub reference: RgbImage,
}

/// Files written by one import.
#[derive(Debug, Clone)]
pub struct ImportReport {
    /// Project directory the artifacts were written into
    pub project_dir: PathBuf,
    /// Clean template raster path
    pub template: PathBuf,
    /// Annotated reference raster path
    pub reference: PathBuf,
    /// Metadata document path
    pub metadata: PathBuf,
    /// Number of detected regions
    pub region_count: usize,
}

/// The template analysis pipeline.
pub struct TemplateAnalyzer {
    config: AnalyzerConfig,
    contours: Box<dyn ContourExtractor>,
    ocr: Box<dyn OcrEngine>,
}

impl TemplateAnalyzer {
    /// Create an analyzer with the default contour extractor and no OCR.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            contours: Box::new(ImageprocContours),
            ocr: Box::new(NullOcr),
        }
    }

    /// Inject a contour extraction backend.
    pub fn with_contour_extractor(mut self, contours: Box<dyn ContourExtractor>) -> Self {
        self.contours = contours;
        self
    }

    /// Inject an OCR backend for region label text.
    pub fn with_ocr_engine(mut self, ocr: Box<dyn OcrEngine>) -> Self {
        self.ocr = ocr;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Run the in-memory pipeline over a decoded raster.
    pub fn analyze(&self, image: &RgbImage) -> Result<Analysis> {
        let mut regions = segment(
            image,
            &self.config.placeholder_color,
            self.config.tolerance,
            self.contours.as_ref(),
        )?;

        let estimator = BackgroundEstimator::with_offset(self.config.background_offset);
        for region in regions.iter_mut() {
            region.background = estimator.estimate(image, &region.bbox);
        }

        extract_region_text(image, &mut regions, self.ocr.as_ref());

        let compositor = Compositor::new(
            self.config.edge_dilation,
            load_label_font(&self.config.label_font_paths),
        );
        let template = compositor.template_image(image, &regions);
        let placeholder = crate::color::Rgb::from_hex(&self.config.placeholder_color)?;
        let reference = compositor.reference_image(&template, &regions, placeholder);

        let shapes: Vec<RegionShape> = regions
            .iter()
            .map(|r| RegionShape {
                id: r.id,
                bbox: r.bbox,
            })
            .collect();
        let roles = classify(&shapes);

        Ok(Analysis {
            regions,
            roles,
            template,
            reference,
        })
    }

    /// Import a raster source: analyze it and persist the project directory
    /// `<output_dir>/<stem>/{src.png, template.png, reference.png,
    /// regions.json}`.
    pub fn import_file(&self, source: &Path, output_dir: &Path) -> Result<ImportReport> {
        self.import_with_sources(source, output_dir, None, None)
    }

    /// Import with optional vector-source collaborators for font
    /// attribution.
    ///
    /// Nothing is written until the full region list — classifier, identity
    /// merge and font attribution included — is finalized.
    pub fn import_with_sources(
        &self,
        source: &Path,
        output_dir: &Path,
        spans: Option<&dyn SpanSource>,
        font_catalog: Option<&dyn FontCatalog>,
    ) -> Result<ImportReport> {
        let image = image::open(source)?.to_rgb8();
        let analysis = self.analyze(&image)?;
        let Analysis {
            regions,
            mut roles,
            template,
            reference,
        } = analysis;

        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "template".to_string());
        let project_dir = output_dir.join(stem);
        fs::create_dir_all(&project_dir)?;
        let metadata_path = project_dir.join(METADATA_FILE);

        if !self.config.replace {
            merge_prior_roles(&metadata_path, &regions, &mut roles);
        }

        let fonts = self.attribute_fonts(&regions, spans, font_catalog);

        let metadata = TemplateMetadata::from_regions(
            &self.config.placeholder_color,
            image.width(),
            image.height(),
            &regions,
            &roles,
            &fonts,
        );

        // Region list is final; write the artifacts, metadata last.
        let src_path = project_dir.join(SRC_FILE);
        let template_path = project_dir.join(TEMPLATE_FILE);
        let reference_path = project_dir.join(REFERENCE_FILE);
        image.save(&src_path)?;
        template.save(&template_path)?;
        reference.save(&reference_path)?;
        metadata.save(&metadata_path)?;

        Ok(ImportReport {
            project_dir,
            template: template_path,
            reference: reference_path,
            metadata: metadata_path,
            region_count: regions.len(),
        })
    }

    /// Import many sources strictly sequentially.
    ///
    /// Progress is reported in order; the first failing source aborts the
    /// batch (each source is itself all-or-nothing).
    pub fn import_batch(&self, sources: &[PathBuf], output_dir: &Path) -> Result<Vec<ImportReport>> {
        let mut reports = Vec::with_capacity(sources.len());
        for (i, source) in sources.iter().enumerate() {
            log::info!("[{}/{}] importing {}", i + 1, sources.len(), source.display());
            let report = self.import_file(source, output_dir)?;
            log::info!(
                "[{}/{}] {} region(s) -> {}",
                i + 1,
                sources.len(),
                report.region_count,
                report.project_dir.display()
            );
            reports.push(report);
        }
        Ok(reports)
    }

    /// Font attribution for vector sources; an absent collaborator or a
    /// missing text layer degrades to the geometry estimate and never fails
    /// the import.
    fn attribute_fonts(
        &self,
        regions: &[Region],
        spans: Option<&dyn SpanSource>,
        font_catalog: Option<&dyn FontCatalog>,
    ) -> BTreeMap<u32, FontAttribution> {
        let Some(span_source) = spans else {
            return BTreeMap::new();
        };

        let mut fonts = BTreeMap::new();
        match span_source.page_text() {
            Ok(page) if !page.spans.is_empty() => {
                fonts = FontAttributor::new(self.config.dpi).attribute(&page, regions);
            },
            Ok(_) => log::info!("source has no text layer"),
            Err(e) => log::warn!("could not extract text spans: {}", e),
        }
        if fonts.is_empty() {
            fonts = estimate_from_geometry(regions, font_catalog, self.config.dpi);
        }
        fonts
    }
}
