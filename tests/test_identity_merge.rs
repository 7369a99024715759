//! Curated role preservation across re-imports.

use image::RgbImage;
use template_oxide::{AnalyzerConfig, TemplateAnalyzer, TemplateMetadata};

const PLACEHOLDER: [u8; 3] = [0x6f, 0xe6, 0x00];

fn fixture() -> RgbImage {
    let mut img = RgbImage::from_pixel(200, 200, image::Rgb([255, 255, 255]));
    for y in 10..50u32 {
        for x in 10..60u32 {
            img.put_pixel(x, y, image::Rgb(PLACEHOLDER));
        }
    }
    for y in 120..170u32 {
        for x in 100..180u32 {
            img.put_pixel(x, y, image::Rgb(PLACEHOLDER));
        }
    }
    img
}

#[test]
fn test_curated_role_survives_reimport() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("mockup.png");
    fixture().save(&source).unwrap();

    let analyzer = TemplateAnalyzer::new(AnalyzerConfig::default());
    let report = analyzer.import_file(&source, dir.path()).expect("first import failed");

    // Human curation: rename region 1's role.
    let mut meta = TemplateMetadata::load(&report.metadata).unwrap();
    assert_eq!(meta.regions[0].role, "content2");
    meta.regions[0].role = "headline".to_string();
    meta.save(&report.metadata).unwrap();

    let report = analyzer.import_file(&source, dir.path()).expect("re-import failed");
    let meta = TemplateMetadata::load(&report.metadata).unwrap();
    assert_eq!(meta.regions[0].role, "headline");
    assert_eq!(meta.regions[1].role, "content");
}

#[test]
fn test_reimport_is_idempotent_without_curation() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("mockup.png");
    fixture().save(&source).unwrap();

    let analyzer = TemplateAnalyzer::new(AnalyzerConfig::default());
    let first = analyzer.import_file(&source, dir.path()).expect("first import failed");
    let first_meta = TemplateMetadata::load(&first.metadata).unwrap();

    let second = analyzer.import_file(&source, dir.path()).expect("re-import failed");
    let second_meta = TemplateMetadata::load(&second.metadata).unwrap();
    assert_eq!(first_meta, second_meta);
}

#[test]
fn test_replace_discards_curated_roles() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("mockup.png");
    fixture().save(&source).unwrap();

    let analyzer = TemplateAnalyzer::new(AnalyzerConfig::default());
    let report = analyzer.import_file(&source, dir.path()).expect("first import failed");

    let mut meta = TemplateMetadata::load(&report.metadata).unwrap();
    meta.regions[0].role = "headline".to_string();
    meta.save(&report.metadata).unwrap();

    let replacing = TemplateAnalyzer::new(AnalyzerConfig::default().with_replace(true));
    let report = replacing.import_file(&source, dir.path()).expect("re-import failed");
    let meta = TemplateMetadata::load(&report.metadata).unwrap();
    assert_eq!(meta.regions[0].role, "content2");
}

#[test]
fn test_corrupt_prior_metadata_does_not_abort_import() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("mockup.png");
    fixture().save(&source).unwrap();

    let analyzer = TemplateAnalyzer::new(AnalyzerConfig::default());
    let report = analyzer.import_file(&source, dir.path()).expect("first import failed");
    std::fs::write(&report.metadata, "{{{ definitely not json").unwrap();

    // Degrades to fresh classification with a warning.
    let report = analyzer.import_file(&source, dir.path()).expect("re-import failed");
    let meta = TemplateMetadata::load(&report.metadata).unwrap();
    assert_eq!(meta.regions[0].role, "content2");
    assert_eq!(meta.regions[1].role, "content");
}
