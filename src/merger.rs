//! Region identity merge.
//!
//! When a template is re-imported after source edits, freshly detected
//! regions are reconciled against the previously persisted snapshot so that
//! human-curated role names survive. The merge is strict: any count or box
//! mismatch abandons it wholesale and the freshly classified roles stand.
//! Fresh OCR text is never overwritten, and the prior snapshot is never
//! mutated.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Error;
use crate::metadata::TemplateMetadata;
use crate::region::Region;

/// Outcome of an identity merge attempt, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No prior snapshot was found (or it was unreadable)
    NoPrior,
    /// Prior snapshot found but geometry did not match; fresh roles stand
    GeometryMismatch,
    /// Curated roles were carried over
    Preserved,
}

/// Merge curated roles from a prior snapshot at `prior_path` into `roles`.
///
/// `regions` are the freshly detected regions (detection order) and `roles`
/// the freshly classified role map being finalized. A malformed or missing
/// prior degrades to [`MergeOutcome::NoPrior`] with a warning — never an
/// error.
pub fn merge_prior_roles(
    prior_path: &Path,
    regions: &[Region],
    roles: &mut BTreeMap<u32, String>,
) -> MergeOutcome {
    if !prior_path.exists() {
        return MergeOutcome::NoPrior;
    }
    let prior = match TemplateMetadata::load(prior_path) {
        Ok(meta) => meta,
        Err(Error::MalformedPriorMetadata(reason)) => {
            log::warn!("could not load prior metadata {}: {}", prior_path.display(), reason);
            return MergeOutcome::NoPrior;
        },
        Err(e) => {
            log::warn!("could not load prior metadata {}: {}", prior_path.display(), e);
            return MergeOutcome::NoPrior;
        },
    };

    if prior.regions.len() != regions.len() {
        log::warn!(
            "region count changed ({} -> {}), using auto-detected roles",
            prior.regions.len(),
            regions.len()
        );
        return MergeOutcome::GeometryMismatch;
    }

    let prior_by_key: BTreeMap<(u32, u32, u32, u32), &str> = prior
        .regions
        .iter()
        .map(|r| (r.key(), r.role.as_str()))
        .collect();

    if regions.iter().any(|r| !prior_by_key.contains_key(&r.bbox.key())) {
        log::warn!("region positions changed, using auto-detected roles");
        return MergeOutcome::GeometryMismatch;
    }

    for region in regions {
        if let Some(prior_role) = prior_by_key.get(&region.bbox.key()) {
            if !prior_role.is_empty() {
                roles.insert(region.id, prior_role.to_string());
            }
        }
    }
    log::info!("preserved region roles from {}", prior_path.display());
    MergeOutcome::Preserved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::geometry::RegionBox;
    use crate::metadata::RegionRecord;

    fn fresh_region(id: u32, x: u32, y: u32, w: u32, h: u32) -> Region {
        let mut r = Region::new(id, RegionBox::new(x, y, w, h), vec![]);
        r.background = Rgb::new(255, 255, 255);
        r.text = "fresh ocr".to_string();
        r
    }

    fn record(id: u32, role: &str, x: u32, y: u32, w: u32, h: u32) -> RegionRecord {
        RegionRecord {
            id,
            name: "old name".to_string(),
            role: role.to_string(),
            x,
            y,
            width: w,
            height: h,
            background_color: "#ffffff".to_string(),
            font: None,
            font_size: None,
        }
    }

    fn snapshot(records: Vec<RegionRecord>) -> TemplateMetadata {
        TemplateMetadata {
            content_color: "#6fe600".to_string(),
            width: 200,
            height: 200,
            css: vec![],
            regions: records,
        }
    }

    #[test]
    fn test_curated_roles_survive_matching_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.json");
        snapshot(vec![
            record(1, "headline", 10, 10, 50, 40),
            record(2, "", 100, 120, 80, 50),
        ])
        .save(&path)
        .unwrap();

        let regions = vec![fresh_region(1, 10, 10, 50, 40), fresh_region(2, 100, 120, 80, 50)];
        let mut roles: BTreeMap<u32, String> = BTreeMap::new();
        roles.insert(1, "content".to_string());
        roles.insert(2, "content2".to_string());

        let outcome = merge_prior_roles(&path, &regions, &mut roles);
        assert_eq!(outcome, MergeOutcome::Preserved);
        // Curated non-empty role overwrites; empty prior role does not.
        assert_eq!(roles[&1], "headline");
        assert_eq!(roles[&2], "content2");
    }

    #[test]
    fn test_count_mismatch_abandons_merge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.json");
        snapshot(vec![record(1, "headline", 10, 10, 50, 40)]).save(&path).unwrap();

        let regions = vec![fresh_region(1, 10, 10, 50, 40), fresh_region(2, 100, 120, 80, 50)];
        let mut roles: BTreeMap<u32, String> = BTreeMap::new();
        roles.insert(1, "content".to_string());

        let outcome = merge_prior_roles(&path, &regions, &mut roles);
        assert_eq!(outcome, MergeOutcome::GeometryMismatch);
        assert_eq!(roles[&1], "content");
    }

    #[test]
    fn test_moved_box_abandons_merge_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.json");
        snapshot(vec![
            record(1, "headline", 10, 10, 50, 40),
            record(2, "footer", 100, 120, 80, 50),
        ])
        .save(&path)
        .unwrap();

        // Second box shifted by one pixel: even the matching first region
        // must not inherit its curated role.
        let regions = vec![fresh_region(1, 10, 10, 50, 40), fresh_region(2, 101, 120, 80, 50)];
        let mut roles: BTreeMap<u32, String> = BTreeMap::new();
        roles.insert(1, "content".to_string());
        roles.insert(2, "content2".to_string());

        let outcome = merge_prior_roles(&path, &regions, &mut roles);
        assert_eq!(outcome, MergeOutcome::GeometryMismatch);
        assert_eq!(roles[&1], "content");
        assert_eq!(roles[&2], "content2");
    }

    #[test]
    fn test_malformed_prior_degrades_to_no_prior() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.json");
        std::fs::write(&path, "not json at all").unwrap();

        let regions = vec![fresh_region(1, 10, 10, 50, 40)];
        let mut roles: BTreeMap<u32, String> = BTreeMap::new();
        roles.insert(1, "content".to_string());

        let outcome = merge_prior_roles(&path, &regions, &mut roles);
        assert_eq!(outcome, MergeOutcome::NoPrior);
        assert_eq!(roles[&1], "content");
    }

    #[test]
    fn test_missing_prior_is_no_prior() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.json");
        let regions = vec![fresh_region(1, 10, 10, 50, 40)];
        let mut roles = BTreeMap::new();
        assert_eq!(merge_prior_roles(&path, &regions, &mut roles), MergeOutcome::NoPrior);
    }

    #[test]
    fn test_merge_is_idempotent_against_own_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.json");
        snapshot(vec![
            record(1, "content", 10, 10, 50, 40),
            record(2, "qr_code", 100, 120, 80, 50),
        ])
        .save(&path)
        .unwrap();

        let regions = vec![fresh_region(1, 10, 10, 50, 40), fresh_region(2, 100, 120, 80, 50)];
        let mut roles: BTreeMap<u32, String> = BTreeMap::new();
        roles.insert(1, "content".to_string());
        roles.insert(2, "qr_code".to_string());

        merge_prior_roles(&path, &regions, &mut roles);
        assert_eq!(roles[&1], "content");
        assert_eq!(roles[&2], "qr_code");
    }
}
