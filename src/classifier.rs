//! Geometric role classification.
//!
//! A pure function over a geometry summary (bounding boxes + ids in
//! detection order) — no pixel content, no state. Rules run in a fixed
//! precedence and each rule only considers regions left unassigned by the
//! rules before it; reordering the rules changes outcomes on ambiguous
//! layouts, so the order here is part of the contract.

use std::collections::BTreeMap;

use crate::geometry::RegionBox;

/// Role tag for the square QR code slot.
pub const ROLE_QR_CODE: &str = "qr_code";
/// Role tag for the wide URL strip.
pub const ROLE_URL: &str = "url";
/// Role tag for the event time line.
pub const ROLE_TIME: &str = "time";
/// Role tag for the event date line.
pub const ROLE_DATE: &str = "date";
/// Role tag for the event place line.
pub const ROLE_PLACE: &str = "place";
/// Role tag for the primary content area.
pub const ROLE_CONTENT: &str = "content";
/// Role tag for the secondary content area.
pub const ROLE_CONTENT2: &str = "content2";

/// Minimal geometry view of a region, in detection (id) order.
#[derive(Debug, Clone, Copy)]
pub struct RegionShape {
    /// Region id
    pub id: u32,
    /// Pixel-space bounding box
    pub bbox: RegionBox,
}

/// Assign semantic roles from geometry alone.
///
/// Returns a role per region id; unassigned regions map to the empty
/// string. `shapes` must be in detection order (ascending id).
///
/// Precedence:
/// 1. `qr_code` — last near-square region (aspect in `[0.85, 1.15]`),
///    unless that region is the very first one: an isolated square at the
///    front is assumed decorative.
/// 2. `url` — last unassigned wide region (aspect ≥ 2.0); when the QR slot
///    sits inside the wide set, the entry just before it is preferred so
///    the two never collide.
/// 3. `time`/`date`/`place` — largest same-size bucket (dimensions rounded
///    to 10 px) among unassigned regions with aspect ≥ 1.6; assigned to its
///    first three members in id order, and skipped entirely when the bucket
///    has fewer than three.
/// 4. `content`/`content2` — the two largest unassigned regions by area.
pub fn classify(shapes: &[RegionShape]) -> BTreeMap<u32, String> {
    let mut roles: BTreeMap<u32, String> =
        shapes.iter().map(|s| (s.id, String::new())).collect();
    if shapes.is_empty() {
        return roles;
    }

    // Rule 1: qr_code
    let squareish: Vec<&RegionShape> = shapes
        .iter()
        .filter(|s| (0.85..=1.15).contains(&s.bbox.aspect()))
        .collect();
    let mut qr_id: Option<u32> = None;
    if let Some(candidate) = squareish.last() {
        if candidate.id != shapes[0].id {
            qr_id = Some(candidate.id);
            roles.insert(candidate.id, ROLE_QR_CODE.to_string());
        }
    }

    // Rule 2: url
    let wide: Vec<&RegionShape> = shapes
        .iter()
        .filter(|s| roles[&s.id].is_empty() && s.bbox.aspect() >= 2.0)
        .collect();
    let mut url_id: Option<u32> = None;
    if let Some(qr) = qr_id {
        if let Some(pos) = wide.iter().position(|s| s.id == qr) {
            if pos > 0 {
                url_id = Some(wide[pos - 1].id);
            }
        }
    }
    if let Some(chosen) = url_id.or_else(|| wide.last().map(|s| s.id)) {
        roles.insert(chosen, ROLE_URL.to_string());
    }

    // Rule 3: time/date/place
    let wsp: Vec<&RegionShape> = shapes
        .iter()
        .filter(|s| roles[&s.id].is_empty() && s.bbox.aspect() >= 1.6)
        .collect();
    let mut bucket: Vec<u32> = Vec::new();
    if wsp.len() >= 3 {
        // Bucket by rounded width/height; insertion order preserved so a
        // size tie keeps the bucket encountered first.
        let mut buckets: Vec<((i64, i64), Vec<u32>)> = Vec::new();
        for s in &wsp {
            let key = (
                (s.bbox.width as f64 / 10.0).round() as i64,
                (s.bbox.height as f64 / 10.0).round() as i64,
            );
            match buckets.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(s.id),
                None => buckets.push((key, vec![s.id])),
            }
        }
        let mut best = 0usize;
        for (i, (_, members)) in buckets.iter().enumerate() {
            if members.len() > buckets[best].1.len() {
                best = i;
            }
        }
        if buckets[best].1.len() >= 3 {
            bucket = buckets[best].1.clone();
        }
    }
    if bucket.len() >= 3 {
        for (role, id) in [ROLE_TIME, ROLE_DATE, ROLE_PLACE].iter().zip(bucket.iter()) {
            roles.insert(*id, role.to_string());
        }
    }

    // Rule 4: content / content2
    let mut remaining: Vec<&RegionShape> = shapes
        .iter()
        .filter(|s| roles[&s.id].is_empty())
        .collect();
    // Stable sort: equal areas keep id order.
    remaining.sort_by(|a, b| b.bbox.area().cmp(&a.bbox.area()));
    if let Some(first) = remaining.first() {
        roles.insert(first.id, ROLE_CONTENT.to_string());
    }
    if remaining.len() >= 2 {
        roles.insert(remaining[1].id, ROLE_CONTENT2.to_string());
    }

    roles
}
