//! Head-band helmet association.
//!
//! Decides, for one person box and one frame's helmet boxes, whether the
//! person currently counts as wearing a helmet.
//!
//! This is a heuristic, not a matching algorithm: the search stops at the
//! first qualifying helmet, and a single helmet box may qualify for several
//! overlapping persons in the same frame. There is no one-to-one assignment
//! and no distance or IoU ranking. Downstream consumers depend on this
//! (possibly double-counting) behavior; do not introduce exclusivity here.

use crate::BoundingBox;

/// Fraction of the person box height, measured from the top, searched for a
/// helmet center.
pub const HEAD_BAND_RATIO: f64 = 0.25;

/// Returns true when any helmet center lies strictly inside the person's
/// horizontal extent and strictly inside the top quarter of the person box.
///
/// Pure function of its inputs; empty `helmets` yields false. O(helmets).
pub fn has_helmet(person: &BoundingBox, helmets: &[BoundingBox]) -> bool {
    let head_band_y = person.y_min as f64
        + (person.y_max - person.y_min) as f64 * HEAD_BAND_RATIO;

    helmets.iter().any(|helmet| {
        let (cx, cy) = helmet.center();
        (person.x_min as f64) < cx
            && cx < person.x_max as f64
            && (person.y_min as f64) < cy
            && cy < head_band_y
    })
}
