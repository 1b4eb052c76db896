//! Read-only statistics projections. These never mutate the aggregate;
//! callers pull them on demand instead of the engine pushing updates.

use super::Progress;
use serde::Serialize;

/// Bundle returned by the facade's `stats` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub accuracy: u32,
    pub mastery: u32,
    pub total_reviews: u64,
    pub streak: u32,
}

/// Percentage of correct answers over all recorded reviews, 0 when
/// nothing has been reviewed yet.
pub fn accuracy(progress: &Progress) -> u32 {
    let total = total_reviews(progress);
    if total == 0 {
        return 0;
    }
    let correct: u64 = progress
        .states
        .values()
        .map(|state| u64::from(state.correct_count))
        .sum();
    (100.0 * correct as f64 / total as f64).round() as u32
}

/// Percentage of the catalog flagged learned, 0 for an empty catalog.
pub fn mastery(progress: &Progress, total_catalog_size: usize) -> u32 {
    if total_catalog_size == 0 {
        return 0;
    }
    (100.0 * progress.learned.len() as f64 / total_catalog_size as f64).round() as u32
}

pub fn total_reviews(progress: &Progress) -> u64 {
    progress
        .states
        .values()
        .map(|state| u64::from(state.reviews))
        .sum()
}
