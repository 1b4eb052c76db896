//! Per-item review record. One exists for every item the user has
//! rated at least once; items never reviewed have no state at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Easiness assigned to an item before its first rating.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Easiness never drops below this floor, however often an item fails.
pub const MIN_EASE_FACTOR: f64 = 1.3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    pub reviews: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
    /// Consecutive non-Again ratings on this item.
    pub streak: u32,
    pub interval_days: u32,
    pub ease_factor: f64,
    pub last_reviewed: DateTime<Utc>,
    /// Always `last_reviewed + interval_days` days.
    pub next_review: DateTime<Utc>,
    pub is_learned: bool,
    pub is_bookmarked: bool,
}

impl ReviewState {
    /// State of an item about to receive its first rating.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            reviews: 0,
            correct_count: 0,
            incorrect_count: 0,
            streak: 0,
            interval_days: 1,
            ease_factor: INITIAL_EASE_FACTOR,
            last_reviewed: now,
            next_review: now,
            is_learned: false,
            is_bookmarked: false,
        }
    }
}
