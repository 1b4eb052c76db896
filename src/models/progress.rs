//! The per-user progress aggregate: every review state, the daily
//! activity log, the bookmark/learned indexes, and the day streak.

use super::review_state::MIN_EASE_FACTOR;
use super::{DailyStat, ReviewState};
use crate::error::ProgressError;
use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub states: BTreeMap<String, ReviewState>,
    pub daily_stats: BTreeMap<NaiveDate, DailyStat>,
    /// Denormalized indexes over the per-item flags, so callers can
    /// enumerate bookmarked/learned items without scanning every state.
    /// May contain keys that were never reviewed.
    pub bookmarked: BTreeSet<String>,
    pub learned: BTreeSet<String>,
    /// Consecutive calendar days with at least one review.
    pub streak: u32,
    pub last_active: Option<DateTime<Utc>>,
}

impl Progress {
    /// Records one review event against the daily counters and the day
    /// streak. The streak moves at most once per calendar day, no
    /// matter how many items are reviewed that day.
    pub fn record_review_day(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        let first_today = self
            .daily_stats
            .get(&today)
            .is_none_or(|stat| stat.reviewed == 0);

        self.daily_stats.entry(today).or_default().reviewed += 1;

        if first_today {
            let yesterday = today - Days::new(1);
            if self.daily_stats.contains_key(&yesterday) {
                self.streak += 1;
            } else if self.streak == 0 {
                self.streak = 1;
            }
        }
    }

    /// Checks every aggregate invariant. Snapshot import rejects data
    /// wholesale on the first violation.
    pub fn validate(&self) -> Result<(), ProgressError> {
        for (key, state) in &self.states {
            if state.ease_factor < MIN_EASE_FACTOR {
                return Err(corrupt(format!(
                    "ease factor {} below {MIN_EASE_FACTOR} for '{key}'",
                    state.ease_factor
                )));
            }
            if state.interval_days == 0 {
                return Err(corrupt(format!("zero interval for '{key}'")));
            }
            if state.reviews != state.correct_count + state.incorrect_count {
                return Err(corrupt(format!("review counts do not add up for '{key}'")));
            }
            let expected = state.last_reviewed + Duration::days(i64::from(state.interval_days));
            if state.next_review != expected {
                return Err(corrupt(format!(
                    "next review out of step with interval for '{key}'"
                )));
            }
            if state.is_bookmarked != self.bookmarked.contains(key) {
                return Err(corrupt(format!("bookmark index diverges for '{key}'")));
            }
            if state.is_learned != self.learned.contains(key) {
                return Err(corrupt(format!("learned index diverges for '{key}'")));
            }
        }
        Ok(())
    }
}

fn corrupt(msg: String) -> ProgressError {
    ProgressError::CorruptSnapshot(msg)
}
