//! Spaced repetition scheduling for reviewed items.
//!
//! The transitions follow the SM-2 family: each item carries an ease
//! factor that adjusts with recall quality and multiplies the review
//! interval.
//! - Again resets the interval to one day and lowers the ease factor
//! - Hard grows the interval slowly and lowers the ease factor slightly
//! - Good multiplies the interval by the ease factor
//! - Easy multiplies by the ease factor with a 1.3 bonus and raises the ease
//! The ease factor has a minimum value of 1.3 and intervals never drop
//! below one day.

use super::review_state::MIN_EASE_FACTOR;
use super::{Rating, ReviewState};
use chrono::{DateTime, Duration, Utc};

/// Intervals are clamped so `next_review` stays inside chrono's
/// representable date range even after long runs of Easy ratings.
const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Computes the next review state from the current one and a rating.
/// `state` is `None` for an item receiving its first rating. Pure: the
/// caller injects `now`, nothing is read from a global clock.
pub fn apply_rating(
    state: Option<&ReviewState>,
    rating: Rating,
    now: DateTime<Utc>,
) -> ReviewState {
    let mut next = state.cloned().unwrap_or_else(|| ReviewState::fresh(now));

    next.reviews += 1;
    if rating.is_correct() {
        next.correct_count += 1;
        next.streak += 1;
    } else {
        next.incorrect_count += 1;
        next.streak = 0;
    }

    match rating {
        Rating::Again => {
            next.interval_days = 1;
            next.ease_factor = (next.ease_factor - 0.2).max(MIN_EASE_FACTOR);
        }
        Rating::Hard => {
            next.interval_days = grow(next.interval_days, 1.2);
            next.ease_factor = (next.ease_factor - 0.15).max(MIN_EASE_FACTOR);
        }
        Rating::Good => {
            next.interval_days = grow(next.interval_days, next.ease_factor);
        }
        Rating::Easy => {
            next.interval_days = grow(next.interval_days, next.ease_factor * 1.3);
            next.ease_factor += 0.1;
        }
    }

    next.last_reviewed = now;
    next.next_review = now + Duration::days(i64::from(next.interval_days));
    next
}

/// Multiplies an interval, truncating to whole days, minimum one day.
fn grow(interval_days: u32, factor: f64) -> u32 {
    let grown = (f64::from(interval_days) * factor).floor() as u32;
    grown.clamp(1, MAX_INTERVAL_DAYS)
}
