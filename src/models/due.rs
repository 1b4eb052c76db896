//! Due-item projection over the progress aggregate.

use super::Progress;
use chrono::{DateTime, Utc};

/// Returns the catalog keys whose scheduled review time has passed,
/// oldest first. Items never reviewed are not due; callers treat them
/// as a separate, unscheduled pool. The ordering is a convenience for
/// callers, not a contract.
pub fn due_items<'a, I>(catalog: I, progress: &Progress, now: DateTime<Utc>) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut due: Vec<(&str, DateTime<Utc>)> = catalog
        .into_iter()
        .filter_map(|key| {
            progress
                .states
                .get(key)
                .filter(|state| state.next_review <= now)
                .map(|state| (key, state.next_review))
        })
        .collect();

    due.sort_by_key(|&(_, next_review)| next_review);
    due.into_iter().map(|(key, _)| key.to_string()).collect()
}

/// Number of due items, without materializing the list.
pub fn due_count<'a, I>(catalog: I, progress: &Progress, now: DateTime<Utc>) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    catalog
        .into_iter()
        .filter(|key| {
            progress
                .states
                .get(*key)
                .is_some_and(|state| state.next_review <= now)
        })
        .count()
}
