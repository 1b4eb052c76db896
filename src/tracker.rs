//! Facade over the progress aggregate. External collaborators (card
//! grids, quiz screens, stats panels) go through this type only; it
//! composes the scheduler, the due/statistics projections, and the
//! streak bookkeeping, and owns the persistence lifecycle.

use crate::database::ProgressStore;
use crate::error::ProgressError;
use crate::models::{Progress, ProgressStats, Rating, ReviewState, due, scheduler, stats};
use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// One coarse lock guards the aggregate: mutating operations build a
/// working copy, persist it, and only then swap it in. A storage
/// failure therefore rolls back to the last durable snapshot, and
/// readers never observe a half-applied update.
pub struct ProgressTracker<S: ProgressStore> {
    store: S,
    progress: Mutex<Progress>,
}

impl<S: ProgressStore> ProgressTracker<S> {
    /// Loads the stored aggregate and wraps it.
    pub fn new(store: S) -> Result<Self, ProgressError> {
        let progress = store.load()?;
        Ok(Self {
            store,
            progress: Mutex::new(progress),
        })
    }

    /// Applies a rating to an item, records the daily activity, and
    /// persists. Returns the item's new state. Not idempotent: a retry
    /// after an ambiguous failure applies the rating twice.
    pub fn review(
        &self,
        item_key: &str,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<ReviewState, ProgressError> {
        self.commit(|progress| {
            let mut state = scheduler::apply_rating(progress.states.get(item_key), rating, now);
            // A first rating on a flag-only item inherits its flags.
            state.is_bookmarked = progress.bookmarked.contains(item_key);
            state.is_learned = progress.learned.contains(item_key);
            progress.states.insert(item_key.to_string(), state.clone());
            progress.record_review_day(now);
            progress.last_active = Some(now);
            state
        })
    }

    /// Flips an item's bookmark flag and returns the new value. Works
    /// for items never reviewed; those carry the flag without a review
    /// state.
    pub fn toggle_bookmark(&self, item_key: &str) -> Result<bool, ProgressError> {
        self.commit(|progress| {
            let bookmarked = if progress.bookmarked.remove(item_key) {
                false
            } else {
                progress.bookmarked.insert(item_key.to_string());
                true
            };
            if let Some(state) = progress.states.get_mut(item_key) {
                state.is_bookmarked = bookmarked;
            }
            bookmarked
        })
    }

    /// Flips an item's learned flag and returns the new value. The
    /// transition to learned counts toward today's stats.
    pub fn toggle_learned(
        &self,
        item_key: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, ProgressError> {
        self.commit(|progress| {
            let learned = if progress.learned.remove(item_key) {
                false
            } else {
                progress.learned.insert(item_key.to_string());
                true
            };
            if let Some(state) = progress.states.get_mut(item_key) {
                state.is_learned = learned;
            }
            if learned {
                progress
                    .daily_stats
                    .entry(now.date_naive())
                    .or_default()
                    .learned += 1;
            }
            learned
        })
    }

    /// Adds drill time reported by a session to today's counters.
    pub fn record_study_time(
        &self,
        seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<(), ProgressError> {
        self.commit(|progress| {
            progress
                .daily_stats
                .entry(now.date_naive())
                .or_default()
                .total_time_seconds += seconds;
            progress.last_active = Some(now);
        })
    }

    /// Catalog keys whose scheduled review time has passed, oldest
    /// first. Which due item to show next is the caller's policy.
    pub fn due_items<'a, I>(&self, catalog: I, now: DateTime<Utc>) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        due::due_items(catalog, &self.progress.lock().unwrap(), now)
    }

    pub fn due_count<'a, I>(&self, catalog: I, now: DateTime<Utc>) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        due::due_count(catalog, &self.progress.lock().unwrap(), now)
    }

    pub fn stats(&self, total_catalog_size: usize) -> ProgressStats {
        let progress = self.progress.lock().unwrap();
        ProgressStats {
            accuracy: stats::accuracy(&progress),
            mastery: stats::mastery(&progress, total_catalog_size),
            total_reviews: stats::total_reviews(&progress),
            streak: progress.streak,
        }
    }

    /// Drops every record and persists the empty aggregate. Irreversible.
    pub fn reset(&self) -> Result<(), ProgressError> {
        self.commit(|progress| *progress = Progress::default())?;
        log::info!("progress reset");
        Ok(())
    }

    /// A consistent copy of the full aggregate, for backup.
    pub fn export_snapshot(&self) -> Progress {
        self.progress.lock().unwrap().clone()
    }

    /// Replaces the aggregate with a snapshot after validating it
    /// wholesale. A snapshot that fails validation or cannot be
    /// persisted leaves the current aggregate untouched.
    pub fn import_snapshot(&self, snapshot: Progress) -> Result<(), ProgressError> {
        snapshot.validate()?;
        self.commit(move |progress| *progress = snapshot)?;
        log::info!("snapshot imported");
        Ok(())
    }

    /// Read-modify-write as one atomic unit: mutate a working copy,
    /// save it, then publish it. On save failure the aggregate keeps
    /// its previous value and the error is handed to the caller.
    fn commit<T>(&self, mutate: impl FnOnce(&mut Progress) -> T) -> Result<T, ProgressError> {
        let mut guard = self.progress.lock().unwrap();
        let mut next = guard.clone();
        let out = mutate(&mut next);
        self.store.save(&next)?;
        *guard = next;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 10, 0, 0).unwrap()
    }

    fn tracker() -> ProgressTracker<MemoryStore> {
        ProgressTracker::new(MemoryStore::default()).unwrap()
    }

    /// Store whose saves always fail, for rollback coverage.
    struct BrokenStore;

    impl ProgressStore for BrokenStore {
        fn load(&self) -> Result<Progress, ProgressError> {
            Ok(Progress::default())
        }

        fn save(&self, _progress: &Progress) -> Result<(), ProgressError> {
            Err(ProgressError::Storage(rusqlite::Error::QueryReturnedNoRows))
        }
    }

    #[test]
    fn test_review_creates_state_lazily() {
        let tracker = tracker();
        let state = tracker.review("kanji:water", Rating::Good, at(1)).unwrap();

        assert_eq!(state.reviews, 1);
        assert_eq!(state.interval_days, 2);
        assert_eq!(tracker.export_snapshot().streak, 1);
    }

    #[test]
    fn test_review_survives_restart() {
        let store = Arc::new(MemoryStore::default());
        let tracker = ProgressTracker::new(Arc::clone(&store)).unwrap();
        tracker.review("kanji:water", Rating::Good, at(1)).unwrap();

        let reopened = ProgressTracker::new(store).unwrap();
        assert_eq!(reopened.export_snapshot(), tracker.export_snapshot());
    }

    #[test]
    fn test_storage_failure_rolls_back() {
        let tracker = ProgressTracker::new(BrokenStore).unwrap();
        let err = tracker.review("kanji:water", Rating::Good, at(1)).unwrap_err();

        assert!(matches!(err, ProgressError::Storage(_)));
        assert_eq!(tracker.export_snapshot(), Progress::default());
    }

    #[test]
    fn test_toggle_bookmark_without_review_state() {
        let tracker = tracker();

        assert!(tracker.toggle_bookmark("kanji:fire").unwrap());
        let snapshot = tracker.export_snapshot();
        assert!(snapshot.bookmarked.contains("kanji:fire"));
        assert!(!snapshot.states.contains_key("kanji:fire"));

        assert!(!tracker.toggle_bookmark("kanji:fire").unwrap());
        assert!(tracker.export_snapshot().bookmarked.is_empty());
    }

    #[test]
    fn test_toggle_bookmark_keeps_flag_and_index_together() {
        let tracker = tracker();
        tracker.review("kanji:water", Rating::Good, at(1)).unwrap();
        tracker.toggle_bookmark("kanji:water").unwrap();

        let snapshot = tracker.export_snapshot();
        assert!(snapshot.states["kanji:water"].is_bookmarked);
        assert!(snapshot.bookmarked.contains("kanji:water"));
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_first_review_inherits_existing_flags() {
        let tracker = tracker();
        tracker.toggle_learned("kanji:water", at(1)).unwrap();
        tracker.toggle_bookmark("kanji:water").unwrap();

        let state = tracker.review("kanji:water", Rating::Good, at(1)).unwrap();
        assert!(state.is_learned);
        assert!(state.is_bookmarked);
        assert!(tracker.export_snapshot().validate().is_ok());
    }

    #[test]
    fn test_toggle_learned_counts_transition_once() {
        let tracker = tracker();
        tracker.toggle_learned("kanji:fire", at(1)).unwrap();
        tracker.toggle_learned("kanji:fire", at(1)).unwrap();
        tracker.toggle_learned("kanji:fire", at(1)).unwrap();

        let snapshot = tracker.export_snapshot();
        // On, off, on again: two transitions to learned.
        assert_eq!(snapshot.daily_stats[&at(1).date_naive()].learned, 2);
        assert!(snapshot.learned.contains("kanji:fire"));
    }

    #[test]
    fn test_record_study_time_accumulates() {
        let tracker = tracker();
        tracker.record_study_time(300, at(1)).unwrap();
        tracker.record_study_time(120, at(1)).unwrap();

        let snapshot = tracker.export_snapshot();
        assert_eq!(snapshot.daily_stats[&at(1).date_naive()].total_time_seconds, 420);
        assert_eq!(snapshot.last_active, Some(at(1)));
    }

    #[test]
    fn test_due_queries_follow_reviews() {
        let tracker = tracker();
        let catalog = ["kanji:water", "kanji:fire", "kanji:tree"];
        tracker.review("kanji:water", Rating::Again, at(1)).unwrap();

        assert_eq!(tracker.due_count(catalog, at(1)), 0);
        assert_eq!(tracker.due_items(catalog, at(2)), vec!["kanji:water".to_string()]);
    }

    #[test]
    fn test_stats_bundle() {
        let tracker = tracker();
        tracker.review("kanji:water", Rating::Good, at(1)).unwrap();
        tracker.review("kanji:fire", Rating::Again, at(1)).unwrap();
        tracker.toggle_learned("kanji:water", at(1)).unwrap();

        let stats = tracker.stats(4);
        assert_eq!(stats.accuracy, 50);
        assert_eq!(stats.mastery, 25);
        assert_eq!(stats.total_reviews, 2);
        assert_eq!(stats.streak, 1);
    }

    #[test]
    fn test_stats_on_fresh_tracker() {
        let stats = tracker().stats(0);
        assert_eq!(stats.accuracy, 0);
        assert_eq!(stats.mastery, 0);
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.streak, 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let store = Arc::new(MemoryStore::default());
        let tracker = ProgressTracker::new(Arc::clone(&store)).unwrap();
        tracker.review("kanji:water", Rating::Good, at(1)).unwrap();
        tracker.toggle_bookmark("kanji:fire").unwrap();

        tracker.reset().unwrap();
        assert_eq!(tracker.export_snapshot(), Progress::default());
        // The reset is durable, not just in-memory.
        assert_eq!(store.load().unwrap(), Progress::default());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let tracker = tracker();
        tracker.review("kanji:water", Rating::Good, at(1)).unwrap();
        tracker.review("kanji:water", Rating::Easy, at(3)).unwrap();
        tracker.toggle_learned("vocab:river", at(3)).unwrap();
        let snapshot = tracker.export_snapshot();

        let restored = ProgressTracker::new(MemoryStore::default()).unwrap();
        restored.import_snapshot(snapshot.clone()).unwrap();
        assert_eq!(restored.export_snapshot(), snapshot);
    }

    #[test]
    fn test_import_rejects_corrupt_snapshot() {
        let tracker = tracker();
        tracker.review("kanji:water", Rating::Good, at(1)).unwrap();
        let before = tracker.export_snapshot();

        let mut bad = before.clone();
        bad.states.get_mut("kanji:water").unwrap().ease_factor = 0.5;

        let err = tracker.import_snapshot(bad).unwrap_err();
        assert!(matches!(err, ProgressError::CorruptSnapshot(_)));
        assert_eq!(tracker.export_snapshot(), before);
    }
}
