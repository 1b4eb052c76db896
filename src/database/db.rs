//! SQLite persistence for the progress aggregate.
//!
//! Holds per-item review rows, per-day activity counters, and a small
//! key/value table for aggregate-level fields. `save` rewrites the
//! aggregate inside a single transaction, so a failed commit leaves
//! the previously stored snapshot untouched.

use crate::database::ProgressStore;
use crate::error::ProgressError;
use crate::models::{DailyStat, Progress, ReviewState};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and ensures the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProgressError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Private in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, ProgressError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, ProgressError> {
        init_schema(&conn)?;
        log::debug!("progress store ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    // One row per item key. Scheduling columns stay NULL for items that
    // only carry bookmark/learned flags and were never reviewed.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS item_progress (
            item_key TEXT PRIMARY KEY,
            reviews INTEGER,
            correct_count INTEGER,
            incorrect_count INTEGER,
            streak INTEGER,
            interval_days INTEGER,
            ease_factor REAL,
            last_reviewed TEXT,
            next_review TEXT,
            is_learned INTEGER NOT NULL DEFAULT 0,
            is_bookmarked INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS daily_stats (
            date TEXT PRIMARY KEY,
            learned INTEGER NOT NULL DEFAULT 0,
            reviewed INTEGER NOT NULL DEFAULT 0,
            total_time_seconds INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS progress_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

struct ItemRow {
    key: String,
    reviews: Option<u32>,
    correct_count: Option<u32>,
    incorrect_count: Option<u32>,
    streak: Option<u32>,
    interval_days: Option<u32>,
    ease_factor: Option<f64>,
    last_reviewed: Option<String>,
    next_review: Option<String>,
    is_learned: bool,
    is_bookmarked: bool,
}

impl ProgressStore for SqliteStore {
    fn load(&self) -> Result<Progress, ProgressError> {
        let conn = self.conn.lock().unwrap();
        let mut progress = Progress::default();

        let mut stmt = conn.prepare(
            "SELECT item_key, reviews, correct_count, incorrect_count, streak,
                    interval_days, ease_factor, last_reviewed, next_review,
                    is_learned, is_bookmarked
             FROM item_progress",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ItemRow {
                key: row.get(0)?,
                reviews: row.get(1)?,
                correct_count: row.get(2)?,
                incorrect_count: row.get(3)?,
                streak: row.get(4)?,
                interval_days: row.get(5)?,
                ease_factor: row.get(6)?,
                last_reviewed: row.get(7)?,
                next_review: row.get(8)?,
                is_learned: row.get(9)?,
                is_bookmarked: row.get(10)?,
            })
        })?;

        for row in rows {
            let row = row?;
            if row.is_learned {
                progress.learned.insert(row.key.clone());
            }
            if row.is_bookmarked {
                progress.bookmarked.insert(row.key.clone());
            }
            if let (
                Some(reviews),
                Some(correct_count),
                Some(incorrect_count),
                Some(streak),
                Some(interval_days),
                Some(ease_factor),
                Some(last_reviewed),
                Some(next_review),
            ) = (
                row.reviews,
                row.correct_count,
                row.incorrect_count,
                row.streak,
                row.interval_days,
                row.ease_factor,
                row.last_reviewed.as_deref(),
                row.next_review.as_deref(),
            ) {
                let state = ReviewState {
                    reviews,
                    correct_count,
                    incorrect_count,
                    streak,
                    interval_days,
                    ease_factor,
                    last_reviewed: parse_timestamp(last_reviewed)?,
                    next_review: parse_timestamp(next_review)?,
                    is_learned: row.is_learned,
                    is_bookmarked: row.is_bookmarked,
                };
                progress.states.insert(row.key, state);
            }
        }

        let mut stmt =
            conn.prepare("SELECT date, learned, reviewed, total_time_seconds FROM daily_stats")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                DailyStat {
                    learned: row.get(1)?,
                    reviewed: row.get(2)?,
                    total_time_seconds: row.get(3)?,
                },
            ))
        })?;
        for row in rows {
            let (date, stat) = row?;
            let date = date.parse::<NaiveDate>().map_err(|e| {
                ProgressError::CorruptSnapshot(format!("bad date key '{date}': {e}"))
            })?;
            progress.daily_stats.insert(date, stat);
        }

        if let Some(value) = read_meta(&conn, "streak")? {
            progress.streak = value
                .parse()
                .map_err(|e| ProgressError::CorruptSnapshot(format!("bad streak value: {e}")))?;
        }
        if let Some(value) = read_meta(&conn, "last_active")? {
            progress.last_active = Some(parse_timestamp(&value)?);
        }

        Ok(progress)
    }

    fn save(&self, progress: &Progress) -> Result<(), ProgressError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM item_progress", ())?;
        tx.execute("DELETE FROM daily_stats", ())?;
        tx.execute("DELETE FROM progress_meta", ())?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO item_progress (item_key, reviews, correct_count, incorrect_count,
                     streak, interval_days, ease_factor, last_reviewed, next_review,
                     is_learned, is_bookmarked)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;

            // Items with flags but no review history still get a row.
            let mut keys: BTreeSet<&String> = progress.states.keys().collect();
            keys.extend(progress.bookmarked.iter());
            keys.extend(progress.learned.iter());

            for key in keys {
                match progress.states.get(key) {
                    Some(state) => stmt.execute(params![
                        key,
                        state.reviews,
                        state.correct_count,
                        state.incorrect_count,
                        state.streak,
                        state.interval_days,
                        state.ease_factor,
                        state.last_reviewed.to_rfc3339(),
                        state.next_review.to_rfc3339(),
                        state.is_learned,
                        state.is_bookmarked,
                    ])?,
                    None => stmt.execute(params![
                        key,
                        None::<u32>,
                        None::<u32>,
                        None::<u32>,
                        None::<u32>,
                        None::<u32>,
                        None::<f64>,
                        None::<String>,
                        None::<String>,
                        progress.learned.contains(key),
                        progress.bookmarked.contains(key),
                    ])?,
                };
            }

            let mut stmt = tx.prepare(
                "INSERT INTO daily_stats (date, learned, reviewed, total_time_seconds)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (date, stat) in &progress.daily_stats {
                stmt.execute(params![
                    date.format("%Y-%m-%d").to_string(),
                    stat.learned,
                    stat.reviewed,
                    stat.total_time_seconds,
                ])?;
            }

            let mut stmt =
                tx.prepare("INSERT INTO progress_meta (key, value) VALUES (?1, ?2)")?;
            stmt.execute(params!["streak", progress.streak.to_string()])?;
            if let Some(last_active) = progress.last_active {
                stmt.execute(params!["last_active", last_active.to_rfc3339()])?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

fn read_meta(conn: &Connection, key: &str) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT value FROM progress_meta WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, ProgressError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ProgressError::CorruptSnapshot(format!("bad timestamp '{text}': {e}")))
}
