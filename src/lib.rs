pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod tracker;

pub use database::{MemoryStore, ProgressStore, SqliteStore};
pub use error::ProgressError;
pub use models::{DailyStat, Progress, ProgressStats, Rating, ReviewState};
pub use tracker::ProgressTracker;
