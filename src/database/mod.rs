//! Persistence for the progress aggregate.

pub mod db;

pub use db::SqliteStore;

use crate::error::ProgressError;
use crate::models::Progress;
use std::sync::{Arc, Mutex};

/// Storage backend injected into the facade. `save` must be
/// all-or-nothing: a failed save leaves the previously stored
/// aggregate intact.
pub trait ProgressStore {
    fn load(&self) -> Result<Progress, ProgressError>;
    fn save(&self, progress: &Progress) -> Result<(), ProgressError>;
}

impl<S: ProgressStore + ?Sized> ProgressStore for Arc<S> {
    fn load(&self) -> Result<Progress, ProgressError> {
        (**self).load()
    }

    fn save(&self, progress: &Progress) -> Result<(), ProgressError> {
        (**self).save(progress)
    }
}

/// In-process store for tests and embedders that persist elsewhere.
#[derive(Default)]
pub struct MemoryStore {
    saved: Mutex<Progress>,
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Result<Progress, ProgressError> {
        Ok(self.saved.lock().unwrap().clone())
    }

    fn save(&self, progress: &Progress) -> Result<(), ProgressError> {
        *self.saved.lock().unwrap() = progress.clone();
        Ok(())
    }
}
