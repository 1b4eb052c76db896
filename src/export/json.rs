//! JSON import/export for progress snapshots.
//! Lets users back up their study history and restore it on another
//! device. Timestamps are ISO-8601 strings, date keys are YYYY-MM-DD.

use crate::error::ProgressError;
use crate::models::Progress;
use std::fs;
use std::path::Path;

/// Writes a snapshot as pretty-printed JSON at the specified path.
pub fn export_json_to_path<P: AsRef<Path>>(
    progress: &Progress,
    path: P,
) -> Result<(), ProgressError> {
    let json = serde_json::to_string_pretty(progress)
        .map_err(|e| ProgressError::CorruptSnapshot(e.to_string()))?;
    fs::write(path, json)?;
    Ok(())
}

/// Reads a snapshot back. Malformed JSON and data that breaks an
/// aggregate invariant are both rejected wholesale.
pub fn import_json<P: AsRef<Path>>(path: P) -> Result<Progress, ProgressError> {
    let contents = fs::read_to_string(path)?;
    let progress: Progress =
        serde_json::from_str(&contents).map_err(|e| ProgressError::CorruptSnapshot(e.to_string()))?;
    progress.validate()?;
    Ok(progress)
}
