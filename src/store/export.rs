//! Download materialization
//!
//! Turns a persisted recording back into a file a user can open, named
//! deterministically from the recording's id and container.

use crate::store::schema::Recording;
use crate::utils::RecorderResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Decode a recording and write it into `dir`.
///
/// Returns the path of the written file, `recording-{id}.{ext}` with the
/// extension matching the mime container.
pub fn export_recording(recording: &Recording, dir: &Path) -> RecorderResult<PathBuf> {
    let blob = recording.decode()?;

    fs::create_dir_all(dir)?;
    let path = dir.join(recording.file_name());
    fs::write(&path, &blob.data)?;

    tracing::info!(
        id = recording.id,
        bytes = blob.len(),
        path = ?path,
        "Recording exported"
    );
    Ok(path)
}
