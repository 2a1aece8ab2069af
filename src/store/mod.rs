//! Recording persistence
//!
//! A single JSON file holds the full ordered list of recordings. The list
//! is read once when the store opens and rewritten in full on every
//! mutation, so a reload sees exactly the committed recordings in
//! insertion order.

pub mod export;
pub mod schema;

pub use export::export_recording;
pub use schema::Recording;

use crate::utils::RecorderResult;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};

/// Durable, ordered collection of finished recordings.
pub struct RecordingStore {
    path: PathBuf,
    recordings: Mutex<Vec<Recording>>,
}

impl RecordingStore {
    /// Open the store, loading whatever is persisted at `path`.
    ///
    /// A missing, unreadable, or unparsable file is non-fatal: the store
    /// starts empty instead of blocking the application.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let recordings = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<Recording>>(&content) {
                Ok(list) => {
                    tracing::info!(count = list.len(), path = ?path, "Loaded recordings");
                    list
                }
                Err(e) => {
                    tracing::warn!(path = ?path, "Recordings file is corrupt, starting empty: {e}");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!(path = ?path, "Failed to read recordings, starting empty: {e}");
                Vec::new()
            }
        };

        Self {
            path,
            recordings: Mutex::new(recordings),
        }
    }

    /// Default store location under the platform data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("open-recstudio")
            .join("recordings.json")
    }

    /// Append a finished recording and rewrite the file.
    ///
    /// A duplicate id is refused: the list keeps no duplicates and an id
    /// collision can only come from a hand-edited file.
    pub fn append(&self, recording: Recording) -> RecorderResult<()> {
        let mut list = self.recordings.lock();
        if list.iter().any(|r| r.id == recording.id) {
            tracing::warn!(id = recording.id, "Refusing duplicate recording id");
            return Ok(());
        }

        tracing::info!(id = recording.id, bytes = recording.encoded_payload.len(), "Recording committed");
        list.push(recording);
        self.persist(&list)
    }

    /// Remove a recording by id. Idempotent: deleting an absent id does
    /// nothing and reports false.
    pub fn delete(&self, id: i64) -> RecorderResult<bool> {
        let mut list = self.recordings.lock();
        let before = list.len();
        list.retain(|r| r.id != id);

        if list.len() == before {
            return Ok(false);
        }

        tracing::info!(id, "Recording deleted");
        self.persist(&list)?;
        Ok(true)
    }

    /// All recordings in insertion order.
    pub fn list(&self) -> Vec<Recording> {
        self.recordings.lock().clone()
    }

    pub fn get(&self, id: i64) -> Option<Recording> {
        self.recordings.lock().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.recordings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.lock().is_empty()
    }

    /// Materialize a recording as a downloadable file in `dir`.
    pub fn export(&self, id: i64, dir: &Path) -> RecorderResult<PathBuf> {
        let recording = self.get(id).ok_or_else(|| {
            crate::utils::RecorderError::Unknown(format!("No recording with id {id}"))
        })?;
        export_recording(&recording, dir)
    }

    // Caller holds the list lock, so readers in this process never observe
    // a partially applied mutation.
    fn persist(&self, list: &[Recording]) -> RecorderResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(list)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::constraints::RecordingMode;
    use crate::recorder::engine::MediaBlob;
    use tempfile::tempdir;

    fn recording(id: i64, data: &[u8]) -> Recording {
        let blob = MediaBlob {
            data: data.to_vec(),
            mime_type: "audio/webm".to_string(),
        };
        Recording::from_blob(id, RecordingMode::Audio, &blob, 1)
    }

    #[test]
    fn test_reload_preserves_order_and_payloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recordings.json");

        let store = RecordingStore::open(&path);
        store.append(recording(1, &[10])).unwrap();
        store.append(recording(2, &[20])).unwrap();
        store.append(recording(3, &[30])).unwrap();

        let reloaded = RecordingStore::open(&path);
        let list = reloaded.list();
        assert_eq!(list.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        for (recording, byte) in list.iter().zip([10u8, 20, 30]) {
            assert_eq!(recording.decode().unwrap().data, vec![byte]);
        }
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let store = RecordingStore::open(dir.path().join("absent.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_non_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recordings.json");
        std::fs::write(&path, "{ definitely not a list").unwrap();

        let store = RecordingStore::open(&path);
        assert!(store.is_empty());

        // The store still works after the fallback.
        store.append(recording(1, &[1])).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = RecordingStore::open(dir.path().join("recordings.json"));
        store.append(recording(5, &[1])).unwrap();

        assert!(store.delete(5).unwrap());
        assert!(!store.delete(5).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_duplicate_id_is_refused() {
        let dir = tempdir().unwrap();
        let store = RecordingStore::open(dir.path().join("recordings.json"));
        store.append(recording(7, &[1])).unwrap();
        store.append(recording(7, &[2])).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(7).unwrap().decode().unwrap().data, vec![1]);
    }

    #[test]
    fn test_export_writes_decoded_bytes() {
        let dir = tempdir().unwrap();
        let store = RecordingStore::open(dir.path().join("recordings.json"));
        store.append(recording(9, &[1, 2, 3])).unwrap();

        let out = store.export(9, dir.path()).unwrap();
        assert_eq!(
            out.file_name().and_then(|n| n.to_str()),
            Some("recording-9.webm")
        );
        assert_eq!(std::fs::read(out).unwrap(), vec![1, 2, 3]);
    }
}
