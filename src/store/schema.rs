//! Recording entity
//!
//! A recording is created exactly once when a session stops and is
//! immutable afterwards; the only mutation the store ever applies is
//! removal. The payload travels base64-encoded so the persisted form is a
//! portable text blob that reconstructs the media object byte for byte.

use crate::capture::constraints::{extension_for_mime, RecordingMode};
use crate::recorder::engine::MediaBlob;
use crate::utils::{RecorderError, RecorderResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

/// A committed, persisted recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    /// Unique, monotonic, time-derived id (millisecond timestamp)
    pub id: i64,

    /// What was captured
    pub mode: RecordingMode,

    /// Container type of the decoded payload
    pub mime_type: String,

    /// Base64 encoding of the media object
    pub encoded_payload: String,

    /// When the recording was committed
    pub created_at: DateTime<Utc>,

    /// Elapsed seconds at the moment stop was invoked
    pub duration_seconds: u64,
}

impl Recording {
    /// Build a recording from an assembled media object.
    pub fn from_blob(id: i64, mode: RecordingMode, blob: &MediaBlob, duration_seconds: u64) -> Self {
        Self {
            id,
            mode,
            mime_type: blob.mime_type.clone(),
            encoded_payload: STANDARD.encode(&blob.data),
            created_at: Utc::now(),
            duration_seconds,
        }
    }

    /// Reconstruct the playable media object from the persisted payload.
    pub fn decode(&self) -> RecorderResult<MediaBlob> {
        let data = STANDARD
            .decode(&self.encoded_payload)
            .map_err(|e| RecorderError::Unknown(format!("Corrupt recording payload: {e}")))?;
        Ok(MediaBlob {
            data,
            mime_type: self.mime_type.clone(),
        })
    }

    /// Deterministic export file name derived from id and container.
    pub fn file_name(&self) -> String {
        format!("recording-{}.{}", self.id, extension_for_mime(&self.mime_type))
    }
}

/// Derive the next recording id: the current millisecond timestamp, clamped
/// strictly above the previous id so back-to-back stops stay unique and
/// monotonic.
pub fn next_recording_id(last_id: &AtomicI64) -> i64 {
    let now = Utc::now().timestamp_millis();
    last_id
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .map(|last| now.max(last + 1))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(data: &[u8]) -> MediaBlob {
        MediaBlob {
            data: data.to_vec(),
            mime_type: "audio/webm".to_string(),
        }
    }

    #[test]
    fn test_payload_round_trip_is_byte_identical() {
        let original = blob(&[0, 1, 2, 253, 254, 255]);
        let recording = Recording::from_blob(1, RecordingMode::Audio, &original, 3);

        let decoded = recording.decode().unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_empty_payload_round_trips() {
        let original = blob(&[]);
        let recording = Recording::from_blob(2, RecordingMode::Audio, &original, 0);
        assert_eq!(recording.decode().unwrap(), original);
    }

    #[test]
    fn test_corrupt_payload_is_an_error() {
        let mut recording = Recording::from_blob(3, RecordingMode::Audio, &blob(&[1]), 1);
        recording.encoded_payload = "not base64!!!".to_string();
        assert!(recording.decode().is_err());
    }

    #[test]
    fn test_deterministic_file_name() {
        let recording = Recording::from_blob(1700000000000, RecordingMode::Audio, &blob(&[1]), 1);
        assert_eq!(recording.file_name(), "recording-1700000000000.webm");
    }

    #[test]
    fn test_ids_stay_strictly_monotonic() {
        let last = AtomicI64::new(0);
        let a = next_recording_id(&last);
        let b = next_recording_id(&last);
        let c = next_recording_id(&last);
        assert!(a < b && b < c);
    }
}
