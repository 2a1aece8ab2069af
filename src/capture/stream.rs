//! Owned media stream handles
//!
//! A [`MediaStream`] is the exclusive handle to live capture channels for
//! one session. Tracks can be muted in place without renegotiation, and
//! release is idempotent so every exit path can call it safely.

use crate::capture::traits::TrackKind;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A single capture track (microphone or camera channel).
#[derive(Debug, Clone)]
pub struct MediaTrack {
    kind: TrackKind,
    label: String,
    enabled: Arc<AtomicBool>,
}

impl MediaTrack {
    pub fn new(kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Mute/unmute in place. Capture keeps running; producers observe the
    /// flag and substitute silence/skip frames while disabled.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Shared flag handed to capture threads so they can observe toggles.
    pub fn enabled_flag(&self) -> Arc<AtomicBool> {
        self.enabled.clone()
    }
}

/// Owned handle to live capture channels.
///
/// Exactly one stream exists per active session. The chunk receiver can be
/// taken once, by the recording engine; the shutdown flag is shared with
/// the backend's capture threads, which exit once it flips.
pub struct MediaStream {
    id: Uuid,
    tracks: Vec<MediaTrack>,
    chunks: Mutex<Option<mpsc::UnboundedReceiver<Vec<u8>>>>,
    shutdown: Arc<AtomicBool>,
}

impl MediaStream {
    pub fn new(
        tracks: Vec<MediaTrack>,
        chunks: mpsc::UnboundedReceiver<Vec<u8>>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tracks,
            chunks: Mutex::new(Some(chunks)),
            shutdown,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn track(&self, kind: TrackKind) -> Option<&MediaTrack> {
        self.tracks.iter().find(|t| t.kind() == kind)
    }

    /// Mute/unmute one track kind without touching the other.
    ///
    /// Returns false when the stream has no track of that kind
    /// (e.g. toggling the camera on an audio-only stream).
    pub fn set_track_enabled(&self, kind: TrackKind, enabled: bool) -> bool {
        match self.track(kind) {
            Some(track) => {
                track.set_enabled(enabled);
                tracing::debug!(stream_id = %self.id, ?kind, enabled, "Track toggled");
                true
            }
            None => false,
        }
    }

    /// Take the chunk receiver. Only the first caller gets it; a second
    /// recording engine on the same stream is refused upstream.
    pub fn take_chunks(&self) -> Option<mpsc::UnboundedReceiver<Vec<u8>>> {
        self.chunks.lock().take()
    }

    /// Stop all tracks and signal capture threads to exit.
    ///
    /// Idempotent: the second and later calls do nothing.
    pub fn release(&self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            tracing::info!(stream_id = %self.id, "Media stream released");
        }
    }

    pub fn is_released(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

impl Drop for MediaStream {
    fn drop(&mut self) {
        // Last line of defense against leaking an open device indicator.
        self.release();
    }
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("tracks", &self.tracks.len())
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_with(kinds: &[TrackKind]) -> MediaStream {
        let tracks = kinds.iter().map(|&k| MediaTrack::new(k, "test")).collect();
        let (_tx, rx) = mpsc::unbounded_channel();
        MediaStream::new(tracks, rx, Arc::new(AtomicBool::new(false)))
    }

    #[test]
    fn test_toggle_one_track_leaves_other_alone() {
        let stream = stream_with(&[TrackKind::Audio, TrackKind::Video]);

        assert!(stream.set_track_enabled(TrackKind::Video, false));
        assert_eq!(
            stream.track(TrackKind::Video).map(|t| t.is_enabled()),
            Some(false)
        );
        assert_eq!(
            stream.track(TrackKind::Audio).map(|t| t.is_enabled()),
            Some(true)
        );
    }

    #[test]
    fn test_toggle_missing_track_is_refused() {
        let stream = stream_with(&[TrackKind::Audio]);
        assert!(!stream.set_track_enabled(TrackKind::Video, false));
    }

    #[test]
    fn test_release_is_idempotent() {
        let stream = stream_with(&[TrackKind::Audio]);
        assert!(!stream.is_released());
        stream.release();
        assert!(stream.is_released());
        // Second call has no effect beyond the first.
        stream.release();
        assert!(stream.is_released());
    }

    #[test]
    fn test_chunk_receiver_taken_once() {
        let stream = stream_with(&[TrackKind::Audio]);
        assert!(stream.take_chunks().is_some());
        assert!(stream.take_chunks().is_none());
    }
}
