//! Device stream acquisition and release
//!
//! Thin orchestration layer over a [`CaptureBackend`]: resolves constraints
//! for a mode, opens and closes streams, and exposes the per-track toggles
//! and device enumeration a host UI needs.

use crate::capture::constraints::{MediaConstraints, RecordingMode};
use crate::capture::stream::MediaStream;
use crate::capture::traits::{AudioDeviceInfo, CameraInfo, CaptureBackend, MediaSupport, TrackKind};
use crate::utils::RecorderResult;
use std::sync::Arc;

pub struct DeviceStreamManager {
    backend: Arc<dyn CaptureBackend>,
}

impl DeviceStreamManager {
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        Self { backend }
    }

    /// Request device access for a mode.
    ///
    /// Side effect: opens live hardware channels. On error nothing stays
    /// open; the backend cleans up anything partially acquired.
    pub async fn acquire(&self, mode: RecordingMode) -> RecorderResult<MediaStream> {
        let constraints = MediaConstraints::for_mode(mode);
        tracing::info!(?mode, ?constraints, "Acquiring device stream");

        let stream = self.backend.acquire(constraints).await?;
        tracing::info!(stream_id = %stream.id(), tracks = stream.tracks().len(), "Device stream acquired");
        Ok(stream)
    }

    /// Stop all tracks of a stream. Idempotent, safe on every exit path.
    pub fn release(&self, stream: &MediaStream) {
        stream.release();
    }

    /// Mute/unmute one track kind in place, without renegotiating the
    /// stream or stopping capture of the other kind.
    pub fn set_track_enabled(&self, stream: &MediaStream, kind: TrackKind, enabled: bool) -> bool {
        stream.set_track_enabled(kind, enabled)
    }

    /// Whether the runtime offers the required capture and recording
    /// primitives. Never errors.
    pub fn probe_support(&self) -> MediaSupport {
        self.backend.probe_support()
    }

    /// Mime type recordings in this mode will carry.
    pub fn mime_type(&self, mode: RecordingMode) -> String {
        self.backend.mime_type(mode)
    }

    /// List available microphones.
    pub fn audio_devices(&self) -> Vec<AudioDeviceInfo> {
        self.backend.audio_devices()
    }

    /// List available cameras.
    pub fn cameras(&self) -> Vec<CameraInfo> {
        self.backend.cameras()
    }
}
