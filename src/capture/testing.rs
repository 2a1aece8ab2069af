//! Scripted capture backend for tests
//!
//! No hardware: acquisitions hand out streams whose chunk channel the test
//! feeds by hand, and the next acquire can be scripted to fail.

use crate::capture::constraints::{MediaConstraints, RecordingMode};
use crate::capture::stream::{MediaStream, MediaTrack};
use crate::capture::traits::{AudioDeviceInfo, CameraInfo, CaptureBackend, MediaSupport, TrackKind};
use crate::utils::{RecorderError, RecorderResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Test-side handle to one scripted acquisition.
#[derive(Clone)]
pub struct StubHandle {
    chunk_tx: mpsc::UnboundedSender<Vec<u8>>,
    shutdown: Arc<AtomicBool>,
    audio_enabled: Arc<AtomicBool>,
    video_enabled: Option<Arc<AtomicBool>>,
}

impl StubHandle {
    /// Feed one chunk into the stream, as a live device would.
    pub fn push_chunk(&self, data: impl Into<Vec<u8>>) {
        let _ = self.chunk_tx.send(data.into());
    }

    /// Whether the stream built from this acquisition was released.
    pub fn released(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Live enabled state of the audio track.
    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled.load(Ordering::SeqCst)
    }

    /// Live enabled state of the video track, if the stream has one.
    pub fn video_enabled(&self) -> Option<bool> {
        self.video_enabled.as_ref().map(|f| f.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
pub struct StubBackend {
    fail_next: Mutex<Option<RecorderError>>,
    handles: Mutex<Vec<StubHandle>>,
}

impl StubBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Script the next acquire to fail with this error.
    pub fn fail_next(&self, error: RecorderError) {
        *self.fail_next.lock() = Some(error);
    }

    /// Handle for the most recent acquisition.
    pub fn last_handle(&self) -> Option<StubHandle> {
        self.handles.lock().last().cloned()
    }

    pub fn acquire_count(&self) -> usize {
        self.handles.lock().len()
    }
}

#[async_trait]
impl CaptureBackend for StubBackend {
    async fn acquire(&self, constraints: MediaConstraints) -> RecorderResult<MediaStream> {
        if let Some(error) = self.fail_next.lock().take() {
            return Err(error);
        }

        let microphone = MediaTrack::new(TrackKind::Audio, "stub microphone");
        let audio_enabled = microphone.enabled_flag();
        let mut tracks = vec![microphone];

        let mut video_enabled = None;
        if constraints.video {
            let camera = MediaTrack::new(TrackKind::Video, "stub camera");
            video_enabled = Some(camera.enabled_flag());
            tracks.push(camera);
        }

        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        self.handles.lock().push(StubHandle {
            chunk_tx,
            shutdown: shutdown.clone(),
            audio_enabled,
            video_enabled,
        });

        Ok(MediaStream::new(tracks, chunk_rx, shutdown))
    }

    fn probe_support(&self) -> MediaSupport {
        MediaSupport {
            has_capture: true,
            has_recorder: true,
        }
    }

    fn mime_type(&self, mode: RecordingMode) -> String {
        match mode {
            RecordingMode::Audio => "audio/webm".to_string(),
            RecordingMode::Video => "video/webm".to_string(),
        }
    }

    fn audio_devices(&self) -> Vec<AudioDeviceInfo> {
        vec![AudioDeviceInfo {
            id: "stub-mic".to_string(),
            name: "Stub Microphone".to_string(),
            is_default: true,
        }]
    }

    fn cameras(&self) -> Vec<CameraInfo> {
        vec![CameraInfo {
            id: "0".to_string(),
            name: "Stub Camera".to_string(),
        }]
    }
}
