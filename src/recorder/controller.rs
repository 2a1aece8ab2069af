//! Recording session controller
//!
//! Owns the session state machine (idle → recording → paused ⇄ recording →
//! stopped) and orchestrates device acquisition, the chunk engine, the
//! timer, and persistence of committed recordings.
//!
//! One controller drives at most one session. Commands take `&mut self`,
//! so two `start` calls can never be in flight for the same controller and
//! the single-active-stream invariant holds structurally: the stream
//! handle is present exactly while the status is Recording or Paused.
//! Commands that are invalid for the current state are logged no-ops.

use crate::capture::constraints::RecordingMode;
use crate::capture::manager::DeviceStreamManager;
use crate::capture::stream::MediaStream;
use crate::capture::traits::{CaptureBackend, MediaSupport, TrackKind};
use crate::recorder::engine::RecordingEngine;
use crate::recorder::state::{SessionSnapshot, SessionStatus};
use crate::recorder::timer::SessionTimer;
use crate::store::schema::{next_recording_id, Recording};
use crate::store::RecordingStore;
use crate::utils::{ErrorReport, RecorderError, RecorderResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicI64;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Events emitted as the session moves through its state machine
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Recording started
    Started,
    /// Recording paused
    Paused,
    /// Recording resumed
    Resumed,
    /// Recording committed with this id
    Stopped(i64),
    /// Error occurred; session is back at Idle
    Error(ErrorReport),
}

pub struct SessionController {
    devices: DeviceStreamManager,
    store: Arc<RecordingStore>,

    status: SessionStatus,
    mode: RecordingMode,
    /// Toggle preferences; applied to the live stream while one exists,
    /// otherwise remembered for the next start.
    mic_enabled: bool,
    camera_enabled: bool,
    error: Option<ErrorReport>,

    stream: Option<MediaStream>,
    engine: Option<RecordingEngine>,
    timer: SessionTimer,

    last_id: AtomicI64,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(backend: Arc<dyn CaptureBackend>, store: Arc<RecordingStore>) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            devices: DeviceStreamManager::new(backend),
            store,
            status: SessionStatus::default(),
            mode: RecordingMode::default(),
            mic_enabled: true,
            camera_enabled: true,
            error: None,
            stream: None,
            engine: None,
            timer: SessionTimer::new(),
            last_id: AtomicI64::new(0),
            event_tx,
        }
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Advisory elapsed-second ticks for display.
    pub fn ticks(&self) -> watch::Receiver<u64> {
        self.timer.subscribe()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn mode(&self) -> RecordingMode {
        self.mode
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.timer.elapsed_seconds()
    }

    pub fn error(&self) -> Option<&ErrorReport> {
        self.error.as_ref()
    }

    pub fn has_active_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Whether the runtime offers the required capture and recording
    /// primitives.
    pub fn probe_support(&self) -> MediaSupport {
        self.devices.probe_support()
    }

    /// Read-only view for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            mode: self.mode,
            elapsed_seconds: self.timer.elapsed_seconds(),
            mic_enabled: self.mic_enabled,
            camera_enabled: self.camera_enabled,
            error: self.error.clone(),
        }
    }

    /// Select what the next session captures. No-op while a session is
    /// active; the mode of a running recording never changes.
    pub fn set_mode(&mut self, mode: RecordingMode) {
        if self.status.is_active() {
            tracing::warn!(?mode, "Ignoring mode change during an active session");
            return;
        }
        self.mode = mode;
        self.error = None;
    }

    /// Start a recording session: acquire devices, start the chunk engine
    /// and the timer.
    ///
    /// Valid from Idle/Stopped, a no-op otherwise. A device or engine
    /// failure aborts the transition, releases anything partially
    /// acquired, and leaves the session at Idle with the error attached.
    pub async fn start(&mut self) -> RecorderResult<()> {
        if self.status.is_active() {
            tracing::warn!(status = ?self.status, "Ignoring start during an active session");
            return Ok(());
        }

        tracing::info!(mode = ?self.mode, "Starting recording");
        self.error = None;

        let stream = match self.devices.acquire(self.mode).await {
            Ok(stream) => stream,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };

        // Apply toggle preferences captured while idle.
        stream.set_track_enabled(TrackKind::Audio, self.mic_enabled);
        if self.mode == RecordingMode::Video {
            stream.set_track_enabled(TrackKind::Video, self.camera_enabled);
        }

        let mime_type = self.devices.mime_type(self.mode);
        let engine = match RecordingEngine::start(&stream, mime_type) {
            Ok(engine) => engine,
            Err(e) => {
                self.devices.release(&stream);
                self.fail(&e);
                return Err(e);
            }
        };

        self.stream = Some(stream);
        self.engine = Some(engine);
        self.timer.start();
        self.status = SessionStatus::Recording;
        let _ = self.event_tx.send(SessionEvent::Started);

        tracing::info!("Recording started");
        Ok(())
    }

    /// Pause the session. Valid from Recording, a no-op otherwise.
    pub fn pause(&mut self) {
        if self.status != SessionStatus::Recording {
            tracing::debug!(status = ?self.status, "Ignoring pause");
            return;
        }

        if let Some(engine) = &self.engine {
            engine.pause();
        }
        self.timer.pause();
        self.status = SessionStatus::Paused;
        let _ = self.event_tx.send(SessionEvent::Paused);
        tracing::info!("Recording paused");
    }

    /// Resume the session. Valid from Paused, a no-op otherwise.
    pub fn resume(&mut self) {
        if self.status != SessionStatus::Paused {
            tracing::debug!(status = ?self.status, "Ignoring resume");
            return;
        }

        if let Some(engine) = &self.engine {
            engine.resume();
        }
        self.timer.resume();
        self.status = SessionStatus::Recording;
        let _ = self.event_tx.send(SessionEvent::Resumed);
        tracing::info!("Recording resumed");
    }

    /// Stop the session: finalize the chunk pipeline, commit the recording
    /// to the store, release the stream, and return to Idle.
    ///
    /// Valid from Recording/Paused; otherwise a no-op returning `None`.
    /// Produces exactly one Recording whose duration is the elapsed count
    /// at the moment this was called, even if 0.
    pub async fn stop(&mut self) -> RecorderResult<Option<Recording>> {
        if !self.status.is_active() {
            tracing::debug!(status = ?self.status, "Ignoring stop");
            return Ok(None);
        }

        tracing::info!("Stopping recording");
        let duration_seconds = self.timer.elapsed_seconds();

        let Some(engine) = self.engine.take() else {
            // Unreachable while the handle/status invariant holds; recover
            // to Idle rather than wedge the session.
            self.fail(&RecorderError::Unknown(
                "Active session has no recording engine".to_string(),
            ));
            return Ok(None);
        };

        // Finalize before the stream is released.
        let blob = engine.stop().await;

        let id = next_recording_id(&self.last_id);
        let recording = Recording::from_blob(id, self.mode, &blob, duration_seconds);
        let committed = self.store.append(recording.clone());

        if let Some(stream) = self.stream.take() {
            self.devices.release(&stream);
        }
        self.timer.reset();

        if let Err(e) = committed {
            self.fail(&e);
            return Err(e);
        }

        self.status = SessionStatus::Stopped;
        let _ = self.event_tx.send(SessionEvent::Stopped(id));
        // Stopped is transient; the session is immediately ready again.
        self.status = SessionStatus::Idle;

        tracing::info!(id, duration_seconds, "Recording committed");
        Ok(Some(recording))
    }

    /// Toggle the microphone. Always updates the preference; while a
    /// stream is live the track is muted/unmuted in place.
    pub fn toggle_mic(&mut self) -> bool {
        self.mic_enabled = !self.mic_enabled;
        if let Some(stream) = &self.stream {
            self.devices
                .set_track_enabled(stream, TrackKind::Audio, self.mic_enabled);
        }
        tracing::info!(enabled = self.mic_enabled, "Microphone toggled");
        self.mic_enabled
    }

    /// Toggle the camera. Always updates the preference; only meaningful
    /// for video-mode streams, where the live track is toggled in place
    /// without stopping the engine.
    pub fn toggle_camera(&mut self) -> bool {
        self.camera_enabled = !self.camera_enabled;
        if let Some(stream) = &self.stream {
            self.devices
                .set_track_enabled(stream, TrackKind::Video, self.camera_enabled);
        }
        tracing::info!(enabled = self.camera_enabled, "Camera toggled");
        self.camera_enabled
    }

    /// Clear a surfaced error without altering session state.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Committed recordings in insertion order.
    pub fn recordings(&self) -> Vec<Recording> {
        self.store.list()
    }

    /// Delete a committed recording. Idempotent.
    pub fn delete_recording(&self, id: i64) -> RecorderResult<bool> {
        self.store.delete(id)
    }

    /// Materialize a committed recording as a downloadable file.
    pub fn export_recording(&self, id: i64, dir: &Path) -> RecorderResult<PathBuf> {
        self.store.export(id, dir)
    }

    /// Tear the session down: detach the chunk and timer tasks and release
    /// any live stream. Nothing is committed.
    pub fn close(&mut self) {
        // Dropping the engine aborts its chunk task.
        self.engine = None;
        if let Some(stream) = self.stream.take() {
            self.devices.release(&stream);
        }
        self.timer.reset();
        self.status = SessionStatus::Idle;
        tracing::info!("Session controller closed");
    }

    /// Device failure path: release partial resources and return to Idle
    /// with the error attached. Errors are surfaced, never retried.
    fn fail(&mut self, error: &RecorderError) {
        tracing::error!("Session error: {error}");

        self.engine = None;
        if let Some(stream) = self.stream.take() {
            self.devices.release(&stream);
        }
        self.timer.reset();
        self.status = SessionStatus::Idle;

        let report = ErrorReport::from(error);
        self.error = Some(report.clone());
        let _ = self.event_tx.send(SessionEvent::Error(report));
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.close();
    }
}
