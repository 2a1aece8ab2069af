//! Chunked recording engine
//!
//! Drives the capture pipeline of one stream: retains binary chunks in
//! arrival order, suspends retention while paused, and assembles the final
//! media object on stop. Completion fires exactly once per session, which
//! the consuming `stop` enforces structurally.

use crate::capture::stream::MediaStream;
use crate::utils::{RecorderError, RecorderResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

/// Assembled media object: all retained chunks in original order, tagged
/// with the recording's mime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl MediaBlob {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Advisory events emitted while recording
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A chunk of this many bytes was retained
    Chunk(usize),
    /// Capture finalized; emitted exactly once
    Complete,
}

/// Chunk pipeline for one recording session.
pub struct RecordingEngine {
    mime_type: String,
    chunks: Arc<Mutex<Vec<Vec<u8>>>>,
    paused: Arc<AtomicBool>,
    event_tx: broadcast::Sender<EngineEvent>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<mpsc::UnboundedReceiver<Vec<u8>>>>,
}

impl RecordingEngine {
    /// Begin capture on a stream.
    ///
    /// Takes exclusive ownership of the stream's chunk channel; a second
    /// engine on the same stream, or an engine on a released stream, is
    /// refused with `RecorderUnavailable`.
    pub fn start(stream: &MediaStream, mime_type: impl Into<String>) -> RecorderResult<Self> {
        if stream.is_released() {
            return Err(RecorderError::RecorderUnavailable(
                "Cannot record a released stream".to_string(),
            ));
        }

        let mut chunk_rx = stream.take_chunks().ok_or_else(|| {
            RecorderError::RecorderUnavailable(
                "Stream is already driven by another recorder".to_string(),
            )
        })?;

        let mime_type = mime_type.into();
        let chunks = Arc::new(Mutex::new(Vec::new()));
        let paused = Arc::new(AtomicBool::new(false));
        let (event_tx, _) = broadcast::channel(64);

        let task_chunks = chunks.clone();
        let task_paused = paused.clone();
        let task_events = event_tx.clone();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        // The task hands the receiver back on exit so stop can drain
        // chunks that were delivered but not yet polled.
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    maybe_chunk = chunk_rx.recv() => {
                        let Some(chunk) = maybe_chunk else { break };
                        // Chunks arriving while paused are not captured
                        // media; they are dropped, prior chunks stay.
                        if task_paused.load(Ordering::SeqCst) {
                            continue;
                        }
                        let size = chunk.len();
                        task_chunks.lock().push(chunk);
                        tracing::debug!(size, "Recording chunk received");
                        let _ = task_events.send(EngineEvent::Chunk(size));
                    }
                }
            }
            chunk_rx
        });

        tracing::info!(mime_type = %mime_type, "Recording engine started");

        Ok(Self {
            mime_type,
            chunks,
            paused,
            event_tx,
            stop_tx: Some(stop_tx),
            task: Some(task),
        })
    }

    /// Subscribe to advisory chunk/completion events.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Suspend chunk retention. No-op unless currently active.
    pub fn pause(&self) {
        if !self.paused.swap(true, Ordering::SeqCst) {
            tracing::info!("Recording engine paused");
        }
    }

    /// Continue chunk retention. No-op unless currently paused.
    pub fn resume(&self) {
        if self.paused.swap(false, Ordering::SeqCst) {
            tracing::info!("Recording engine resumed");
        }
    }

    /// Finalize capture: wind down the chunk task, drain chunks already
    /// delivered but not yet polled, and assemble everything retained
    /// so far, in original order.
    ///
    /// Consumes the engine, so completion happens exactly once. Zero
    /// retained chunks yield an empty but well-formed blob. Must run
    /// before the owning stream is released.
    pub async fn stop(mut self) -> MediaBlob {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Ok(mut chunk_rx) = task.await {
                // The channel may still hold chunks the task never got
                // to poll; they follow the same paused-drop rule.
                while let Ok(chunk) = chunk_rx.try_recv() {
                    if self.paused.load(Ordering::SeqCst) {
                        continue;
                    }
                    let size = chunk.len();
                    self.chunks.lock().push(chunk);
                    tracing::debug!(size, "Recording chunk drained at stop");
                    let _ = self.event_tx.send(EngineEvent::Chunk(size));
                }
            }
        }

        let parts = std::mem::take(&mut *self.chunks.lock());
        let chunk_count = parts.len();
        let data: Vec<u8> = parts.into_iter().flatten().collect();

        tracing::info!(
            chunk_count,
            total_bytes = data.len(),
            mime_type = %self.mime_type,
            "Recording finalized"
        );
        let _ = self.event_tx.send(EngineEvent::Complete);

        MediaBlob {
            data,
            mime_type: self.mime_type.clone(),
        }
    }
}

impl Drop for RecordingEngine {
    fn drop(&mut self) {
        // Teardown without finalization discards pending chunks.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
