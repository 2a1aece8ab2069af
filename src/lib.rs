//! Open RecStudio - Audio and video recording sessions, made simple.
//!
//! The library behind a local recorder UI: acquire microphone/camera
//! streams, drive a chunked recording pipeline with pause/resume, track
//! elapsed time, and persist finished recordings as replayable media.
//!
//! A host UI issues commands to a [`SessionController`] and renders its
//! [`SessionSnapshot`] plus the [`RecordingStore`] list; everything else
//! is internal plumbing.
//!
//! # Limitations
//!
//! Video-mode payloads carry camera frames only. The microphone track is
//! live and toggleable during a video session, but muxing its samples
//! into the video payload would require a container/transcoding step
//! this crate does not perform, so video recordings are silent.

pub mod capture;
pub mod recorder;
pub mod store;
pub mod utils;

pub use capture::{DeviceStreamManager, HostBackend, MediaStream, RecordingMode};
pub use recorder::{SessionController, SessionEvent, SessionSnapshot, SessionStatus};
pub use store::{Recording, RecordingStore};
pub use utils::{ErrorReport, RecorderError, RecorderResult};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for a host binary.
///
/// Honors `RUST_LOG`; defaults to debug output for this crate.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "open_recstudio=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Open RecStudio core v{}", env!("CARGO_PKG_VERSION"));
}
