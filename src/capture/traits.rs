//! Capture trait definitions
//!
//! Backend-agnostic seam between the session core and whatever actually
//! talks to the hardware. The host backend lives in [`crate::capture::devices`];
//! tests script their own backend against the same trait.

use crate::capture::constraints::{MediaConstraints, RecordingMode};
use crate::capture::stream::MediaStream;
use crate::utils::RecorderResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Kind of a track inside a media stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

/// What the runtime can do, as reported by a backend probe.
///
/// Probing never fails; a missing capability is reported, not thrown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSupport {
    /// At least one capture device can be opened
    pub has_capture: bool,
    /// The chunked recording pipeline can run
    pub has_recorder: bool,
}

impl MediaSupport {
    pub fn supported(&self) -> bool {
        self.has_capture && self.has_recorder
    }
}

/// Information about an audio input device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioDeviceInfo {
    /// Unique device ID
    pub id: String,

    /// Device name
    pub name: String,

    /// Whether this is the default input device
    pub is_default: bool,
}

/// Information about a camera/webcam
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraInfo {
    /// Unique device ID
    pub id: String,

    /// Device name
    pub name: String,
}

/// A source of device streams.
///
/// `acquire` opens live hardware channels and hands back an owned
/// [`MediaStream`]; everything the stream produces afterwards flows through
/// its chunk receiver until the stream is released.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Open devices satisfying the constraints.
    ///
    /// Errors with `PermissionDenied` when access is refused,
    /// `NotSupported` when the platform lacks the capability, and
    /// `Unknown` otherwise. On error no device channel stays open.
    async fn acquire(&self, constraints: MediaConstraints) -> RecorderResult<MediaStream>;

    /// Report runtime capture/record capability without failing.
    fn probe_support(&self) -> MediaSupport;

    /// Mime type this backend produces for a mode.
    fn mime_type(&self, mode: RecordingMode) -> String;

    /// Enumerate audio input devices.
    fn audio_devices(&self) -> Vec<AudioDeviceInfo>;

    /// Enumerate cameras.
    fn cameras(&self) -> Vec<CameraInfo>;
}
