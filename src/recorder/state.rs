//! Session state definitions
//!
//! The recording session state machine's states and the read-only view a
//! host UI renders from.

use crate::capture::constraints::RecordingMode;
use crate::utils::ErrorReport;
use serde::{Deserialize, Serialize};

/// Current state of a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// No recording in progress
    Idle,
    /// Currently recording
    Recording,
    /// Recording is paused
    Paused,
    /// Recording just completed; transient, resets to Idle
    Stopped,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl SessionStatus {
    /// Whether a stream handle is live in this state.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Recording | Self::Paused)
    }
}

/// Read-only session view for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub mode: RecordingMode,
    pub elapsed_seconds: u64,
    pub mic_enabled: bool,
    pub camera_enabled: bool,
    pub error: Option<ErrorReport>,
}
