//! Media constraint resolution
//!
//! Maps a recording mode to the device request a backend should satisfy.

use serde::{Deserialize, Serialize};

/// What a recording session captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingMode {
    /// Microphone only
    Audio,
    /// Microphone and camera
    Video,
}

impl Default for RecordingMode {
    fn default() -> Self {
        Self::Audio
    }
}

/// Device request derived from a recording mode.
///
/// A microphone is always requested; a camera only in video mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

impl MediaConstraints {
    /// Resolve constraints for a mode. Pure, no failure mode.
    pub fn for_mode(mode: RecordingMode) -> Self {
        Self {
            audio: true,
            video: mode == RecordingMode::Video,
        }
    }
}

/// Map a mime type to the file extension used for exported recordings.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "audio/webm" | "video/webm" => "webm",
        "audio/wav" | "audio/wave" | "audio/x-wav" => "wav",
        "video/x-motion-jpeg" => "mjpeg",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_mode_requests_microphone_only() {
        let constraints = MediaConstraints::for_mode(RecordingMode::Audio);
        assert!(constraints.audio);
        assert!(!constraints.video);
    }

    #[test]
    fn test_video_mode_requests_both() {
        let constraints = MediaConstraints::for_mode(RecordingMode::Video);
        assert!(constraints.audio);
        assert!(constraints.video);
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for_mime("audio/webm"), "webm");
        assert_eq!(extension_for_mime("audio/wav"), "wav");
        assert_eq!(extension_for_mime("video/x-motion-jpeg"), "mjpeg");
        assert_eq!(extension_for_mime("application/octet-stream"), "bin");
    }
}
