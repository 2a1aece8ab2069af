//! Host device backend
//!
//! Real capture on local hardware: microphone input through cpal and
//! camera frames through nokhwa. Each open device runs on its own thread
//! (cpal streams are not `Send`) and exits when the owning stream's
//! shutdown flag flips.
//!
//! Audio-mode streams emit streaming-WAV chunks (a fixed unknown-length
//! header followed by PCM16 callback buffers). Video-mode streams emit
//! MJPEG frames as negotiated with the camera; muxing microphone audio
//! into the payload would require transcoding, which this crate does
//! not do.

use crate::capture::constraints::{MediaConstraints, RecordingMode};
use crate::capture::stream::{MediaStream, MediaTrack};
use crate::capture::traits::{AudioDeviceInfo, CameraInfo, CaptureBackend, MediaSupport, TrackKind};
use crate::utils::{RecorderError, RecorderResult};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Get list of available audio input devices (microphones)
pub fn get_audio_input_devices() -> Vec<AudioDeviceInfo> {
    let host = cpal::default_host();
    let default_name = host
        .default_input_device()
        .and_then(|d| d.name().ok());

    match host.input_devices() {
        Ok(devices) => devices
            .filter_map(|device| {
                let name = device.name().ok()?;
                Some(AudioDeviceInfo {
                    id: name.clone(),
                    is_default: Some(&name) == default_name.as_ref(),
                    name,
                })
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate audio devices: {:?}", e);
            Vec::new()
        }
    }
}

/// Get list of available cameras
pub fn get_cameras() -> Vec<CameraInfo> {
    match nokhwa::query(ApiBackend::Auto) {
        Ok(cameras) => cameras
            .into_iter()
            .map(|info| {
                let id = match info.index() {
                    CameraIndex::Index(i) => i.to_string(),
                    CameraIndex::String(s) => s.to_string(),
                };
                CameraInfo {
                    id,
                    name: info.human_name().to_string(),
                }
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate cameras: {:?}", e);
            Vec::new()
        }
    }
}

/// Classify a device-open failure the way the original error surface does:
/// by what the platform said, falling back to the catch-all.
fn classify_device_error(message: String) -> RecorderError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("authorized") {
        RecorderError::PermissionDenied(message)
    } else if lower.contains("not supported") || lower.contains("unsupported") {
        RecorderError::NotSupported(message)
    } else {
        RecorderError::Unknown(message)
    }
}

/// 44-byte WAV header with unknown (0xFFFFFFFF) chunk sizes, the streaming
/// convention players accept when the total length is not known up front.
fn wav_stream_header(sample_rate: u32, channels: u16) -> Vec<u8> {
    const UNKNOWN: u32 = u32::MAX;
    let block_align = channels * 2; // PCM16
    let byte_rate = sample_rate * block_align as u32;

    let mut header = Vec::with_capacity(44);
    header.extend_from_slice(b"RIFF");
    header.extend_from_slice(&UNKNOWN.to_le_bytes());
    header.extend_from_slice(b"WAVE");
    header.extend_from_slice(b"fmt ");
    header.extend_from_slice(&16u32.to_le_bytes());
    header.extend_from_slice(&1u16.to_le_bytes()); // PCM
    header.extend_from_slice(&channels.to_le_bytes());
    header.extend_from_slice(&sample_rate.to_le_bytes());
    header.extend_from_slice(&byte_rate.to_le_bytes());
    header.extend_from_slice(&block_align.to_le_bytes());
    header.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    header.extend_from_slice(b"data");
    header.extend_from_slice(&UNKNOWN.to_le_bytes());
    header
}

/// Open the default microphone and stream PCM16 chunks until shutdown.
///
/// The cpal stream is not `Send`, so it lives entirely on this thread.
/// Readiness (or the open failure) is reported once through `ready_tx`.
fn spawn_microphone_thread(
    chunk_tx: mpsc::UnboundedSender<Vec<u8>>,
    enabled: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    emit_chunks: bool,
    ready_tx: oneshot::Sender<RecorderResult<()>>,
) {
    std::thread::spawn(move || {
        let host = cpal::default_host();

        let device = match host.default_input_device() {
            Some(d) => d,
            None => {
                let _ = ready_tx.send(Err(RecorderError::NotSupported(
                    "No audio input device found".to_string(),
                )));
                return;
            }
        };

        let config = match device.default_input_config() {
            Ok(c) => c,
            Err(e) => {
                let _ = ready_tx.send(Err(classify_device_error(format!(
                    "Failed to get input config: {e}"
                ))));
                return;
            }
        };

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();
        let stream_config: cpal::StreamConfig = config.into();

        if emit_chunks {
            let _ = chunk_tx.send(wav_stream_header(sample_rate, channels));
        }

        let callback_tx = chunk_tx.clone();
        let callback_enabled = enabled.clone();
        let callback_shutdown = shutdown.clone();
        let emit = emit_chunks;

        let stream = device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if callback_shutdown.load(Ordering::Relaxed) || !emit {
                    return;
                }
                // A muted track keeps capturing but contributes silence,
                // so toggling never stops the pipeline.
                let muted = !callback_enabled.load(Ordering::Relaxed);
                let bytes: Vec<u8> = data
                    .iter()
                    .flat_map(|&sample| {
                        let s = if muted { 0.0 } else { sample.clamp(-1.0, 1.0) };
                        ((s * i16::MAX as f32) as i16).to_le_bytes()
                    })
                    .collect();
                let _ = callback_tx.send(bytes);
            },
            |err| tracing::error!("Microphone stream error: {}", err),
            None,
        );

        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                let _ = ready_tx.send(Err(classify_device_error(format!(
                    "Failed to build input stream: {e}"
                ))));
                return;
            }
        };

        if let Err(e) = stream.play() {
            let _ = ready_tx.send(Err(classify_device_error(format!(
                "Failed to start input stream: {e}"
            ))));
            return;
        }

        tracing::info!(sample_rate, channels, "Microphone capture started");
        let _ = ready_tx.send(Ok(()));

        while !shutdown.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(50));
        }

        drop(stream);
        tracing::info!("Microphone capture thread stopped");
    });
}

/// Camera format request matching the mime type video payloads are
/// tagged with. Frames go into the payload unmodified, so the camera
/// must deliver MJPEG or the recording would be mislabeled.
fn mjpeg_camera_request() -> RequestedFormat<'static> {
    RequestedFormat::new::<RgbAFormat>(RequestedFormatType::Closest(CameraFormat::new(
        Resolution::new(1280, 720),
        FrameFormat::MJPEG,
        30,
    )))
}

/// Open the default camera and stream MJPEG frames until shutdown.
fn spawn_camera_thread(
    chunk_tx: mpsc::UnboundedSender<Vec<u8>>,
    enabled: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    ready_tx: oneshot::Sender<RecorderResult<()>>,
) {
    std::thread::spawn(move || {
        let mut camera = match Camera::new(CameraIndex::Index(0), mjpeg_camera_request()) {
            Ok(c) => c,
            Err(e) => {
                let _ = ready_tx.send(Err(classify_device_error(format!(
                    "Failed to open camera: {e}"
                ))));
                return;
            }
        };

        if let Err(e) = camera.open_stream() {
            let _ = ready_tx.send(Err(classify_device_error(format!(
                "Failed to open camera stream: {e}"
            ))));
            return;
        }

        let camera_format = camera.camera_format();
        if camera_format.format() != FrameFormat::MJPEG {
            let _ = ready_tx.send(Err(RecorderError::NotSupported(format!(
                "Camera delivers {:?} frames, not MJPEG",
                camera_format.format()
            ))));
            if let Err(e) = camera.stop_stream() {
                tracing::warn!("Error stopping camera stream: {:?}", e);
            }
            return;
        }
        tracing::info!(
            width = camera_format.resolution().width(),
            height = camera_format.resolution().height(),
            fps = camera_format.frame_rate(),
            format = ?camera_format.format(),
            "Camera capture started"
        );
        let _ = ready_tx.send(Ok(()));

        while !shutdown.load(Ordering::SeqCst) {
            // frame() blocks until the camera delivers; the camera paces
            // the loop, no artificial delay needed.
            match camera.frame() {
                Ok(frame) => {
                    if enabled.load(Ordering::Relaxed) {
                        let _ = chunk_tx.send(frame.buffer().to_vec());
                    }
                }
                Err(e) => {
                    tracing::debug!("Failed to capture frame: {:?}", e);
                }
            }
        }

        if let Err(e) = camera.stop_stream() {
            tracing::warn!("Error stopping camera stream: {:?}", e);
        }
        tracing::info!("Camera capture thread stopped");
    });
}

/// Capture backend for local hardware.
pub struct HostBackend;

impl HostBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HostBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureBackend for HostBackend {
    async fn acquire(&self, constraints: MediaConstraints) -> RecorderResult<MediaStream> {
        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut tracks = Vec::new();

        // Microphone is always part of the request. In video mode its
        // samples are not written into the chunk payload (the payload is
        // the camera's frame stream); the track still exists and toggles.
        let mic = MediaTrack::new(TrackKind::Audio, "Default microphone");
        let (mic_ready_tx, mic_ready_rx) = oneshot::channel();
        spawn_microphone_thread(
            chunk_tx.clone(),
            mic.enabled_flag(),
            shutdown.clone(),
            !constraints.video,
            mic_ready_tx,
        );

        match mic_ready_rx.await {
            Ok(Ok(())) => tracks.push(mic),
            Ok(Err(e)) => {
                shutdown.store(true, Ordering::SeqCst);
                return Err(e);
            }
            Err(_) => {
                shutdown.store(true, Ordering::SeqCst);
                return Err(RecorderError::Unknown(
                    "Microphone capture thread exited before reporting readiness".to_string(),
                ));
            }
        }

        if constraints.video {
            let camera = MediaTrack::new(TrackKind::Video, "Default camera");
            let (cam_ready_tx, cam_ready_rx) = oneshot::channel();
            spawn_camera_thread(
                chunk_tx,
                camera.enabled_flag(),
                shutdown.clone(),
                cam_ready_tx,
            );

            match cam_ready_rx.await {
                Ok(Ok(())) => tracks.push(camera),
                Ok(Err(e)) => {
                    // Partial acquisition: the microphone is already live
                    // and must not leak past a failed camera open.
                    shutdown.store(true, Ordering::SeqCst);
                    return Err(e);
                }
                Err(_) => {
                    shutdown.store(true, Ordering::SeqCst);
                    return Err(RecorderError::Unknown(
                        "Camera capture thread exited before reporting readiness".to_string(),
                    ));
                }
            }
        }

        Ok(MediaStream::new(tracks, chunk_rx, shutdown))
    }

    fn probe_support(&self) -> MediaSupport {
        MediaSupport {
            has_capture: cpal::default_host().default_input_device().is_some(),
            // The chunk pipeline runs in-process; if we can capture, we
            // can record.
            has_recorder: true,
        }
    }

    fn mime_type(&self, mode: RecordingMode) -> String {
        match mode {
            RecordingMode::Audio => "audio/wav".to_string(),
            RecordingMode::Video => "video/x-motion-jpeg".to_string(),
        }
    }

    fn audio_devices(&self) -> Vec<AudioDeviceInfo> {
        get_audio_input_devices()
    }

    fn cameras(&self) -> Vec<CameraInfo> {
        get_cameras()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_stream_header_layout() {
        let header = wav_stream_header(48_000, 2);
        assert_eq!(header.len(), 44);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[36..40], b"data");
        // Unknown-length convention for both chunk sizes.
        assert_eq!(&header[4..8], &u32::MAX.to_le_bytes());
        assert_eq!(&header[40..44], &u32::MAX.to_le_bytes());
    }

    #[test]
    fn test_camera_request_negotiates_mjpeg() {
        let yuyv = CameraFormat::new(Resolution::new(1920, 1080), FrameFormat::YUYV, 30);
        let mjpeg = CameraFormat::new(Resolution::new(640, 480), FrameFormat::MJPEG, 30);

        let chosen = mjpeg_camera_request().fulfill(&[yuyv, mjpeg]);
        assert_eq!(chosen.map(|f| f.format()), Some(FrameFormat::MJPEG));
    }

    #[test]
    fn test_classify_device_error() {
        assert!(matches!(
            classify_device_error("Access denied by user".to_string()),
            RecorderError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_device_error("Sample format not supported".to_string()),
            RecorderError::NotSupported(_)
        ));
        assert!(matches!(
            classify_device_error("something else".to_string()),
            RecorderError::Unknown(_)
        ));
    }
}
