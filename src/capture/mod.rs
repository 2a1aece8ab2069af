//! Device capture layer
//!
//! Constraint resolution, the backend trait seam, owned stream handles,
//! and the host backend over cpal/nokhwa.

pub mod constraints;
pub mod devices;
pub mod manager;
pub mod stream;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use constraints::{extension_for_mime, MediaConstraints, RecordingMode};
pub use devices::HostBackend;
pub use manager::DeviceStreamManager;
pub use stream::{MediaStream, MediaTrack};
pub use traits::{AudioDeviceInfo, CameraInfo, CaptureBackend, MediaSupport, TrackKind};
