//! Recording session core
//!
//! The state machine controller and the pieces it orchestrates:
//! - RecordingEngine: chunked capture pipeline
//! - SessionTimer: pausable elapsed-time tracking
//! - SessionController: status transitions and recording commits

pub mod controller;
pub mod engine;
pub mod state;
pub mod timer;

pub use controller::{SessionController, SessionEvent};
pub use engine::{EngineEvent, MediaBlob, RecordingEngine};
pub use state::{SessionSnapshot, SessionStatus};
pub use timer::{format_elapsed, SessionTimer};
