//! Shared utilities

pub mod error;

pub use error::{ErrorReport, RecorderError, RecorderResult};
