//! Guided camera capture for talent-scout
//!
//! This crate drives the camera side of a test: it discovers devices, keeps a
//! preview stream open, decides when the scene is ready, counts down and
//! records for a fixed duration.

pub mod brightness;
pub mod config;
pub mod device;
pub mod flow;
pub mod readiness;
pub mod simulated;

use thiserror::Error;

pub use config::CaptureConfig;
pub use device::{CameraBackend, FocusPoint, Frame, StreamGuard, VideoDevice, VideoStream};
pub use flow::{CaptureControl, CaptureEvent, CaptureFlow, RecordingOutcome};
pub use readiness::{ChecklistItem, DistanceWarning, ReadinessConditions};
pub use simulated::{CameraLog, PermissionBehavior, SimulatedCamera, SimulatedDevice};

/// Errors related to camera capture
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Camera permission denied")]
    PermissionDenied,
    #[error("No video input devices found")]
    NoCameraFound,
    #[error("Camera access failed: {0}")]
    DeviceAccess(String),
    #[error("Failed to open stream for device {device_id}: {reason}")]
    StreamSetup { device_id: String, reason: String },
    #[error("Recorder error: {0}")]
    Recorder(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Capture cancelled")]
    Cancelled,
}

impl CaptureError {
    /// Text shown to the user in place of the camera preview.
    pub fn user_message(&self) -> &'static str {
        match self {
            CaptureError::PermissionDenied => {
                "Camera access was denied. Please enable it in your device settings."
            }
            CaptureError::NoCameraFound => "No video cameras found.",
            CaptureError::DeviceAccess(_) => "Could not access the camera.",
            CaptureError::StreamSetup { .. } | CaptureError::Recorder(_) => {
                "Failed to start camera. Please try again."
            }
            CaptureError::InvalidConfig(_) => "Camera settings are invalid.",
            CaptureError::Cancelled => "Recording was cancelled.",
        }
    }
}

pub type CaptureResult<T> = Result<T, CaptureError>;
