//! Camera device abstraction.
//!
//! A [`CameraBackend`] hands out [`VideoStream`]s by device id. A stream owns
//! its tracks until [`VideoStream::stop`] is called; the capture flow wraps
//! every stream in a [`StreamGuard`] so that happens on every exit path.

use crate::CaptureResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

/// A video input device as reported by enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDevice {
    pub device_id: String,
    pub label: String,
}

impl VideoDevice {
    pub fn new(device_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            label: label.into(),
        }
    }
}

/// Point of interest for tap-to-focus, normalized to `0.0..=1.0` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusPoint {
    pub x: f64,
    pub y: f64,
}

impl FocusPoint {
    /// Normalize a tap at pixel `(x, y)` on a preview of the given size.
    pub fn from_tap(x: f64, y: f64, width: f64, height: f64) -> Self {
        let norm = |v: f64, extent: f64| {
            if extent > 0.0 {
                (v / extent).clamp(0.0, 1.0)
            } else {
                0.5
            }
        };
        Self {
            x: norm(x, width),
            y: norm(y, height),
        }
    }
}

/// A downsampled RGBA frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, four bytes per pixel.
    pub rgba: Vec<u8>,
}

impl Frame {
    /// A frame where every pixel has the same colour.
    pub fn uniform(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = (width as usize) * (height as usize);
        Self {
            width,
            height,
            rgba: rgba.repeat(pixels),
        }
    }
}

#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// Ask for camera access. Called once per capture flow.
    async fn request_permission(&self) -> CaptureResult<()>;

    async fn enumerate_devices(&self) -> CaptureResult<Vec<VideoDevice>>;

    async fn open_stream(&self, device_id: &str) -> CaptureResult<Box<dyn VideoStream>>;

    fn backend_name(&self) -> &'static str;
}

pub trait VideoStream: Send {
    fn device_id(&self) -> &str;

    /// Whether the video track exposes a focus mode capability.
    fn supports_focus(&self) -> bool;

    fn focus_at(&mut self, point: FocusPoint) -> CaptureResult<()>;

    /// Scale the current frame down to `width` x `height`. `None` while the
    /// preview is paused or has ended.
    fn grab_frame(&mut self, width: u32, height: u32) -> Option<Frame>;

    fn start_recording(&mut self) -> CaptureResult<()>;

    fn stop_recording(&mut self) -> CaptureResult<()>;

    fn is_recording(&self) -> bool;

    /// Stop every track of the stream. Must be idempotent.
    fn stop(&mut self);
}

/// Owns a stream and stops it (and any running recorder) when dropped.
pub struct StreamGuard {
    stream: Box<dyn VideoStream>,
}

impl StreamGuard {
    pub fn new(stream: Box<dyn VideoStream>) -> Self {
        Self { stream }
    }
}

impl Deref for StreamGuard {
    type Target = dyn VideoStream;

    fn deref(&self) -> &Self::Target {
        self.stream.as_ref()
    }
}

impl DerefMut for StreamGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stream.as_mut()
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if self.stream.is_recording() {
            if let Err(e) = self.stream.stop_recording() {
                warn!("Failed to stop recorder during teardown: {}", e);
            }
        }
        debug!("Stopping tracks for device {}", self.stream.device_id());
        self.stream.stop();
    }
}
