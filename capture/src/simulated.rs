//! In-process camera backend.
//!
//! Produces uniform frames at a configurable brightness and records every
//! stream lifecycle call in a shared [`CameraLog`], so callers can check that
//! streams are released and recorders stopped.

use crate::device::{CameraBackend, FocusPoint, Frame, VideoDevice, VideoStream};
use crate::{CaptureError, CaptureResult};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionBehavior {
    #[default]
    Grant,
    Deny,
    /// The permission prompt itself fails (no media subsystem, etc.).
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedDevice {
    pub device: VideoDevice,
    /// Grey level of every produced pixel.
    pub brightness: u8,
    pub supports_focus: bool,
    pub fail_open: bool,
}

impl SimulatedDevice {
    pub fn new(device_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            device: VideoDevice::new(device_id, label),
            brightness: 128,
            supports_focus: false,
            fail_open: false,
        }
    }

    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn with_focus(mut self) -> Self {
        self.supports_focus = true;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_open = true;
        self
    }
}

/// Everything the simulated backend was asked to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraLog {
    pub permission_requests: usize,
    pub opened: Vec<String>,
    pub stopped: Vec<String>,
    pub focus_points: Vec<FocusPoint>,
    pub recordings_started: usize,
    pub recordings_stopped: usize,
}

impl CameraLog {
    /// Streams opened but not yet stopped.
    pub fn active_streams(&self) -> usize {
        self.opened.len().saturating_sub(self.stopped.len())
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedCamera {
    devices: Vec<SimulatedDevice>,
    permission: PermissionBehavior,
    state: Arc<Mutex<SimulatedState>>,
}

#[derive(Debug, Default)]
struct SimulatedState {
    log: CameraLog,
    /// Brightness overrides set while a flow is running.
    brightness: Vec<(String, u8)>,
}

fn lock(state: &Mutex<SimulatedState>) -> MutexGuard<'_, SimulatedState> {
    // A panic while holding the lock only ever happens in tests; keep going.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SimulatedCamera {
    pub fn new(devices: Vec<SimulatedDevice>) -> Self {
        Self {
            devices,
            permission: PermissionBehavior::Grant,
            state: Arc::new(Mutex::new(SimulatedState::default())),
        }
    }

    /// A front and a back camera with normal lighting.
    pub fn with_default_devices() -> Self {
        Self::new(vec![
            SimulatedDevice::new("front", "Front Camera"),
            SimulatedDevice::new("back", "Back Camera").with_focus(),
        ])
    }

    pub fn with_permission(mut self, permission: PermissionBehavior) -> Self {
        self.permission = permission;
        self
    }

    pub fn log(&self) -> CameraLog {
        lock(&self.state).log.clone()
    }

    /// Change the scene brightness seen by a device, including open streams.
    pub fn set_brightness(&self, device_id: &str, brightness: u8) {
        let mut state = lock(&self.state);
        state.brightness.retain(|(id, _)| id != device_id);
        state.brightness.push((device_id.to_string(), brightness));
    }
}

#[async_trait]
impl CameraBackend for SimulatedCamera {
    async fn request_permission(&self) -> CaptureResult<()> {
        lock(&self.state).log.permission_requests += 1;
        match self.permission {
            PermissionBehavior::Grant => Ok(()),
            PermissionBehavior::Deny => Err(CaptureError::PermissionDenied),
            PermissionBehavior::Fail => Err(CaptureError::DeviceAccess(
                "media devices unavailable".to_string(),
            )),
        }
    }

    async fn enumerate_devices(&self) -> CaptureResult<Vec<VideoDevice>> {
        Ok(self.devices.iter().map(|d| d.device.clone()).collect())
    }

    async fn open_stream(&self, device_id: &str) -> CaptureResult<Box<dyn VideoStream>> {
        let device = self
            .devices
            .iter()
            .find(|d| d.device.device_id == device_id)
            .ok_or_else(|| CaptureError::StreamSetup {
                device_id: device_id.to_string(),
                reason: "unknown device".to_string(),
            })?;

        if device.fail_open {
            return Err(CaptureError::StreamSetup {
                device_id: device_id.to_string(),
                reason: "device busy".to_string(),
            });
        }

        lock(&self.state).log.opened.push(device_id.to_string());
        info!("Opened simulated stream on {}", device.device.label);

        Ok(Box::new(SimulatedStream {
            device: device.clone(),
            state: Arc::clone(&self.state),
            recording: false,
            stopped: false,
        }))
    }

    fn backend_name(&self) -> &'static str {
        "simulated"
    }
}

struct SimulatedStream {
    device: SimulatedDevice,
    state: Arc<Mutex<SimulatedState>>,
    recording: bool,
    stopped: bool,
}

impl SimulatedStream {
    fn brightness(&self) -> u8 {
        lock(&self.state)
            .brightness
            .iter()
            .find(|(id, _)| *id == self.device.device.device_id)
            .map(|(_, b)| *b)
            .unwrap_or(self.device.brightness)
    }
}

impl VideoStream for SimulatedStream {
    fn device_id(&self) -> &str {
        &self.device.device.device_id
    }

    fn supports_focus(&self) -> bool {
        self.device.supports_focus
    }

    fn focus_at(&mut self, point: FocusPoint) -> CaptureResult<()> {
        if !self.device.supports_focus {
            return Err(CaptureError::DeviceAccess(
                "focus mode not supported".to_string(),
            ));
        }
        lock(&self.state).log.focus_points.push(point);
        Ok(())
    }

    fn grab_frame(&mut self, width: u32, height: u32) -> Option<Frame> {
        if self.stopped {
            return None;
        }
        let b = self.brightness();
        Some(Frame::uniform(width, height, [b, b, b, 255]))
    }

    fn start_recording(&mut self) -> CaptureResult<()> {
        if self.stopped {
            return Err(CaptureError::Recorder("stream already stopped".to_string()));
        }
        self.recording = true;
        lock(&self.state).log.recordings_started += 1;
        Ok(())
    }

    fn stop_recording(&mut self) -> CaptureResult<()> {
        if !self.recording {
            return Err(CaptureError::Recorder("recorder is not running".to_string()));
        }
        self.recording = false;
        lock(&self.state).log.recordings_stopped += 1;
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.recording
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        debug!("Simulated stream {} stopped", self.device.device.device_id);
        lock(&self.state)
            .log
            .stopped
            .push(self.device.device.device_id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brightness::average_luma;

    #[tokio::test]
    async fn test_permission_behaviors() {
        let granted = SimulatedCamera::with_default_devices();
        assert!(granted.request_permission().await.is_ok());

        let denied = SimulatedCamera::with_default_devices().with_permission(PermissionBehavior::Deny);
        assert_eq!(
            denied.request_permission().await,
            Err(CaptureError::PermissionDenied)
        );

        let failing = SimulatedCamera::with_default_devices().with_permission(PermissionBehavior::Fail);
        assert!(matches!(
            failing.request_permission().await,
            Err(CaptureError::DeviceAccess(_))
        ));
        assert_eq!(failing.log().permission_requests, 1);
    }

    #[tokio::test]
    async fn test_stream_lifecycle_is_logged() {
        let camera = SimulatedCamera::with_default_devices();
        let mut stream = camera.open_stream("back").await.unwrap();
        assert!(stream.supports_focus());

        stream.start_recording().unwrap();
        assert!(stream.is_recording());
        stream.stop_recording().unwrap();
        stream.stop();
        stream.stop();

        let log = camera.log();
        assert_eq!(log.opened, vec!["back"]);
        assert_eq!(log.stopped, vec!["back"]);
        assert_eq!(log.active_streams(), 0);
        assert_eq!((log.recordings_started, log.recordings_stopped), (1, 1));
    }

    #[tokio::test]
    async fn test_frames_follow_brightness() {
        let camera = SimulatedCamera::new(vec![SimulatedDevice::new("cam", "Cam").with_brightness(40)]);
        let mut stream = camera.open_stream("cam").await.unwrap();

        let frame = stream.grab_frame(64, 48).unwrap();
        assert_eq!(average_luma(&frame), Some(40.0));

        camera.set_brightness("cam", 200);
        let frame = stream.grab_frame(8, 8).unwrap();
        assert_eq!(average_luma(&frame), Some(200.0));

        stream.stop();
        assert!(stream.grab_frame(8, 8).is_none());
    }

    #[tokio::test]
    async fn test_open_failures() {
        let camera = SimulatedCamera::new(vec![SimulatedDevice::new("cam", "Cam").failing()]);
        assert!(matches!(
            camera.open_stream("cam").await,
            Err(CaptureError::StreamSetup { .. })
        ));
        assert!(camera.open_stream("missing").await.is_err());
        assert!(camera.log().opened.is_empty());
    }

    #[tokio::test]
    async fn test_focus_requires_capability() {
        let camera = SimulatedCamera::with_default_devices();
        let mut front = camera.open_stream("front").await.unwrap();
        assert!(front.focus_at(FocusPoint { x: 0.5, y: 0.5 }).is_err());

        let mut back = camera.open_stream("back").await.unwrap();
        back.focus_at(FocusPoint { x: 0.2, y: 0.8 }).unwrap();
        assert_eq!(camera.log().focus_points, vec![FocusPoint { x: 0.2, y: 0.8 }]);
    }
}
