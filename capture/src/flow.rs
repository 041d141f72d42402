//! The guided capture sequence.
//!
//! A [`CaptureFlow`] runs one capture from permission prompt to finished
//! recording:
//!
//! 1. request access, enumerate devices and open the first one;
//! 2. wait until the scene has been optimal for the auto-start delay, sampling
//!    preview brightness and applying user controls meanwhile;
//! 3. count down;
//! 4. record for the test's duration, reporting progress.
//!
//! Progress is published as [`CaptureEvent`]s. Every stream the flow opens is
//! held in a [`StreamGuard`], so tracks are stopped on completion, on
//! cancellation and on error alike.

use crate::brightness::{average_luma, is_low_light};
use crate::config::CaptureConfig;
use crate::device::{CameraBackend, FocusPoint, StreamGuard, VideoDevice};
use crate::readiness::{DistanceWarning, ReadinessConditions};
use crate::{CaptureError, CaptureResult};
use std::future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior, Sleep};
use tracing::{debug, error, info, warn};

/// User input accepted while a capture is running.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureControl {
    SetSimulatedLowLight(bool),
    SetSimulatedShake(bool),
    SetDistance(DistanceWarning),
    /// Cycle to the next camera. Only honoured before the countdown starts.
    SwitchCamera,
    Focus(FocusPoint),
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    DevicesFound(Vec<VideoDevice>),
    CameraReady {
        device_id: String,
        supports_focus: bool,
    },
    Conditions(ReadinessConditions),
    AutoStartArmed,
    AutoStartCancelled,
    Countdown(u8),
    RecordingStarted,
    /// Fraction of the recording elapsed, `0.0..=1.0`.
    Progress(f32),
    RecordingFinished,
    FocusApplied(FocusPoint),
    /// User-facing camera error text.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingOutcome {
    pub device_id: String,
    pub duration: Duration,
}

pub struct CaptureFlow {
    backend: Box<dyn CameraBackend>,
    config: CaptureConfig,
    recording_duration: Duration,
}

impl CaptureFlow {
    pub fn new(
        backend: Box<dyn CameraBackend>,
        config: CaptureConfig,
        recording_duration: Duration,
    ) -> CaptureResult<Self> {
        config.validate().map_err(CaptureError::InvalidConfig)?;
        Ok(Self {
            backend,
            config,
            recording_duration,
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn recording_duration(&self) -> Duration {
        self.recording_duration
    }

    /// Run the capture to completion.
    ///
    /// Returns [`CaptureError::Cancelled`] when a [`CaptureControl::Cancel`]
    /// arrives before the recording finishes. Any other error has already
    /// been published as [`CaptureEvent::Error`].
    pub async fn run(
        self,
        mut controls: mpsc::Receiver<CaptureControl>,
        events: mpsc::UnboundedSender<CaptureEvent>,
    ) -> CaptureResult<RecordingOutcome> {
        info!(
            "Starting capture on {} backend ({:?} recording)",
            self.backend.backend_name(),
            self.recording_duration
        );

        let mut session = Session {
            backend: self.backend.as_ref(),
            config: &self.config,
            recording_duration: self.recording_duration,
            events,
            conditions: ReadinessConditions::default(),
            devices: Vec::new(),
            device_index: 0,
            stream: None,
            controls_open: true,
        };

        let result = session.drive(&mut controls).await;
        match &result {
            Ok(outcome) => info!("Recorded {:?} on {}", outcome.duration, outcome.device_id),
            Err(CaptureError::Cancelled) => info!("Capture cancelled by user"),
            Err(e) => {
                error!("Capture failed: {}", e);
                session.conditions.camera_ready = false;
                session.conditions.error = Some(e.user_message().to_string());
                session.emit(CaptureEvent::Error(e.user_message().to_string()));
            }
        }
        // Dropping the session releases the stream before the caller sees the result.
        drop(session);
        result
    }
}

struct Session<'a> {
    backend: &'a dyn CameraBackend,
    config: &'a CaptureConfig,
    recording_duration: Duration,
    events: mpsc::UnboundedSender<CaptureEvent>,
    conditions: ReadinessConditions,
    devices: Vec<VideoDevice>,
    device_index: usize,
    stream: Option<StreamGuard>,
    controls_open: bool,
}

impl Session<'_> {
    fn emit(&self, event: CaptureEvent) {
        // Nobody listening is fine; the flow still completes.
        let _ = self.events.send(event);
    }

    fn publish_conditions(&self) {
        self.emit(CaptureEvent::Conditions(self.conditions.clone()));
    }

    async fn drive(
        &mut self,
        controls: &mut mpsc::Receiver<CaptureControl>,
    ) -> CaptureResult<RecordingOutcome> {
        self.discover().await?;
        self.open_current().await?;
        self.await_ready(controls).await?;
        self.count_down(controls).await?;
        self.record(controls).await
    }

    async fn discover(&mut self) -> CaptureResult<()> {
        self.backend.request_permission().await?;
        let devices = self.backend.enumerate_devices().await?;
        if devices.is_empty() {
            return Err(CaptureError::NoCameraFound);
        }

        debug!("Found {} video devices", devices.len());
        self.emit(CaptureEvent::DevicesFound(devices.clone()));
        self.devices = devices;
        Ok(())
    }

    async fn open_current(&mut self) -> CaptureResult<()> {
        // Release the previous device before asking for the next one.
        self.stream = None;

        let device = &self.devices[self.device_index];
        let stream = self.backend.open_stream(&device.device_id).await?;
        let supports_focus = stream.supports_focus();
        info!("Camera ready: {} ({})", device.label, device.device_id);

        self.emit(CaptureEvent::CameraReady {
            device_id: device.device_id.clone(),
            supports_focus,
        });
        self.stream = Some(StreamGuard::new(stream));
        self.conditions.camera_ready = true;
        self.conditions.error = None;
        self.publish_conditions();
        Ok(())
    }

    async fn await_ready(&mut self, controls: &mut mpsc::Receiver<CaptureControl>) -> CaptureResult<()> {
        let period = self.config.brightness_interval;
        let mut brightness = time::interval_at(Instant::now() + period, period);
        brightness.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut auto_start: Option<Pin<Box<Sleep>>> = None;

        loop {
            match (self.conditions.is_optimal(), auto_start.is_some()) {
                (true, false) => {
                    debug!("Scene optimal, arming auto-start");
                    auto_start = Some(Box::pin(time::sleep(self.config.auto_start_delay)));
                    self.emit(CaptureEvent::AutoStartArmed);
                }
                (false, true) => {
                    debug!("Scene no longer optimal, auto-start cancelled");
                    auto_start = None;
                    self.emit(CaptureEvent::AutoStartCancelled);
                }
                _ => {}
            }

            // A brightness sample or a control due at the same instant as the
            // auto-start takes precedence over it.
            tokio::select! {
                biased;
                _ = brightness.tick() => self.sample_brightness(),
                control = controls.recv(), if self.controls_open => match control {
                    Some(CaptureControl::Cancel) => return Err(CaptureError::Cancelled),
                    Some(CaptureControl::SwitchCamera) => {
                        if self.switch_camera().await? && auto_start.take().is_some() {
                            self.emit(CaptureEvent::AutoStartCancelled);
                        }
                    }
                    Some(other) => self.apply_control(other),
                    None => self.controls_open = false,
                },
                _ = fire(&mut auto_start) => return Ok(()),
            }
        }
    }

    async fn count_down(&mut self, controls: &mut mpsc::Receiver<CaptureControl>) -> CaptureResult<()> {
        for n in (1..=self.config.countdown_from).rev() {
            self.emit(CaptureEvent::Countdown(n));
            let step = time::sleep(self.config.countdown_step);
            tokio::pin!(step);

            loop {
                tokio::select! {
                    _ = &mut step => break,
                    control = controls.recv(), if self.controls_open => match control {
                        Some(CaptureControl::Cancel) => return Err(CaptureError::Cancelled),
                        Some(CaptureControl::SwitchCamera) => debug!("Ignoring camera switch during countdown"),
                        Some(other) => self.apply_control(other),
                        None => self.controls_open = false,
                    },
                }
            }
        }
        Ok(())
    }

    async fn record(&mut self, controls: &mut mpsc::Receiver<CaptureControl>) -> CaptureResult<RecordingOutcome> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| CaptureError::Recorder("no open stream".to_string()))?;
        stream.start_recording()?;
        let device_id = stream.device_id().to_string();
        info!("Recording started on {}", device_id);
        self.emit(CaptureEvent::RecordingStarted);

        let total = self.recording_duration;
        let started = Instant::now();
        let deadline = time::sleep(total);
        tokio::pin!(deadline);
        let mut progress = time::interval(self.config.progress_interval);
        progress.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = &mut deadline => break,
                _ = progress.tick() => {
                    self.emit(CaptureEvent::Progress(fraction(started.elapsed(), total)));
                }
                control = controls.recv(), if self.controls_open => match control {
                    Some(CaptureControl::Cancel) => return Err(CaptureError::Cancelled),
                    Some(other) => debug!("Ignoring {:?} while recording", other),
                    None => self.controls_open = false,
                },
            }
        }

        if let Some(stream) = self.stream.as_mut() {
            stream.stop_recording()?;
        }
        self.emit(CaptureEvent::Progress(1.0));
        self.emit(CaptureEvent::RecordingFinished);

        Ok(RecordingOutcome {
            device_id,
            duration: total,
        })
    }

    fn sample_brightness(&mut self) {
        let (width, height) = (self.config.sample_width, self.config.sample_height);
        let Some(frame) = self.stream.as_mut().and_then(|s| s.grab_frame(width, height)) else {
            return;
        };
        let Some(luma) = average_luma(&frame) else {
            return;
        };

        let low = is_low_light(luma, self.config.low_light_threshold);
        if low != self.conditions.measured_low_light {
            debug!("Preview luma {:.1}, low light: {}", luma, low);
            self.conditions.measured_low_light = low;
            self.publish_conditions();
        }
    }

    /// Apply a toggle or focus request. Camera switching and cancellation are
    /// handled by the phase loops.
    fn apply_control(&mut self, control: CaptureControl) {
        let before = self.conditions.clone();
        match control {
            CaptureControl::SetSimulatedLowLight(on) => self.conditions.simulated_low_light = on,
            CaptureControl::SetSimulatedShake(on) => self.conditions.simulated_shake = on,
            CaptureControl::SetDistance(distance) => self.conditions.distance = distance,
            CaptureControl::Focus(point) => self.focus(point),
            CaptureControl::SwitchCamera | CaptureControl::Cancel => {}
        }
        if self.conditions != before {
            self.publish_conditions();
        }
    }

    fn focus(&mut self, point: FocusPoint) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        if !stream.supports_focus() {
            return;
        }
        match stream.focus_at(point) {
            Ok(()) => self.emit(CaptureEvent::FocusApplied(point)),
            Err(e) => warn!("Focus request failed: {}", e),
        }
    }

    /// Returns `false` when there is nothing to switch to.
    async fn switch_camera(&mut self) -> CaptureResult<bool> {
        if self.devices.len() <= 1 {
            return Ok(false);
        }
        self.device_index = (self.device_index + 1) % self.devices.len();
        self.conditions.camera_ready = false;
        self.open_current().await?;
        Ok(true)
    }
}

async fn fire(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => future::pending().await,
    }
}

fn fraction(elapsed: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / total.as_secs_f32()).min(1.0)
}
