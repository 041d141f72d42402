//! Transmission screen: the "encryption" animation and the data packet.
//!
//! Nothing is encrypted or sent. The animation scrolls random hex for a
//! fixed time, after which the packet is shown as secured and the user may
//! finish.

use crate::config::{ConfigError, ConfigResult};
use crate::integrity::IntegrityStatus;
use assessment::{TestResult, TestType};
use chrono::{DateTime, SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

const HEX_CHARS: &[u8] = b"abcdef1234567890";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncryptionConfig {
    pub duration: Duration,
    pub frame_interval: Duration,
    pub lines: usize,
    pub line_length: usize,
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(2500),
            frame_interval: Duration::from_millis(80),
            lines: 16,
            line_length: 50,
        }
    }
}

impl EncryptionConfig {
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.frame_interval.is_zero() {
            return Err("Frame interval must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptionPhase {
    #[default]
    Encrypting,
    Encrypted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransmissionEvent {
    /// A fresh screen of scrambled lines.
    Frame(Vec<String>),
    Encrypted,
}

/// `lines` strings of `length` random lowercase hex characters.
pub fn scramble_lines<R: Rng + ?Sized>(rng: &mut R, lines: usize, length: usize) -> Vec<String> {
    (0..lines)
        .map(|_| {
            (0..length)
                .map(|_| HEX_CHARS[rng.gen_range(0..HEX_CHARS.len())] as char)
                .collect()
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct EncryptionAnimation {
    config: EncryptionConfig,
    phase: EncryptionPhase,
}

impl EncryptionAnimation {
    pub fn new(config: EncryptionConfig) -> ConfigResult<Self> {
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(Self {
            config,
            phase: EncryptionPhase::Encrypting,
        })
    }

    pub fn phase(&self) -> EncryptionPhase {
        self.phase
    }

    /// The finish button is disabled while encrypting.
    pub fn can_finish(&self) -> bool {
        self.phase == EncryptionPhase::Encrypted
    }

    /// Play the animation to the end. Frames are emitted every frame
    /// interval until the duration elapses; dropping the future stops it.
    pub async fn run(&mut self, events: mpsc::UnboundedSender<TransmissionEvent>) {
        if self.can_finish() {
            return;
        }

        let start = Instant::now();
        let done = time::sleep_until(start + self.config.duration);
        tokio::pin!(done);
        let mut frames = time::interval_at(start + self.config.frame_interval, self.config.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut rng = StdRng::from_entropy();
        let mut count = 0usize;

        loop {
            tokio::select! {
                biased;
                _ = &mut done => break,
                _ = frames.tick() => {
                    count += 1;
                    let _ = events.send(TransmissionEvent::Frame(scramble_lines(
                        &mut rng,
                        self.config.lines,
                        self.config.line_length,
                    )));
                }
            }
        }

        debug!("Encryption animation finished after {} frames", count);
        self.phase = EncryptionPhase::Encrypted;
        let _ = events.send(TransmissionEvent::Encrypted);
    }
}

/// Per-test figures carried by the packet, flattened into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PacketMetrics {
    VerticalJump {
        #[serde(rename = "jumpHeight_cm")]
        jump_height_cm: f64,
    },
    SitUps {
        #[serde(rename = "situpCount")]
        situp_count: u32,
        #[serde(rename = "formDeviations")]
        form_deviations: u32,
    },
    Sprint {
        #[serde(rename = "sprintTime_s")]
        sprint_time_s: f64,
    },
    PushUps {
        #[serde(rename = "pushupCount")]
        pushup_count: u32,
        #[serde(rename = "formDeviations")]
        form_deviations: u32,
    },
    BroadJump {
        #[serde(rename = "broadJumpDistance_cm")]
        broad_jump_distance_cm: f64,
    },
    MedicineBallThrow {
        #[serde(rename = "medicineBallThrow_m")]
        medicine_ball_throw_m: f64,
    },
}

impl From<&TestResult> for PacketMetrics {
    fn from(result: &TestResult) -> Self {
        match *result {
            TestResult::VerticalJump(j) => PacketMetrics::VerticalJump {
                jump_height_cm: j.height,
            },
            TestResult::SitUps(r) => PacketMetrics::SitUps {
                situp_count: r.count,
                form_deviations: r.deviations,
            },
            TestResult::Sprint(s) => PacketMetrics::Sprint {
                sprint_time_s: s.time,
            },
            TestResult::PushUps(r) => PacketMetrics::PushUps {
                pushup_count: r.count,
                form_deviations: r.deviations,
            },
            TestResult::BroadJump(d) => PacketMetrics::BroadJump {
                broad_jump_distance_cm: d.distance,
            },
            TestResult::MedicineBallThrow(d) => PacketMetrics::MedicineBallThrow {
                medicine_ball_throw_m: d.distance,
            },
        }
    }
}

/// The summary that would be sent upstream in place of the raw video.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPacket {
    pub test_type: TestType,
    /// RFC 3339 with millisecond precision, UTC.
    pub timestamp: String,
    pub integrity_status: IntegrityStatus,
    #[serde(flatten)]
    pub metrics: PacketMetrics,
}

impl DataPacket {
    pub fn new(result: &TestResult, flagged: bool, at: DateTime<Utc>) -> Self {
        let packet = Self {
            test_type: result.test_type(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            integrity_status: IntegrityStatus::from_flag(flagged),
            metrics: PacketMetrics::from(result),
        };
        info!(
            "Prepared {} data packet ({})",
            packet.test_type, packet.integrity_status
        );
        packet
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_scramble_lines_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let lines = scramble_lines(&mut rng, 16, 50);
        assert_eq!(lines.len(), 16);
        assert!(lines
            .iter()
            .all(|l| l.len() == 50 && l.bytes().all(|b| HEX_CHARS.contains(&b))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_only_after_duration() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut animation = EncryptionAnimation::default();
        assert!(!animation.can_finish());

        let start = Instant::now();
        animation.run(tx).await;
        assert_eq!(start.elapsed(), Duration::from_millis(2500));
        assert!(animation.can_finish());

        let mut frames = 0;
        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            if let TransmissionEvent::Frame(lines) = &event {
                assert_eq!(lines.len(), 16);
                frames += 1;
            }
            last = Some(event);
        }
        // Ticks at 80ms..=2480ms.
        assert_eq!(frames, 31);
        assert_eq!(last, Some(TransmissionEvent::Encrypted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_animation_stays_encrypting() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut animation = EncryptionAnimation::default();
        let _ = time::timeout(Duration::from_millis(1000), animation.run(tx)).await;
        assert_eq!(animation.phase(), EncryptionPhase::Encrypting);
        assert!(!animation.can_finish());
    }

    #[test]
    fn test_zero_frame_interval_rejected() {
        let config = EncryptionConfig {
            frame_interval: Duration::ZERO,
            ..EncryptionConfig::default()
        };
        assert!(matches!(
            EncryptionAnimation::new(config),
            Err(ConfigError::Invalid(_))
        ));
        assert!(EncryptionAnimation::new(EncryptionConfig::default().with_duration(Duration::ZERO)).is_ok());
    }

    #[test]
    fn test_packet_fields() {
        let at = Utc.with_ymd_and_hms(2025, 3, 5, 10, 30, 0).unwrap();
        let packet = DataPacket::new(&TestResult::sit_ups(28, 1), true, at);
        let value = serde_json::to_value(&packet).unwrap();
        assert_eq!(
            value,
            json!({
                "testType": "Sit-up Test",
                "timestamp": "2025-03-05T10:30:00.000Z",
                "integrityStatus": "FLAGGED",
                "situpCount": 28,
                "formDeviations": 1
            })
        );
    }

    #[test]
    fn test_distance_packets_are_distinct() {
        let at = Utc.with_ymd_and_hms(2025, 3, 5, 10, 30, 0).unwrap();
        let broad = serde_json::to_value(DataPacket::new(&TestResult::broad_jump(210.5), false, at)).unwrap();
        let ball = serde_json::to_value(DataPacket::new(&TestResult::medicine_ball_throw(7.25), false, at)).unwrap();

        assert_eq!(broad["broadJumpDistance_cm"], json!(210.5));
        assert_eq!(ball["medicineBallThrow_m"], json!(7.25));
        assert_eq!(ball["integrityStatus"], json!("VERIFIED"));
        assert!(broad.get("medicineBallThrow_m").is_none());
    }
}
