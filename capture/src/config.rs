use crate::brightness::LOW_LIGHT_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing and sampling parameters of the capture flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// How often a preview frame is sampled for brightness.
    pub brightness_interval: Duration,
    pub sample_width: u32,
    pub sample_height: u32,
    pub low_light_threshold: f64,
    /// How long the scene must stay ready before the countdown starts.
    pub auto_start_delay: Duration,
    pub countdown_from: u8,
    pub countdown_step: Duration,
    pub progress_interval: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            brightness_interval: Duration::from_secs(2),
            sample_width: 64,
            sample_height: 48,
            low_light_threshold: LOW_LIGHT_THRESHOLD,
            auto_start_delay: Duration::from_secs(2),
            countdown_from: 3,
            countdown_step: Duration::from_secs(1),
            progress_interval: Duration::from_millis(100),
        }
    }
}

impl CaptureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_start_delay(mut self, delay: Duration) -> Self {
        self.auto_start_delay = delay;
        self
    }

    pub fn with_brightness_interval(mut self, interval: Duration) -> Self {
        self.brightness_interval = interval;
        self
    }

    pub fn with_countdown(mut self, from: u8, step: Duration) -> Self {
        self.countdown_from = from;
        self.countdown_step = step;
        self
    }

    pub fn with_low_light_threshold(mut self, threshold: f64) -> Self {
        self.low_light_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.brightness_interval.is_zero() {
            return Err("Brightness interval must be greater than 0".to_string());
        }

        if self.sample_width == 0 || self.sample_height == 0 {
            return Err("Sample dimensions must be greater than 0".to_string());
        }

        if !(0.0..=255.0).contains(&self.low_light_threshold) {
            return Err("Low light threshold must be between 0 and 255".to_string());
        }

        if self.countdown_step.is_zero() {
            return Err("Countdown step must be greater than 0".to_string());
        }

        if self.progress_interval.is_zero() {
            return Err("Progress interval must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CaptureConfig::default();
        assert_eq!(config.brightness_interval, Duration::from_secs(2));
        assert_eq!((config.sample_width, config.sample_height), (64, 48));
        assert_eq!(config.low_light_threshold, 70.0);
        assert_eq!(config.auto_start_delay, Duration::from_secs(2));
        assert_eq!(config.countdown_from, 3);
        assert_eq!(config.progress_interval, Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CaptureConfig::default();

        config.brightness_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        config.brightness_interval = Duration::from_secs(2);
        config.low_light_threshold = 300.0;
        assert!(config.validate().is_err());

        config.low_light_threshold = 70.0;
        config.sample_width = 0;
        assert!(config.validate().is_err());

        config.sample_width = 64;
        config.countdown_step = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder() {
        let config = CaptureConfig::new()
            .with_auto_start_delay(Duration::from_millis(500))
            .with_countdown(5, Duration::from_millis(200))
            .with_low_light_threshold(40.0);
        assert_eq!(config.auto_start_delay, Duration::from_millis(500));
        assert_eq!(config.countdown_from, 5);
        assert_eq!(config.low_light_threshold, 40.0);
        assert!(config.validate().is_ok());
    }
}
