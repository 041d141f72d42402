//! Application configuration.
//!
//! Read from a TOML file when one is given; every field is optional and
//! falls back to the built-in timing.
//!
//! ```toml
//! data_dir = "/home/athlete/.talent-scout"
//! low_light_threshold = 70.0
//!
//! [timing]
//! auto_start_delay_ms = 2000
//! analysis_stage_ms = 1200
//! coach_delay_ms = 2500
//! ```

use crate::analysis::AnalysisTiming;
use crate::transmission::EncryptionConfig;
use assessment::CoachConfig;
use capture::CaptureConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Timer overrides in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub brightness_interval_ms: u64,
    pub auto_start_delay_ms: u64,
    pub countdown_step_ms: u64,
    pub progress_interval_ms: u64,
    pub analysis_stage_ms: u64,
    pub analysis_grace_ms: u64,
    pub coach_delay_ms: u64,
    pub typing_speed_ms: u64,
    pub encryption_ms: u64,
    pub encryption_frame_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            brightness_interval_ms: 2000,
            auto_start_delay_ms: 2000,
            countdown_step_ms: 1000,
            progress_interval_ms: 100,
            analysis_stage_ms: 1200,
            analysis_grace_ms: 500,
            coach_delay_ms: 2500,
            typing_speed_ms: 30,
            encryption_ms: 2500,
            encryption_frame_ms: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the profile and history files live.
    pub data_dir: PathBuf,
    pub low_light_threshold: f64,
    pub timing: TimingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".talent-scout"),
            low_light_threshold: capture::brightness::LOW_LIGHT_THRESHOLD,
            timing: TimingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Load `path` if given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                debug!("Loaded config from {}", path.display());
                Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn capture_config(&self) -> CaptureConfig {
        let t = &self.timing;
        let mut config = CaptureConfig::new()
            .with_brightness_interval(ms(t.brightness_interval_ms))
            .with_auto_start_delay(ms(t.auto_start_delay_ms))
            .with_countdown(3, ms(t.countdown_step_ms))
            .with_low_light_threshold(self.low_light_threshold);
        config.progress_interval = ms(t.progress_interval_ms);
        config
    }

    pub fn analysis_timing(&self) -> AnalysisTiming {
        AnalysisTiming::default()
            .with_stage_interval(ms(self.timing.analysis_stage_ms))
            .with_completion_grace(ms(self.timing.analysis_grace_ms))
    }

    pub fn coach_config(&self) -> CoachConfig {
        CoachConfig::new()
            .with_response_delay(ms(self.timing.coach_delay_ms))
            .with_typing_speed(ms(self.timing.typing_speed_ms))
    }

    pub fn encryption_config(&self) -> EncryptionConfig {
        EncryptionConfig {
            frame_interval: ms(self.timing.encryption_frame_ms),
            ..EncryptionConfig::default()
        }
        .with_duration(ms(self.timing.encryption_ms))
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.capture_config().validate().map_err(ConfigError::Invalid)?;
        self.analysis_timing().validate().map_err(ConfigError::Invalid)?;
        self.coach_config().validate().map_err(ConfigError::Invalid)?;
        self.encryption_config().validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_components() {
        let config = AppConfig::default();
        assert_eq!(config.capture_config(), CaptureConfig::default());
        assert_eq!(config.analysis_timing(), AnalysisTiming::default());
        assert_eq!(config.coach_config(), CoachConfig::default());
        assert_eq!(config.encryption_config(), EncryptionConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            data_dir = "/tmp/scout"

            [timing]
            coach_delay_ms = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/scout"));
        assert_eq!(config.coach_config().response_delay, Duration::from_millis(100));
        assert_eq!(config.timing.analysis_stage_ms, 1200);
        assert_eq!(config.low_light_threshold, 70.0);
    }

    #[test]
    fn test_load_missing_path_uses_defaults() {
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            AppConfig::load(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "timing = 3").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&bad)),
            Err(ConfigError::Parse { .. })
        ));

        let invalid = dir.path().join("invalid.toml");
        fs::write(&invalid, "[timing]\nanalysis_stage_ms = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&invalid)),
            Err(ConfigError::Invalid(_))
        ));
    }
}
