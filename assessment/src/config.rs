use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachConfig {
    /// Simulated model latency before feedback is returned.
    pub response_delay: Duration,
    /// Delay between characters when feedback is revealed with the typing effect.
    pub typing_speed: Duration,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            response_delay: Duration::from_millis(2500),
            typing_speed: Duration::from_millis(30),
        }
    }
}

impl CoachConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = delay;
        self
    }

    pub fn with_typing_speed(mut self, speed: Duration) -> Self {
        self.typing_speed = speed;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.response_delay > Duration::from_secs(60) {
            return Err("Response delay must not exceed 60 seconds".to_string());
        }

        if self.typing_speed.is_zero() {
            return Err("Typing speed must be greater than 0".to_string());
        }

        Ok(())
    }
}
