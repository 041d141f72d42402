use crate::types::TestResult;
use async_trait::async_trait;
use futures::stream::{self, Stream};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

/// Shown in place of coaching feedback when the provider fails.
pub const COACH_UNAVAILABLE: &str =
    "Sorry, the AI Coach is unavailable right now. Please try again later.";

#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Coach unavailable: {message}")]
    Unavailable { message: String },
}

pub type CoachResult<T> = Result<T, CoachError>;

/// Source of markdown-formatted coaching feedback for a finished test.
#[async_trait]
pub trait CoachProvider: Send + Sync {
    async fn coaching_feedback(&self, result: &TestResult) -> CoachResult<String>;

    fn provider_name(&self) -> &'static str;
}

/// The prompt a generative coach would be given for this result.
pub fn coaching_prompt(result: &TestResult) -> CoachResult<String> {
    let body = serde_json::to_string(result)?;
    Ok(format!(
        "You are an elite sports performance coach. An athlete has just completed a {} test \
         with the following result: {}. Provide personalized feedback covering their strengths, \
         areas for improvement, and 2-3 specific, actionable drills to help them improve. \
         Format the response with markdown headings (e.g., ### Strengths).",
        result.test_type(),
        body
    ))
}

/// Ask the provider for feedback, substituting [`COACH_UNAVAILABLE`] on failure.
///
/// There is no retry; the user can ask again.
pub async fn feedback_or_fallback(provider: &dyn CoachProvider, result: &TestResult) -> String {
    match provider.coaching_feedback(result).await {
        Ok(feedback) => feedback,
        Err(e) => {
            error!(
                "Failed to get coaching feedback from {}: {}",
                provider.provider_name(),
                e
            );
            COACH_UNAVAILABLE.to_string()
        }
    }
}

/// Reveal `text` one character at a time, yielding the growing prefix after
/// each `speed` tick.
pub fn typing_effect(text: String, speed: Duration) -> impl Stream<Item = String> {
    debug!("Typing {} characters at {:?} per character", text.chars().count(), speed);
    stream::unfold((text, 0usize), move |(text, offset)| async move {
        let next = text[offset..].chars().next()?;
        tokio::time::sleep(speed).await;
        let end = offset + next.len_utf8();
        let prefix = text[..end].to_string();
        Some((prefix, (text, end)))
    })
}
