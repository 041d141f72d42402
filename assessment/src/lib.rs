pub mod catalog;
pub mod classifier;
pub mod config;
#[cfg(feature = "mock-coach")]
pub mod mock;
pub mod provider;
pub mod types;

pub use catalog::{AnalysisStage, Instructions};
pub use classifier::{
    classify, Emphasis, MetricDisplay, PerformanceFeedback, PerformanceTier, FALLBACK_FEEDBACK,
};
pub use config::CoachConfig;
pub use provider::{
    coaching_prompt, feedback_or_fallback, typing_effect, CoachError, CoachProvider, CoachResult,
    COACH_UNAVAILABLE,
};
pub use types::{
    DistanceResult, JumpResult, ParseTestTypeError, RepResult, ResultShapeError, SprintResult,
    TestRecord, TestResult, TestType, UserProfile, SPORTS,
};

#[cfg(feature = "mock-coach")]
pub use mock::MockCoach;

pub mod prelude {
    pub use crate::catalog::*;
    pub use crate::classifier::*;
    pub use crate::config::*;
    pub use crate::provider::*;
    pub use crate::types::*;

    #[cfg(feature = "mock-coach")]
    pub use crate::mock::*;
}
