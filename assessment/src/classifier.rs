//! Performance tiers for test results.
//!
//! Thresholds are fixed per test type. Each tier carries a short piece of
//! canned feedback and an emphasis hint for how loudly the figure should be
//! presented.

use crate::types::{TestResult, TestType};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
    Good,
    Average,
    Poor,
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceTier::Good => write!(f, "good"),
            PerformanceTier::Average => write!(f, "average"),
            PerformanceTier::Poor => write!(f, "poor"),
        }
    }
}

/// How the headline metric is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    CelebrateBurst,
    SubtleGlow,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PerformanceFeedback {
    pub tier: PerformanceTier,
    pub feedback: &'static str,
    pub emphasis: Emphasis,
}

impl PerformanceFeedback {
    const fn good(feedback: &'static str) -> Self {
        Self {
            tier: PerformanceTier::Good,
            feedback,
            emphasis: Emphasis::CelebrateBurst,
        }
    }

    const fn average(feedback: &'static str) -> Self {
        Self {
            tier: PerformanceTier::Average,
            feedback,
            emphasis: Emphasis::SubtleGlow,
        }
    }

    const fn poor(feedback: &'static str) -> Self {
        Self {
            tier: PerformanceTier::Poor,
            feedback,
            emphasis: Emphasis::None,
        }
    }
}

/// Returned when the result does not belong to the requested test.
pub const FALLBACK_FEEDBACK: PerformanceFeedback = PerformanceFeedback {
    tier: PerformanceTier::Average,
    feedback: "Well done! Consistent practice leads to improvement.",
    emphasis: Emphasis::None,
};

/// Tier for a result of the given test.
pub fn classify(test_type: TestType, result: &TestResult) -> PerformanceFeedback {
    if result.test_type() != test_type {
        return FALLBACK_FEEDBACK;
    }

    match result {
        TestResult::VerticalJump(jump) => {
            if jump.height > 45.0 {
                PerformanceFeedback::good(
                    "Excellent explosive power! To improve further, focus on plyometric exercises.",
                )
            } else if jump.height > 30.0 {
                PerformanceFeedback::average(
                    "A strong performance! Incorporating squats can help you reach new heights.",
                )
            } else {
                PerformanceFeedback::poor(
                    "Solid effort! Building foundational leg strength will boost your results.",
                )
            }
        }
        TestResult::SitUps(reps) => {
            if reps.count > 40 {
                PerformanceFeedback::good(
                    "Incredible core endurance! Your core is a solid athletic foundation.",
                )
            } else if reps.count > 20 {
                PerformanceFeedback::average(
                    "Great work! Try incorporating planks to build supporting core muscles.",
                )
            } else {
                PerformanceFeedback::poor(
                    "Good job! Focus on consistent training to improve endurance.",
                )
            }
        }
        TestResult::Sprint(sprint) => {
            if sprint.time < 5.0 {
                PerformanceFeedback::good(
                    "Blazing fast! Maintain this with regular sprint drills and explosive starts.",
                )
            } else if sprint.time < 5.8 {
                PerformanceFeedback::average(
                    "A great display of speed! Work on acceleration in the first 10 meters.",
                )
            } else {
                PerformanceFeedback::poor(
                    "Solid sprint! Improving your running form will make a big difference.",
                )
            }
        }
        TestResult::PushUps(reps) => {
            if reps.count > 30 {
                PerformanceFeedback::good(
                    "Amazing upper body strength! This shows excellent muscular endurance.",
                )
            } else if reps.count > 15 {
                PerformanceFeedback::average(
                    "Strong performance! Try variations like incline push-ups to progress.",
                )
            } else {
                PerformanceFeedback::poor(
                    "Good work! Build chest and triceps strength to improve your count.",
                )
            }
        }
        TestResult::BroadJump(jump) => {
            if jump.distance > 220.0 {
                PerformanceFeedback::good(
                    "Phenomenal leg power! This shows elite explosive strength.",
                )
            } else if jump.distance > 180.0 {
                PerformanceFeedback::average(
                    "Great distance! Use your arms for momentum to jump even farther.",
                )
            } else {
                PerformanceFeedback::poor(
                    "A solid jump! Improving squat strength will help you cover more ground.",
                )
            }
        }
        TestResult::MedicineBallThrow(throw) => {
            if throw.distance > 8.0 {
                PerformanceFeedback::good(
                    "Incredible power! This is a great measure of total-body explosiveness.",
                )
            } else if throw.distance > 5.0 {
                PerformanceFeedback::average(
                    "A powerful throw! Focus on rotating your hips and torso for more force.",
                )
            } else {
                PerformanceFeedback::poor(
                    "Nice throw! Build rotational strength with exercises like wood chops.",
                )
            }
        }
    }
}

/// Headline figure for the results screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDisplay {
    pub value: String,
    pub label: &'static str,
    pub unit: &'static str,
}

impl TestResult {
    pub fn metric(&self) -> MetricDisplay {
        let (value, label, unit) = match self {
            TestResult::VerticalJump(j) => {
                (format!("{:.1}", j.height), "Vertical Jump Height", "cm")
            }
            TestResult::SitUps(r) => (r.count.to_string(), "Total Sit-ups", "reps"),
            TestResult::Sprint(s) => (format!("{:.2}", s.time), "40m Sprint Time", "s"),
            TestResult::PushUps(r) => (r.count.to_string(), "Total Push-ups", "reps"),
            TestResult::BroadJump(d) => {
                (format!("{:.1}", d.distance), "Broad Jump Distance", "cm")
            }
            TestResult::MedicineBallThrow(d) => {
                (format!("{:.2}", d.distance), "Medicine Ball Throw", "m")
            }
        };
        MetricDisplay { value, label, unit }
    }

    /// Compact figure used in the history list, e.g. `48.0 cm` or `28 reps`.
    pub fn summary(&self) -> String {
        let metric = self.metric();
        format!("{} {}", metric.value, metric.unit)
    }
}
