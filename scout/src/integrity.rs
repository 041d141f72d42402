//! Integrity check shown after the results.
//!
//! Repetition tests get a form-check section describing rejected reps. Every
//! test gets an authenticity section driven by the simulated deepfake toggle.

use assessment::{TestResult, TestType};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntegrityStatus {
    Verified,
    Flagged,
}

impl IntegrityStatus {
    pub fn from_flag(flagged: bool) -> Self {
        if flagged {
            IntegrityStatus::Flagged
        } else {
            IntegrityStatus::Verified
        }
    }
}

impl fmt::Display for IntegrityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityStatus::Verified => write!(f, "VERIFIED"),
            IntegrityStatus::Flagged => write!(f, "FLAGGED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormCheck {
    pub deviations: u32,
    pub message: String,
}

impl FormCheck {
    pub fn passed(&self) -> bool {
        self.deviations == 0
    }
}

const ALL_REPS_CORRECT: &str = "Congratulations! All repetitions were performed with correct form.";
const AUTHENTIC: &str =
    "Video metadata and content appear authentic. No signs of manipulation detected.";
const MANIPULATED: &str =
    "Anomaly detected! The video appears to be manipulated. Submission will be flagged.";
const MANIPULATION_DETAIL: &str = "Metadata inconsistency found (Frame rate mismatch). Subtle visual artifacts detected in frames 45-52.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrityReport {
    pub test_type: TestType,
    /// Present only for sit-ups and push-ups.
    pub form_check: Option<FormCheck>,
    pub deepfake_detected: bool,
}

impl IntegrityReport {
    pub fn new(test_type: TestType, result: &TestResult, deepfake_detected: bool) -> Self {
        let form_check = test_type.counts_repetitions().then(|| {
            let deviations = if result.test_type() == test_type {
                result.deviations()
            } else {
                0
            };
            FormCheck {
                deviations,
                message: form_message(test_type, deviations),
            }
        });

        Self {
            test_type,
            form_check,
            deepfake_detected,
        }
    }

    /// The pill on the authenticity section. Form deviations do not affect it.
    pub fn authenticity_status(&self) -> IntegrityStatus {
        IntegrityStatus::from_flag(self.deepfake_detected)
    }

    pub fn authenticity_message(&self) -> &'static str {
        if self.deepfake_detected {
            MANIPULATED
        } else {
            AUTHENTIC
        }
    }

    /// Analysis detail shown under the message, only when manipulated.
    pub fn authenticity_detail(&self) -> Option<&'static str> {
        self.deepfake_detected.then_some(MANIPULATION_DETAIL)
    }

    pub fn is_flagged(&self) -> bool {
        self.deepfake_detected || self.form_check.as_ref().is_some_and(|c| !c.passed())
    }

    /// Status sent with the data packet.
    pub fn overall_status(&self) -> IntegrityStatus {
        IntegrityStatus::from_flag(self.is_flagged())
    }
}

fn form_message(test_type: TestType, deviations: u32) -> String {
    if deviations == 0 {
        return ALL_REPS_CORRECT.to_string();
    }
    let example = match test_type {
        TestType::PushUps => "incomplete range of motion",
        _ => "half sit-ups",
    };
    format!(
        "Detected {} repetitions with incorrect form (e.g., {}). These were not included in the final count.",
        deviations, example
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_situp_deviation_text() {
        let report = IntegrityReport::new(TestType::SitUps, &TestResult::sit_ups(28, 1), false);
        let check = report.form_check.as_ref().unwrap();
        assert_eq!(
            check.message,
            "Detected 1 repetitions with incorrect form (e.g., half sit-ups). These were not included in the final count."
        );
        assert!(report.is_flagged());
        assert_eq!(report.authenticity_status(), IntegrityStatus::Verified);
        assert_eq!(report.overall_status(), IntegrityStatus::Flagged);
    }

    #[test]
    fn test_pushup_texts() {
        let report = IntegrityReport::new(TestType::PushUps, &TestResult::push_ups(20, 3), false);
        assert!(report
            .form_check
            .as_ref()
            .unwrap()
            .message
            .contains("(e.g., incomplete range of motion)"));

        let clean = IntegrityReport::new(TestType::PushUps, &TestResult::push_ups(20, 0), false);
        let check = clean.form_check.unwrap();
        assert!(check.passed());
        assert_eq!(check.message, ALL_REPS_CORRECT);
    }

    #[test]
    fn test_no_form_check_for_other_tests() {
        let report = IntegrityReport::new(TestType::Sprint, &TestResult::sprint(5.1), false);
        assert!(report.form_check.is_none());
        assert!(!report.is_flagged());
        assert_eq!(report.authenticity_message(), AUTHENTIC);
    }

    #[test]
    fn test_deepfake_toggle_flips_pill() {
        let result = TestResult::vertical_jump(50.0);
        let real = IntegrityReport::new(TestType::VerticalJump, &result, false);
        let fake = IntegrityReport::new(TestType::VerticalJump, &result, true);

        assert_eq!(real.authenticity_status().to_string(), "VERIFIED");
        assert_eq!(fake.authenticity_status().to_string(), "FLAGGED");
        assert_eq!(fake.authenticity_message(), MANIPULATED);
        assert!(fake.is_flagged());

        assert_eq!(real.authenticity_detail(), None);
        assert!(fake
            .authenticity_detail()
            .is_some_and(|detail| detail.contains("frames 45-52")));

        let broad_jump = IntegrityReport::new(TestType::BroadJump, &TestResult::broad_jump(200.0), true);
        assert_eq!(broad_jump.authenticity_detail(), Some(MANIPULATION_DETAIL));
    }

    #[test]
    fn test_mismatched_result_has_no_deviations() {
        let report = IntegrityReport::new(TestType::SitUps, &TestResult::push_ups(20, 4), false);
        assert_eq!(report.form_check.unwrap().deviations, 0);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&IntegrityStatus::Flagged).unwrap(),
            "\"FLAGGED\""
        );
    }
}
