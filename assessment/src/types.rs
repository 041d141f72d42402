use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The six physical assessments a user can take.
///
/// Serialized with the display name, which is also the persisted form in
/// test history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestType {
    #[serde(rename = "Vertical Jump")]
    VerticalJump,
    #[serde(rename = "Sit-up Test")]
    SitUps,
    #[serde(rename = "40m Sprint")]
    Sprint,
    #[serde(rename = "Push-up Test")]
    PushUps,
    #[serde(rename = "Broad Jump")]
    BroadJump,
    #[serde(rename = "Medicine Ball Throw")]
    MedicineBallThrow,
}

impl TestType {
    /// All test types in home-screen order.
    pub const ALL: [TestType; 6] = [
        TestType::VerticalJump,
        TestType::SitUps,
        TestType::Sprint,
        TestType::PushUps,
        TestType::BroadJump,
        TestType::MedicineBallThrow,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            TestType::VerticalJump => "Vertical Jump",
            TestType::SitUps => "Sit-up Test",
            TestType::Sprint => "40m Sprint",
            TestType::PushUps => "Push-up Test",
            TestType::BroadJump => "Broad Jump",
            TestType::MedicineBallThrow => "Medicine Ball Throw",
        }
    }

    /// Short command-line friendly name.
    pub fn slug(&self) -> &'static str {
        match self {
            TestType::VerticalJump => "vertical-jump",
            TestType::SitUps => "sit-ups",
            TestType::Sprint => "sprint",
            TestType::PushUps => "push-ups",
            TestType::BroadJump => "broad-jump",
            TestType::MedicineBallThrow => "medicine-ball-throw",
        }
    }

    /// Whether results of this test carry a repetition count with form deviations.
    pub fn counts_repetitions(&self) -> bool {
        matches!(self, TestType::SitUps | TestType::PushUps)
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown test type: {input}")]
pub struct ParseTestTypeError {
    pub input: String,
}

impl FromStr for TestType {
    type Err = ParseTestTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        TestType::ALL
            .into_iter()
            .find(|t| {
                t.slug().eq_ignore_ascii_case(needle)
                    || t.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ParseTestTypeError {
                input: s.to_string(),
            })
    }
}

/// Vertical jump height in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JumpResult {
    pub height: f64,
}

/// Valid repetitions plus the number rejected for bad form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepResult {
    pub count: u32,
    pub deviations: u32,
}

/// Sprint time in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SprintResult {
    pub time: f64,
}

/// Distance covered. Centimetres for the broad jump, metres for the
/// medicine ball throw; the unit follows from the owning [`TestResult`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistanceResult {
    pub distance: f64,
}

/// Outcome of a test, tagged by the test that produced it.
///
/// Broad jump and medicine ball throw share a payload shape, so the variant
/// (never the payload fields) decides which test a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TestResult {
    VerticalJump(JumpResult),
    SitUps(RepResult),
    Sprint(SprintResult),
    PushUps(RepResult),
    BroadJump(DistanceResult),
    MedicineBallThrow(DistanceResult),
}

impl TestResult {
    pub fn vertical_jump(height: f64) -> Self {
        TestResult::VerticalJump(JumpResult { height })
    }

    pub fn sit_ups(count: u32, deviations: u32) -> Self {
        TestResult::SitUps(RepResult { count, deviations })
    }

    pub fn sprint(time: f64) -> Self {
        TestResult::Sprint(SprintResult { time })
    }

    pub fn push_ups(count: u32, deviations: u32) -> Self {
        TestResult::PushUps(RepResult { count, deviations })
    }

    pub fn broad_jump(distance: f64) -> Self {
        TestResult::BroadJump(DistanceResult { distance })
    }

    pub fn medicine_ball_throw(distance: f64) -> Self {
        TestResult::MedicineBallThrow(DistanceResult { distance })
    }

    pub fn test_type(&self) -> TestType {
        match self {
            TestResult::VerticalJump(_) => TestType::VerticalJump,
            TestResult::SitUps(_) => TestType::SitUps,
            TestResult::Sprint(_) => TestType::Sprint,
            TestResult::PushUps(_) => TestType::PushUps,
            TestResult::BroadJump(_) => TestType::BroadJump,
            TestResult::MedicineBallThrow(_) => TestType::MedicineBallThrow,
        }
    }

    /// Repetitions with incorrect form. Zero for tests that do not count reps.
    pub fn deviations(&self) -> u32 {
        match self {
            TestResult::SitUps(reps) | TestResult::PushUps(reps) => reps.deviations,
            _ => 0,
        }
    }

    pub fn has_deviations(&self) -> bool {
        self.deviations() > 0
    }
}

impl Serialize for TestResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ResultBody::from(*self).serialize(serializer)
    }
}

/// Wire shape of a result body. Only used together with a `testType` tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum ResultBody {
    Jump(JumpResult),
    Reps(RepResult),
    Sprint(SprintResult),
    Distance(DistanceResult),
}

impl From<TestResult> for ResultBody {
    fn from(result: TestResult) -> Self {
        match result {
            TestResult::VerticalJump(j) => ResultBody::Jump(j),
            TestResult::SitUps(r) | TestResult::PushUps(r) => ResultBody::Reps(r),
            TestResult::Sprint(s) => ResultBody::Sprint(s),
            TestResult::BroadJump(d) | TestResult::MedicineBallThrow(d) => ResultBody::Distance(d),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Result shape does not match test type {test_type}")]
pub struct ResultShapeError {
    pub test_type: TestType,
}

impl ResultBody {
    fn into_result(self, test_type: TestType) -> Result<TestResult, ResultShapeError> {
        match (test_type, self) {
            (TestType::VerticalJump, ResultBody::Jump(j)) => Ok(TestResult::VerticalJump(j)),
            (TestType::SitUps, ResultBody::Reps(r)) => Ok(TestResult::SitUps(r)),
            (TestType::Sprint, ResultBody::Sprint(s)) => Ok(TestResult::Sprint(s)),
            (TestType::PushUps, ResultBody::Reps(r)) => Ok(TestResult::PushUps(r)),
            (TestType::BroadJump, ResultBody::Distance(d)) => Ok(TestResult::BroadJump(d)),
            (TestType::MedicineBallThrow, ResultBody::Distance(d)) => {
                Ok(TestResult::MedicineBallThrow(d))
            }
            _ => Err(ResultShapeError { test_type }),
        }
    }
}

/// One completed test in the user's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTestRecord", into = "RawTestRecord")]
pub struct TestRecord {
    /// RFC 3339 completion instant.
    pub id: String,
    /// Completion date as shown to the user (day/month/year, unpadded, e.g. `5/3/2025`).
    pub date: String,
    pub result: TestResult,
}

impl TestRecord {
    pub fn new(id: impl Into<String>, date: impl Into<String>, result: TestResult) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            result,
        }
    }

    pub fn test_type(&self) -> TestType {
        self.result.test_type()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTestRecord {
    id: String,
    date: String,
    test_type: TestType,
    result: ResultBody,
}

impl TryFrom<RawTestRecord> for TestRecord {
    type Error = ResultShapeError;

    fn try_from(raw: RawTestRecord) -> Result<Self, Self::Error> {
        Ok(TestRecord {
            id: raw.id,
            date: raw.date,
            result: raw.result.into_result(raw.test_type)?,
        })
    }
}

impl From<TestRecord> for RawTestRecord {
    fn from(record: TestRecord) -> Self {
        RawTestRecord {
            test_type: record.result.test_type(),
            id: record.id,
            date: record.date,
            result: record.result.into(),
        }
    }
}

/// Sports offered in the profile editor. Anything else is stored as free text.
pub const SPORTS: [&str; 7] = [
    "Athletics",
    "Cricket",
    "Football",
    "Hockey",
    "Kabaddi",
    "Wrestling",
    "Other",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub sport: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Aspiring Athlete".to_string(),
            sport: "Athletics".to_string(),
        }
    }
}

impl UserProfile {
    pub fn new(name: impl Into<String>, sport: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sport: sport.into(),
        }
    }

    /// True when the sport is one of the listed choices other than "Other".
    pub fn has_listed_sport(&self) -> bool {
        self.sport != "Other" && SPORTS.contains(&self.sport.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_test_type_names() {
        assert_eq!(TestType::SitUps.to_string(), "Sit-up Test");
        assert_eq!(TestType::Sprint.display_name(), "40m Sprint");
        assert_eq!(
            serde_json::to_value(TestType::MedicineBallThrow).unwrap(),
            json!("Medicine Ball Throw")
        );
    }

    #[test]
    fn test_test_type_from_str() {
        assert_eq!("sit-ups".parse::<TestType>().unwrap(), TestType::SitUps);
        assert_eq!("Broad Jump".parse::<TestType>().unwrap(), TestType::BroadJump);
        assert_eq!(" SPRINT ".parse::<TestType>().unwrap(), TestType::Sprint);
        assert!("long jump".parse::<TestType>().is_err());
    }

    #[test]
    fn test_result_test_type_and_deviations() {
        assert_eq!(TestResult::push_ups(12, 3).test_type(), TestType::PushUps);
        assert_eq!(TestResult::push_ups(12, 3).deviations(), 3);
        assert!(!TestResult::sit_ups(30, 0).has_deviations());
        assert_eq!(TestResult::vertical_jump(40.0).deviations(), 0);
    }

    #[test]
    fn test_record_wire_format() {
        let record = TestRecord::new(
            "2025-01-02T03:04:05+00:00",
            "02/01/2025",
            TestResult::sit_ups(28, 1),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "2025-01-02T03:04:05+00:00",
                "date": "02/01/2025",
                "testType": "Sit-up Test",
                "result": { "count": 28, "deviations": 1 }
            })
        );
    }

    #[test]
    fn test_distance_results_disambiguated_by_test_type() {
        let broad: TestRecord = serde_json::from_value(json!({
            "id": "a", "date": "d", "testType": "Broad Jump", "result": { "distance": 7.5 }
        }))
        .unwrap();
        let throw: TestRecord = serde_json::from_value(json!({
            "id": "a", "date": "d", "testType": "Medicine Ball Throw", "result": { "distance": 7.5 }
        }))
        .unwrap();

        assert_eq!(broad.result, TestResult::broad_jump(7.5));
        assert_eq!(throw.result, TestResult::medicine_ball_throw(7.5));
        assert_ne!(broad.result, throw.result);
    }

    #[test]
    fn test_mismatched_result_shape_rejected() {
        let parsed: Result<TestRecord, _> = serde_json::from_value(json!({
            "id": "a", "date": "d", "testType": "Vertical Jump", "result": { "time": 5.1 }
        }));
        assert!(parsed.is_err());

        let parsed: Result<TestRecord, _> = serde_json::from_value(json!({
            "id": "a", "date": "d", "testType": "40m Sprint", "result": { "count": 3, "deviations": 0 }
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_user_profile_default() {
        let profile = UserProfile::default();
        assert_eq!(profile.name, "Aspiring Athlete");
        assert_eq!(profile.sport, "Athletics");
        assert!(profile.has_listed_sport());
        assert!(!UserProfile::new("A", "Other").has_listed_sport());
        assert!(!UserProfile::new("A", "Rowing").has_listed_sport());
    }
}
