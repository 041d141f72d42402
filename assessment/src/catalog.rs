//! Static test catalog: instructions, framing guides, recording durations
//! and the scripted analysis stages shown while a result is "computed".

use crate::types::TestType;
use serde::Serialize;
use std::time::Duration;

/// Step-by-step setup instructions for one test.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Instructions {
    pub title: &'static str,
    pub steps: &'static [&'static str],
}

/// One scripted step of the mocked on-device analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisStage {
    pub message: &'static str,
    /// Intermediate figure displayed under the message, if any.
    pub result: Option<&'static str>,
}

const fn stage(message: &'static str, result: Option<&'static str>) -> AnalysisStage {
    AnalysisStage { message, result }
}

const JUMP_STAGES: [AnalysisStage; 6] = [
    stage("Initializing pose detection model...", None),
    stage("Scanning video for subject...", None),
    stage("Subject detected. Tracking center of mass.", None),
    stage("Analyzing take-off phase...", Some("Peak Velocity: 3.5 m/s")),
    stage(
        "Detecting jump arc and peak height...",
        Some("Estimated Height: 46 cm"),
    ),
    stage("Finalizing results...", Some("Calculated Height: 48 cm")),
];

const SITUP_STAGES: [AnalysisStage; 6] = [
    stage("Initializing repetition counting model...", None),
    stage("Identifying core body landmarks...", None),
    stage(
        "Monitoring torso angle for full range of motion...",
        Some("Live Rep Count: 15"),
    ),
    stage("Counting sit-up rhythm...", Some("Live Rep Count: 32")),
    stage(
        "Analyzing form for deviations...",
        Some("Deviations Found: 2"),
    ),
    stage("Finalizing valid rep count...", Some("Final Valid Reps: 45")),
];

const SPRINT_STAGES: [AnalysisStage; 6] = [
    stage("Initializing motion tracking model...", None),
    stage("Detecting start and finish lines from frame...", None),
    stage("Waiting for runner's first movement...", Some("Ready...")),
    stage("Runner detected. Timer started.", Some("Time: 1.34s")),
    stage("Tracking runner across the path...", Some("Time: 3.81s")),
    stage(
        "Finish line crossed. Finalizing time...",
        Some("Final Time: 5.72s"),
    ),
];

const PUSHUP_STAGES: [AnalysisStage; 6] = [
    stage("Initializing repetition counting model...", None),
    stage(
        "Identifying key body landmarks (shoulders, elbows, hips)...",
        None,
    ),
    stage(
        "Monitoring elbow angle and chest proximity to floor...",
        Some("Live Rep Count: 12"),
    ),
    stage("Counting valid repetitions...", Some("Live Rep Count: 25")),
    stage(
        "Analyzing form for incomplete reps...",
        Some("Deviations Found: 3"),
    ),
    stage("Finalizing valid rep count...", Some("Final Valid Reps: 32")),
];

const BROAD_JUMP_STAGES: [AnalysisStage; 6] = [
    stage("Initializing pose detection model...", None),
    stage("Scanning video for subject and start line...", None),
    stage("Subject detected. Tracking take-off point.", None),
    stage(
        "Analyzing jump trajectory and landing point...",
        Some("Estimated Distance: 205 cm"),
    ),
    stage("Confirming stable landing...", Some("Landing Confirmed.")),
    stage("Finalizing results...", Some("Calculated Distance: 212 cm")),
];

const MEDICINE_BALL_STAGES: [AnalysisStage; 6] = [
    stage("Initializing object tracking model...", None),
    stage("Scanning video for subject and medicine ball...", None),
    stage("Subject and ball detected. Tracking release point.", None),
    stage(
        "Analyzing ball trajectory and flight path...",
        Some("Estimated Distance: 7.5m"),
    ),
    stage("Detecting landing point...", Some("Landing Confirmed.")),
    stage("Finalizing results...", Some("Calculated Distance: 7.8m")),
];

impl TestType {
    /// How long the camera records once the countdown finishes.
    pub fn recording_duration(&self) -> Duration {
        match self {
            TestType::SitUps | TestType::PushUps => Duration::from_secs(20),
            TestType::Sprint => Duration::from_secs(10),
            TestType::VerticalJump | TestType::BroadJump | TestType::MedicineBallThrow => {
                Duration::from_secs(5)
            }
        }
    }

    pub fn instructions(&self) -> Instructions {
        match self {
            TestType::VerticalJump => Instructions {
                title: "Vertical Jump Instructions",
                steps: &[
                    "Stand sideways to the camera.",
                    "Ensure your entire body is visible in the frame.",
                    "Use a tripod or place your phone on a stable surface, about 2-3 meters away.",
                    "When ready, jump as high as you can from a standing position.",
                    "Land safely. The AI will calculate your jump height.",
                ],
            },
            TestType::SitUps => Instructions {
                title: "Sit-up Test Instructions",
                steps: &[
                    "Lie on your back with your knees bent.",
                    "Place the camera to your side, capturing your full range of motion.",
                    "Use a tripod or place your phone on a stable surface, about 1.5-2 meters away.",
                    "Perform as many sit-ups as you can with correct form.",
                    "The AI will count your reps and check your form.",
                ],
            },
            TestType::Sprint => Instructions {
                title: "40m Sprint Instructions",
                steps: &[
                    "Set up a 40-meter straight running path.",
                    "Use a tripod to place the camera at the finish line, facing the start line.",
                    "Ensure the entire running path is visible in the frame.",
                    "Run from start to finish as fast as you can.",
                    "The AI will automatically start and stop the timer.",
                ],
            },
            TestType::PushUps => Instructions {
                title: "Push-up Test Instructions",
                steps: &[
                    "Use a mini-tripod or place the camera on the floor to your side.",
                    "Ensure your entire body is visible in the frame.",
                    "Start in a high plank position with hands under your shoulders.",
                    "Lower your body until your chest nearly touches the floor.",
                    "Push back up to the starting position for one full rep.",
                    "The AI will count your reps and check for full range of motion.",
                ],
            },
            TestType::BroadJump => Instructions {
                title: "Broad Jump Instructions",
                steps: &[
                    "Use a tripod or place your phone on a stable surface to your side.",
                    "Mark a clear starting line on the ground.",
                    "Ensure the camera can see you at the start and the area you will jump into.",
                    "Stand behind the line and jump as far as you can forward.",
                    "Land with both feet and hold your position. The AI will measure the distance.",
                ],
            },
            TestType::MedicineBallThrow => Instructions {
                title: "Medicine Ball Throw Instructions",
                steps: &[
                    "Use a standard weight medicine ball (e.g., 3kg).",
                    "Use a tripod or place your phone on a stable surface to your side.",
                    "Ensure the camera can see you and the area where the ball will land.",
                    "Hold the ball at your chest and throw it forward as far as you can.",
                    "The AI will track the ball and measure the throw distance.",
                ],
            },
        }
    }

    /// Framing hint shown over the camera preview.
    pub fn guide_text(&self) -> &'static str {
        match self {
            TestType::VerticalJump | TestType::PushUps => {
                "Position your full body (sideways) inside the frame."
            }
            TestType::SitUps => "Lie sideways, keeping your body inside the frame.",
            TestType::Sprint => "Position the start and finish lines inside the frame.",
            TestType::BroadJump => "Stand sideways, with the start line visible in the frame.",
            TestType::MedicineBallThrow => "Stand sideways, with the throwing area in the frame.",
        }
    }

    /// One-line pitch on the test selection screen.
    pub fn description(&self) -> &'static str {
        match self {
            TestType::VerticalJump => {
                "Measure your explosive power by performing a maximum vertical jump."
            }
            TestType::SitUps => "Test your core strength and endurance with the sit-up challenge.",
            TestType::Sprint => "Measure your speed and acceleration over a 40-meter distance.",
            TestType::PushUps => "Assess upper body strength and endurance.",
            TestType::BroadJump => "Test explosive leg power with a standing broad jump.",
            TestType::MedicineBallThrow => {
                "Measure upper-body power with a forward medicine ball throw."
            }
        }
    }

    pub fn analysis_stages(&self) -> &'static [AnalysisStage] {
        match self {
            TestType::VerticalJump => &JUMP_STAGES,
            TestType::SitUps => &SITUP_STAGES,
            TestType::Sprint => &SPRINT_STAGES,
            TestType::PushUps => &PUSHUP_STAGES,
            TestType::BroadJump => &BROAD_JUMP_STAGES,
            TestType::MedicineBallThrow => &MEDICINE_BALL_STAGES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_durations() {
        assert_eq!(TestType::SitUps.recording_duration(), Duration::from_secs(20));
        assert_eq!(TestType::PushUps.recording_duration(), Duration::from_secs(20));
        assert_eq!(TestType::Sprint.recording_duration(), Duration::from_secs(10));
        assert_eq!(TestType::VerticalJump.recording_duration(), Duration::from_secs(5));
        assert_eq!(TestType::BroadJump.recording_duration(), Duration::from_secs(5));
        assert_eq!(
            TestType::MedicineBallThrow.recording_duration(),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_every_test_has_six_stages_ending_in_a_figure() {
        for test_type in TestType::ALL {
            let stages = test_type.analysis_stages();
            assert_eq!(stages.len(), 6, "{}", test_type);
            assert!(stages[0].result.is_none());
            assert!(stages.last().unwrap().result.is_some());
        }
    }

    #[test]
    fn test_instructions_titles_match_test_names() {
        for test_type in TestType::ALL {
            let instructions = test_type.instructions();
            assert!(instructions.title.starts_with(test_type.display_name()));
            assert!(instructions.steps.len() >= 5);
        }
        assert_eq!(TestType::PushUps.instructions().steps.len(), 6);
    }
}
