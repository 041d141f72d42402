//! Readiness predicate gating the automatic recording start.
//!
//! Low light is either measured from the preview or simulated; distance and
//! shake are simulated only. Recording may start only while every blocker is
//! clear.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceWarning {
    #[default]
    Ok,
    Close,
    Far,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessConditions {
    pub camera_ready: bool,
    pub error: Option<String>,
    /// Set by brightness sampling.
    pub measured_low_light: bool,
    pub simulated_low_light: bool,
    pub distance: DistanceWarning,
    pub simulated_shake: bool,
}

impl ReadinessConditions {
    pub fn low_light_warning(&self) -> bool {
        self.measured_low_light || self.simulated_low_light
    }

    pub fn distance_warning(&self) -> bool {
        self.distance != DistanceWarning::Ok
    }

    pub fn shake_warning(&self) -> bool {
        self.simulated_shake
    }

    /// True only when the camera is up, nothing failed and no warning is showing.
    pub fn is_optimal(&self) -> bool {
        self.camera_ready
            && self.error.is_none()
            && !self.low_light_warning()
            && !self.distance_warning()
            && !self.shake_warning()
    }

    pub fn checklist(&self) -> [ChecklistItem; 3] {
        [
            ChecklistItem {
                label: "Stable Phone",
                met: !self.shake_warning(),
            },
            ChecklistItem {
                label: "Good Lighting",
                met: !self.low_light_warning(),
            },
            ChecklistItem {
                label: "Correct Position",
                met: !self.distance_warning(),
            },
        ]
    }

    /// Status line under the checklist; nothing until the camera is up.
    pub fn status_text(&self) -> Option<&'static str> {
        if !self.camera_ready {
            return None;
        }
        if self.is_optimal() {
            Some("Hold still, starting automatically...")
        } else {
            Some("Complete the checklist to begin.")
        }
    }

    /// Warning shown on the pose guide overlay, if any.
    pub fn pose_guide_warning(&self) -> Option<&'static str> {
        match self.distance {
            DistanceWarning::Ok => None,
            DistanceWarning::Close => Some("TOO CLOSE"),
            DistanceWarning::Far => Some("TOO FAR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub label: &'static str,
    pub met: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> ReadinessConditions {
        ReadinessConditions {
            camera_ready: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_optimal_only_when_all_clear() {
        assert!(ready().is_optimal());
        assert!(!ReadinessConditions::default().is_optimal());
    }

    #[test]
    fn test_each_blocker_defeats_readiness() {
        let blockers: [fn(&mut ReadinessConditions); 7] = [
            |c: &mut ReadinessConditions| c.camera_ready = false,
            |c: &mut ReadinessConditions| c.error = Some("Failed to start camera.".into()),
            |c: &mut ReadinessConditions| c.measured_low_light = true,
            |c: &mut ReadinessConditions| c.simulated_low_light = true,
            |c: &mut ReadinessConditions| c.distance = DistanceWarning::Close,
            |c: &mut ReadinessConditions| c.distance = DistanceWarning::Far,
            |c: &mut ReadinessConditions| c.simulated_shake = true,
        ];

        for (i, block) in blockers.iter().enumerate() {
            let mut conditions = ready();
            block(&mut conditions);
            assert!(!conditions.is_optimal(), "blocker {} should defeat readiness", i);
        }
    }

    #[test]
    fn test_low_light_sources_are_ored() {
        let mut conditions = ready();
        conditions.measured_low_light = true;
        assert!(conditions.low_light_warning());
        conditions.measured_low_light = false;
        conditions.simulated_low_light = true;
        assert!(conditions.low_light_warning());
    }

    #[test]
    fn test_checklist_and_status() {
        let mut conditions = ready();
        assert!(conditions.checklist().iter().all(|item| item.met));
        assert_eq!(
            conditions.status_text(),
            Some("Hold still, starting automatically...")
        );

        conditions.simulated_shake = true;
        let checklist = conditions.checklist();
        assert_eq!(checklist[0].label, "Stable Phone");
        assert!(!checklist[0].met);
        assert!(checklist[1].met && checklist[2].met);
        assert_eq!(conditions.status_text(), Some("Complete the checklist to begin."));

        assert_eq!(ReadinessConditions::default().status_text(), None);
    }

    #[test]
    fn test_pose_guide_warning() {
        let mut conditions = ready();
        assert_eq!(conditions.pose_guide_warning(), None);
        conditions.distance = DistanceWarning::Close;
        assert_eq!(conditions.pose_guide_warning(), Some("TOO CLOSE"));
        conditions.distance = DistanceWarning::Far;
        assert_eq!(conditions.pose_guide_warning(), Some("TOO FAR"));
    }
}
