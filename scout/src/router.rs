//! Screen router.
//!
//! A finite state machine over the app's screens plus the transient session
//! state of the test in progress. Transitions are requested by the caller;
//! anything outside the allowed graph is rejected and leaves the router
//! untouched.
//!
//! ```text
//! Home -> Instructions -> Analysis -> Results -> Integrity -> Transmission -> Home
//!   \-> UserProfile -> Home
//! any screen -> Home (abandon)
//! ```

use assessment::{TestResult, TestType};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by the screen router
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: Screen, to: Screen },

    #[error("{action} is not available on the {screen} screen")]
    ActionUnavailable { action: &'static str, screen: Screen },

    #[error("No {what} in the current session")]
    MissingSession { what: &'static str },

    #[error("Result for {actual} does not belong to the selected {expected} test")]
    ResultMismatch { expected: TestType, actual: TestType },
}

pub type RouterResult<T> = Result<T, RouterError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Home,
    Instructions,
    Analysis,
    Results,
    Integrity,
    Transmission,
    UserProfile,
}

impl Screen {
    /// Forward edges of the flow. Returning home is handled separately.
    pub fn can_transition_to(self, to: Screen) -> bool {
        matches!(
            (self, to),
            (Screen::Home, Screen::Instructions)
                | (Screen::Home, Screen::UserProfile)
                | (Screen::Instructions, Screen::Analysis)
                | (Screen::Analysis, Screen::Results)
                | (Screen::Results, Screen::Integrity)
                | (Screen::Integrity, Screen::Transmission)
                | (Screen::Transmission, Screen::Home)
                | (Screen::UserProfile, Screen::Home)
        )
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Home => "home",
            Screen::Instructions => "instructions",
            Screen::Analysis => "analysis",
            Screen::Results => "results",
            Screen::Integrity => "integrity",
            Screen::Transmission => "transmission",
            Screen::UserProfile => "profile",
        };
        write!(f, "{}", name)
    }
}

/// State of the test in progress. Cleared whenever the router returns home.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub selected_test: Option<TestType>,
    pub result: Option<TestResult>,
    pub deepfake_detected: bool,
}

impl Session {
    /// Flagged when the deepfake toggle is on or any repetition was rejected.
    pub fn is_flagged(&self) -> bool {
        self.deepfake_detected || self.result.is_some_and(|r| r.has_deviations())
    }
}

/// What the current screen renders, with the session data it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Home,
    Instructions {
        test: TestType,
    },
    Analysis {
        test: TestType,
    },
    Results {
        test: TestType,
        result: TestResult,
    },
    Integrity {
        test: TestType,
        result: TestResult,
        deepfake_detected: bool,
    },
    Transmission {
        test: TestType,
        result: TestResult,
        flagged: bool,
    },
    UserProfile,
}

/// A finished test handed back by [`ScreenRouter::finish`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletedTest {
    pub test: TestType,
    pub result: TestResult,
}

#[derive(Debug, Clone, Default)]
pub struct ScreenRouter {
    screen: Screen,
    session: Session,
}

impl ScreenRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_flagged(&self) -> bool {
        self.session.is_flagged()
    }

    /// The header home button is hidden on Home and during capture.
    pub fn shows_home_button(&self) -> bool {
        !matches!(self.screen, Screen::Home | Screen::Instructions)
    }

    pub fn shows_profile_button(&self) -> bool {
        self.screen == Screen::Home
    }

    /// `None` when the screen needs session data that is absent.
    pub fn view(&self) -> Option<View> {
        let test = self.session.selected_test;
        let result = self.session.result;
        let view = match self.screen {
            Screen::Home => View::Home,
            Screen::UserProfile => View::UserProfile,
            Screen::Instructions => View::Instructions { test: test? },
            Screen::Analysis => View::Analysis { test: test? },
            Screen::Results => View::Results {
                test: test?,
                result: result?,
            },
            Screen::Integrity => View::Integrity {
                test: test?,
                result: result?,
                deepfake_detected: self.session.deepfake_detected,
            },
            Screen::Transmission => View::Transmission {
                test: test?,
                result: result?,
                flagged: self.session.is_flagged(),
            },
        };
        Some(view)
    }

    fn transition_to(&mut self, to: Screen) -> RouterResult<()> {
        if !self.screen.can_transition_to(to) {
            return Err(RouterError::InvalidTransition {
                from: self.screen,
                to,
            });
        }
        debug!("Screen transition: {} -> {}", self.screen, to);
        self.screen = to;
        Ok(())
    }

    fn selected_test(&self) -> RouterResult<TestType> {
        self.session
            .selected_test
            .ok_or(RouterError::MissingSession {
                what: "selected test",
            })
    }

    pub fn select_test(&mut self, test: TestType) -> RouterResult<()> {
        self.transition_to(Screen::Instructions)?;
        info!("Selected {} test", test);
        self.session.selected_test = Some(test);
        Ok(())
    }

    /// Recording finished; move on to the analysis screen.
    pub fn start_analysis(&mut self) -> RouterResult<()> {
        self.selected_test()?;
        self.transition_to(Screen::Analysis)
    }

    pub fn complete_analysis(&mut self, result: TestResult) -> RouterResult<()> {
        let expected = self.selected_test()?;
        if self.screen.can_transition_to(Screen::Results) && result.test_type() != expected {
            return Err(RouterError::ResultMismatch {
                expected,
                actual: result.test_type(),
            });
        }
        self.transition_to(Screen::Results)?;
        self.session.result = Some(result);
        Ok(())
    }

    pub fn show_integrity(&mut self) -> RouterResult<()> {
        self.transition_to(Screen::Integrity)
    }

    pub fn set_deepfake(&mut self, detected: bool) -> RouterResult<()> {
        if self.screen != Screen::Integrity {
            return Err(RouterError::ActionUnavailable {
                action: "Deepfake simulation",
                screen: self.screen,
            });
        }
        self.session.deepfake_detected = detected;
        Ok(())
    }

    pub fn prepare_transmission(&mut self) -> RouterResult<()> {
        self.transition_to(Screen::Transmission)
    }

    /// Leave the transmission screen with the finished test and reset the
    /// session. The caller records it.
    pub fn finish(&mut self) -> RouterResult<CompletedTest> {
        if self.screen != Screen::Transmission {
            return Err(RouterError::InvalidTransition {
                from: self.screen,
                to: Screen::Home,
            });
        }
        let completed = CompletedTest {
            test: self.selected_test()?,
            result: self.session.result.ok_or(RouterError::MissingSession { what: "result" })?,
        };
        self.transition_to(Screen::Home)?;
        self.session = Session::default();
        Ok(completed)
    }

    pub fn open_profile(&mut self) -> RouterResult<()> {
        self.transition_to(Screen::UserProfile)
    }

    /// Abandon whatever is in progress. Always allowed.
    pub fn go_home(&mut self) {
        if self.screen != Screen::Home {
            debug!("Returning home from {}", self.screen);
        }
        self.screen = Screen::Home;
        self.session = Session::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_transmission(result: TestResult) -> ScreenRouter {
        let mut router = ScreenRouter::new();
        router.select_test(result.test_type()).unwrap();
        router.start_analysis().unwrap();
        router.complete_analysis(result).unwrap();
        router.show_integrity().unwrap();
        router.prepare_transmission().unwrap();
        router
    }

    #[test]
    fn test_initial_state() {
        let router = ScreenRouter::new();
        assert_eq!(router.screen(), Screen::Home);
        assert_eq!(router.view(), Some(View::Home));
        assert!(router.shows_profile_button());
        assert!(!router.shows_home_button());
    }

    #[test]
    fn test_full_flow() {
        let result = TestResult::vertical_jump(48.0);
        let mut router = at_transmission(result);
        assert_eq!(
            router.view(),
            Some(View::Transmission {
                test: TestType::VerticalJump,
                result,
                flagged: false
            })
        );

        let completed = router.finish().unwrap();
        assert_eq!(completed.test, TestType::VerticalJump);
        assert_eq!(completed.result, result);
        assert_eq!(router.screen(), Screen::Home);
        assert_eq!(router.session(), &Session::default());
    }

    #[test]
    fn test_invalid_transitions_leave_state_unchanged() {
        let mut router = ScreenRouter::new();
        assert_eq!(
            router.start_analysis(),
            Err(RouterError::MissingSession {
                what: "selected test"
            })
        );
        assert_eq!(
            router.show_integrity(),
            Err(RouterError::InvalidTransition {
                from: Screen::Home,
                to: Screen::Integrity
            })
        );

        router.select_test(TestType::Sprint).unwrap();
        assert!(router.open_profile().is_err());
        assert!(router.select_test(TestType::SitUps).is_err());
        assert!(router.finish().is_err());
        assert_eq!(router.screen(), Screen::Instructions);
        assert_eq!(router.session().selected_test, Some(TestType::Sprint));
    }

    #[test]
    fn test_result_must_match_selected_test() {
        let mut router = ScreenRouter::new();
        router.select_test(TestType::BroadJump).unwrap();
        router.start_analysis().unwrap();

        let err = router
            .complete_analysis(TestResult::medicine_ball_throw(7.5))
            .unwrap_err();
        assert_eq!(
            err,
            RouterError::ResultMismatch {
                expected: TestType::BroadJump,
                actual: TestType::MedicineBallThrow
            }
        );
        assert_eq!(router.screen(), Screen::Analysis);
        assert!(router.session().result.is_none());
    }

    #[test]
    fn test_go_home_resets_session_from_anywhere() {
        let result = TestResult::sit_ups(28, 1);
        let mut router = ScreenRouter::new();
        router.select_test(TestType::SitUps).unwrap();
        router.start_analysis().unwrap();
        router.complete_analysis(result).unwrap();
        router.show_integrity().unwrap();
        router.set_deepfake(true).unwrap();

        router.go_home();
        assert_eq!(router.screen(), Screen::Home);
        assert_eq!(router.session(), &Session::default());

        router.go_home();
        assert_eq!(router.screen(), Screen::Home);
    }

    #[test]
    fn test_profile_round_trip() {
        let mut router = ScreenRouter::new();
        router.open_profile().unwrap();
        assert_eq!(router.view(), Some(View::UserProfile));
        assert!(router.shows_home_button());
        assert!(!router.shows_profile_button());
        assert!(router.select_test(TestType::Sprint).is_err());

        router.go_home();
        assert_eq!(router.screen(), Screen::Home);
    }

    #[test]
    fn test_deepfake_toggle_only_on_integrity() {
        let mut router = ScreenRouter::new();
        router.select_test(TestType::PushUps).unwrap();
        assert_eq!(
            router.set_deepfake(true),
            Err(RouterError::ActionUnavailable {
                action: "Deepfake simulation",
                screen: Screen::Instructions
            })
        );

        router.start_analysis().unwrap();
        router.complete_analysis(TestResult::push_ups(20, 0)).unwrap();
        router.show_integrity().unwrap();
        assert!(!router.is_flagged());
        router.set_deepfake(true).unwrap();
        assert!(router.is_flagged());
        router.set_deepfake(false).unwrap();
        assert!(!router.is_flagged());
    }

    #[test]
    fn test_flagged_by_deviations() {
        let router = at_transmission(TestResult::sit_ups(28, 1));
        assert!(router.is_flagged());

        let router = at_transmission(TestResult::sit_ups(28, 0));
        assert!(!router.is_flagged());
    }

    #[test]
    fn test_header_buttons() {
        let mut router = ScreenRouter::new();
        router.select_test(TestType::VerticalJump).unwrap();
        assert!(!router.shows_home_button());
        assert!(!router.shows_profile_button());

        router.start_analysis().unwrap();
        assert!(router.shows_home_button());
    }

    #[test]
    fn test_transition_table() {
        let screens = [
            Screen::Home,
            Screen::Instructions,
            Screen::Analysis,
            Screen::Results,
            Screen::Integrity,
            Screen::Transmission,
            Screen::UserProfile,
        ];
        let allowed: usize = screens
            .iter()
            .map(|from| screens.iter().filter(|to| from.can_transition_to(**to)).count())
            .sum();
        assert_eq!(allowed, 8);
        assert!(!Screen::UserProfile.can_transition_to(Screen::Instructions));
        assert!(!Screen::Results.can_transition_to(Screen::Analysis));
    }
}
