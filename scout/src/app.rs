//! Application state: the screen router plus the persisted profile and
//! history.
//!
//! Screens call into [`ScoutApp`] to advance the flow. Finishing a test
//! appends a record to the history and writes it through to storage; every
//! other way back home discards the session.

use crate::config::ConfigError;
use crate::integrity::IntegrityReport;
use crate::persistence::Persistence;
use crate::router::{RouterError, Screen, ScreenRouter};
use crate::transmission::{DataPacket, EncryptionAnimation};
use assessment::{classify, CoachError, PerformanceFeedback, TestRecord, TestResult, TestType, UserProfile};
use capture::CaptureError;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use std::fmt::Display;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Coach(#[from] CoachError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("The data packet is still being encrypted")]
    PacketNotReady,
}

pub type ScoutResult<T> = Result<T, ScoutError>;

pub struct ScoutApp {
    router: ScreenRouter,
    persistence: Persistence,
    profile: UserProfile,
    history: Vec<TestRecord>,
}

impl ScoutApp {
    /// Start on the home screen with whatever profile and history the store holds.
    pub fn new(persistence: Persistence) -> Self {
        let profile = persistence.load_profile();
        let history = persistence.load_history();
        info!(
            "Loaded profile for {} with {} past tests",
            profile.name,
            history.len()
        );
        Self {
            router: ScreenRouter::new(),
            persistence,
            profile,
            history,
        }
    }

    pub fn router(&self) -> &ScreenRouter {
        &self.router
    }

    pub fn screen(&self) -> Screen {
        self.router.screen()
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Newest first.
    pub fn history(&self) -> &[TestRecord] {
        &self.history
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    pub fn select_test(&mut self, test: TestType) -> ScoutResult<()> {
        Ok(self.router.select_test(test)?)
    }

    pub fn recording_complete(&mut self) -> ScoutResult<()> {
        Ok(self.router.start_analysis()?)
    }

    pub fn complete_analysis(&mut self, result: TestResult) -> ScoutResult<()> {
        Ok(self.router.complete_analysis(result)?)
    }

    /// Tier and feedback for the result on screen.
    pub fn feedback(&self) -> Option<PerformanceFeedback> {
        let session = self.router.session();
        Some(classify(session.selected_test?, session.result.as_ref()?))
    }

    pub fn show_integrity(&mut self) -> ScoutResult<()> {
        Ok(self.router.show_integrity()?)
    }

    pub fn integrity_report(&self) -> Option<IntegrityReport> {
        let session = self.router.session();
        Some(IntegrityReport::new(
            session.selected_test?,
            session.result.as_ref()?,
            session.deepfake_detected,
        ))
    }

    pub fn set_deepfake(&mut self, detected: bool) -> ScoutResult<()> {
        Ok(self.router.set_deepfake(detected)?)
    }

    /// Move to the transmission screen and build the packet it shows.
    pub fn prepare_transmission(&mut self, at: DateTime<Utc>) -> ScoutResult<DataPacket> {
        self.router.prepare_transmission()?;
        let result = self
            .router
            .session()
            .result
            .ok_or(RouterError::MissingSession { what: "result" })?;
        Ok(DataPacket::new(&result, self.router.is_flagged(), at))
    }

    /// Finish the test: append a record stamped with `now` and return home.
    ///
    /// Only allowed once the encryption animation has finished.
    pub fn finalize_at<Tz>(
        &mut self,
        animation: &EncryptionAnimation,
        now: DateTime<Tz>,
    ) -> ScoutResult<TestRecord>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        if self.router.screen() == Screen::Transmission && !animation.can_finish() {
            return Err(ScoutError::PacketNotReady);
        }
        let completed = self.router.finish()?;

        let record = TestRecord::new(
            now.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            now.format("%-d/%-m/%Y").to_string(),
            completed.result,
        );
        info!("Recorded {} result: {}", completed.test, completed.result.summary());

        self.history.insert(0, record.clone());
        self.persistence.save_history(&self.history);
        Ok(record)
    }

    /// Abandon the current test, if any. Nothing is recorded.
    pub fn go_home(&mut self) {
        self.router.go_home();
    }

    pub fn open_profile(&mut self) -> ScoutResult<()> {
        Ok(self.router.open_profile()?)
    }

    /// Replace the profile. Only the profile screen edits it.
    pub fn update_profile(&mut self, profile: UserProfile) -> ScoutResult<()> {
        if self.router.screen() != Screen::UserProfile {
            return Err(RouterError::ActionUnavailable {
                action: "Profile editing",
                screen: self.router.screen(),
            }
            .into());
        }
        info!("Updating profile: {} ({})", profile.name, profile.sport);
        self.profile = profile;
        self.persistence.save_profile(&self.profile);
        Ok(())
    }
}
