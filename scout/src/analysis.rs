//! Mocked on-device analysis.
//!
//! The analysis screen steps through a scripted list of stages on a fixed
//! timer and then completes. The numeric result is drawn at random within a
//! plausible range for the test.

use crate::config::{ConfigError, ConfigResult};
use assessment::{AnalysisStage, TestResult, TestType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Timing of the staged analysis animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisTiming {
    /// Delay between consecutive stages.
    pub stage_interval: Duration,
    /// Extra time after the last scheduled stage before completion.
    pub completion_grace: Duration,
}

impl Default for AnalysisTiming {
    fn default() -> Self {
        Self {
            stage_interval: Duration::from_millis(1200),
            completion_grace: Duration::from_millis(500),
        }
    }
}

impl AnalysisTiming {
    pub fn with_stage_interval(mut self, interval: Duration) -> Self {
        self.stage_interval = interval;
        self
    }

    pub fn with_completion_grace(mut self, grace: Duration) -> Self {
        self.completion_grace = grace;
        self
    }

    /// Completion fires `stages * stage_interval + completion_grace` after start.
    pub fn completion_after(&self, stages: usize) -> Duration {
        self.stage_interval * stages as u32 + self.completion_grace
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.stage_interval.is_zero() {
            return Err("Stage interval must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnalysisEvent {
    Stage {
        index: usize,
        stage: AnalysisStage,
        /// `(index + 1) / stages`
        progress: f32,
    },
    Complete,
}

/// Drives the stage script for one test.
#[derive(Debug, Clone)]
pub struct AnalysisRunner {
    test_type: TestType,
    timing: AnalysisTiming,
}

impl AnalysisRunner {
    pub fn new(test_type: TestType, timing: AnalysisTiming) -> ConfigResult<Self> {
        timing.validate().map_err(ConfigError::Invalid)?;
        Ok(Self { test_type, timing })
    }

    pub fn stages(&self) -> &'static [AnalysisStage] {
        self.test_type.analysis_stages()
    }

    pub fn progress(&self, index: usize) -> f32 {
        let len = self.stages().len();
        if len == 0 {
            return 1.0;
        }
        (index + 1).min(len) as f32 / len as f32
    }

    fn stage_event(&self, index: usize) -> AnalysisEvent {
        AnalysisEvent::Stage {
            index,
            stage: self.stages()[index],
            progress: self.progress(index),
        }
    }

    /// Emit the first stage immediately, advance one stage per interval
    /// (holding on the last) and emit [`AnalysisEvent::Complete`] once the
    /// completion time is reached. Dropping the future cancels the run.
    pub async fn run(&self, events: mpsc::UnboundedSender<AnalysisEvent>) {
        let stages = self.stages();
        info!("Analyzing {} ({} stages)", self.test_type, stages.len());

        let start = Instant::now();
        let completion = time::sleep_until(start + self.timing.completion_after(stages.len()));
        tokio::pin!(completion);

        let mut ticker = time::interval_at(start + self.timing.stage_interval, self.timing.stage_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut index = 0;
        if !stages.is_empty() {
            let _ = events.send(self.stage_event(index));
        }

        loop {
            tokio::select! {
                biased;
                _ = &mut completion => break,
                _ = ticker.tick() => {
                    let next = (index + 1).min(stages.len().saturating_sub(1));
                    if next != index {
                        index = next;
                        debug!("Analysis stage {}: {}", index, stages[index].message);
                        let _ = events.send(self.stage_event(index));
                    }
                }
            }
        }

        let _ = events.send(AnalysisEvent::Complete);
    }
}

/// Draws random results in a plausible range for each test.
#[derive(Debug, Clone)]
pub struct MockResultGenerator {
    rng: StdRng,
}

impl Default for MockResultGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResultGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self, test_type: TestType) -> TestResult {
        let rng = &mut self.rng;
        let result = match test_type {
            TestType::VerticalJump => TestResult::vertical_jump(round_to(rng.gen_range(20.0..60.0), 2)),
            TestType::SitUps => TestResult::sit_ups(rng.gen_range(10..50), rng.gen_range(0..5)),
            TestType::Sprint => TestResult::sprint(round_to(rng.gen_range(4.5..6.5), 4)),
            TestType::PushUps => TestResult::push_ups(rng.gen_range(5..35), rng.gen_range(0..6)),
            TestType::BroadJump => TestResult::broad_jump(round_to(rng.gen_range(150.0..250.0), 2)),
            TestType::MedicineBallThrow => {
                TestResult::medicine_ball_throw(round_to(rng.gen_range(3.0..10.0), 4))
            }
        };
        debug!("Generated mock result for {}: {}", test_type, result.summary());
        result
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(rx: &mut mpsc::UnboundedReceiver<AnalysisEvent>) -> Vec<AnalysisEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[test]
    fn test_default_timing() {
        let timing = AnalysisTiming::default();
        assert_eq!(timing.completion_after(6), Duration::from_millis(7700));
        assert!(timing.validate().is_ok());
        assert!(timing
            .with_stage_interval(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_runner_rejects_zero_interval() {
        let timing = AnalysisTiming::default().with_stage_interval(Duration::ZERO);
        assert!(matches!(
            AnalysisRunner::new(TestType::BroadJump, timing),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_progress() {
        let runner = AnalysisRunner::new(TestType::Sprint, AnalysisTiming::default()).unwrap();
        assert_eq!(runner.progress(0), 1.0 / 6.0);
        assert_eq!(runner.progress(5), 1.0);
        assert_eq!(runner.progress(9), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_schedule() {
        let runner = AnalysisRunner::new(TestType::VerticalJump, AnalysisTiming::default()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move { runner.run(tx).await });

        time::sleep(Duration::from_millis(1)).await;
        let first = collect(&mut rx);
        assert_eq!(first.len(), 1);
        assert!(matches!(first[0], AnalysisEvent::Stage { index: 0, .. }));

        time::sleep(Duration::from_millis(2500)).await;
        let indices: Vec<usize> = collect(&mut rx)
            .iter()
            .filter_map(|e| match e {
                AnalysisEvent::Stage { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![1, 2]);

        time::sleep(Duration::from_millis(5100)).await;
        let indices: Vec<usize> = collect(&mut rx)
            .iter()
            .filter_map(|e| match e {
                AnalysisEvent::Stage { index, .. } => Some(*index),
                AnalysisEvent::Complete => None,
            })
            .collect();
        assert_eq!(indices, vec![3, 4, 5]);

        time::sleep(Duration::from_millis(200)).await;
        handle.await.unwrap();
        // The last stage is held rather than re-emitted.
        assert_eq!(collect(&mut rx), vec![AnalysisEvent::Complete]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_time() {
        let runner = AnalysisRunner::new(TestType::PushUps, AnalysisTiming::default()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();
        runner.run(tx).await;
        assert_eq!(start.elapsed(), Duration::from_millis(7700));

        let events = collect(&mut rx);
        let stages = events
            .iter()
            .filter(|e| matches!(e, AnalysisEvent::Stage { .. }))
            .count();
        assert_eq!(stages, 6);
        assert_eq!(events.last(), Some(&AnalysisEvent::Complete));
    }

    #[test]
    fn test_mock_results_in_range() {
        let mut generator = MockResultGenerator::seeded(7);
        for _ in 0..200 {
            for test_type in TestType::ALL {
                let result = generator.generate(test_type);
                assert_eq!(result.test_type(), test_type);
                match result {
                    TestResult::VerticalJump(j) => assert!((20.0..=60.0).contains(&j.height)),
                    TestResult::SitUps(r) => {
                        assert!((10..=49).contains(&r.count));
                        assert!(r.deviations <= 4);
                    }
                    TestResult::Sprint(s) => assert!((4.5..=6.5).contains(&s.time)),
                    TestResult::PushUps(r) => {
                        assert!((5..=34).contains(&r.count));
                        assert!(r.deviations <= 5);
                    }
                    TestResult::BroadJump(d) => assert!((150.0..=250.0).contains(&d.distance)),
                    TestResult::MedicineBallThrow(d) => assert!((3.0..=10.0).contains(&d.distance)),
                }
            }
        }
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(48.123456, 2), 48.12);
        assert_eq!(round_to(5.123456, 4), 5.1235);

        let mut generator = MockResultGenerator::seeded(42);
        if let TestResult::VerticalJump(j) = generator.generate(TestType::VerticalJump) {
            assert_eq!(round_to(j.height, 2), j.height);
        }
    }

    #[test]
    fn test_seeded_generator_is_reproducible() {
        let mut a = MockResultGenerator::seeded(99);
        let mut b = MockResultGenerator::seeded(99);
        for test_type in TestType::ALL {
            assert_eq!(a.generate(test_type), b.generate(test_type));
        }
    }
}
