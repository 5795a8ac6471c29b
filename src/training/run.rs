//! Training run lifecycle

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Status of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is created but not yet started.
    Pending,
    /// Run is currently fitting.
    Running,
    /// Run completed and produced a model.
    Success,
    /// Run failed with an error.
    Failed,
}

impl RunStatus {
    /// Whether the run has finished, successfully or not
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// One execution of the training pipeline.
///
/// Tracks the lifecycle from creation to completion:
///
/// ```text
/// Pending ──start()──> Running ──complete()──> Success
///                         └──────fail()──────> Failed
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingRun {
    run_id: String,
    status: RunStatus,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    error: Option<String>,
}

impl TrainingRun {
    /// Create a run in Pending status.
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            status: RunStatus::Pending,
            started_at: None,
            ended_at: None,
            error: None,
        }
    }

    /// Run with an id derived from the current time (`run-YYYYmmddTHHMMSS`).
    #[must_use]
    pub fn timestamped() -> Self {
        Self::new(format!("run-{}", Utc::now().format("%Y%m%dT%H%M%S")))
    }

    /// Get the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Get the current run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Get the start timestamp, if the run has started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Get the end timestamp, if the run has completed.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Failure message of a failed run
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Wall-clock time between start and end
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        Some(self.ended_at? - self.started_at?)
    }

    /// Start the run, transitioning from Pending to Running.
    ///
    /// Sets the `started_at` timestamp to now.
    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Mark the run successful.
    pub fn complete(&mut self) {
        self.status = RunStatus::Success;
        self.ended_at = Some(Utc::now());
    }

    /// Mark the run failed with `message`.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.error = Some(message.into());
        self.ended_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_default() {
        let run = TrainingRun::new("run-1");
        assert_eq!(run.status(), RunStatus::Pending);
        assert!(run.started_at().is_none());
        assert!(run.duration().is_none());
    }

    #[test]
    fn test_run_lifecycle() {
        let mut run = TrainingRun::new("run-1");
        run.start();
        assert_eq!(run.status(), RunStatus::Running);
        assert!(!run.status().is_terminal());
        run.complete();
        assert_eq!(run.status(), RunStatus::Success);
        assert!(run.status().is_terminal());
        assert!(run.duration().unwrap() >= Duration::zero());
    }

    #[test]
    fn test_run_failure_records_message() {
        let mut run = TrainingRun::new("run-2");
        run.start();
        run.fail("no training rows");
        assert_eq!(run.status(), RunStatus::Failed);
        assert_eq!(run.error(), Some("no training rows"));
    }

    #[test]
    fn test_timestamped_id() {
        assert!(TrainingRun::timestamped().run_id().starts_with("run-20"));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut run = TrainingRun::new("run-3");
        run.start();
        run.complete();
        let json = serde_json::to_string(&run).unwrap();
        let back: TrainingRun = serde_json::from_str(&json).unwrap();
        assert_eq!(run, back);
    }
}
