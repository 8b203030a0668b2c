//! Run state models
//!
//! Recomputed on every run and returned to the caller. Nothing here is persisted.

use crate::core::module::StepKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run has not started
    Pending,
    /// Run is in progress
    Running,
    /// Every module finished without a fatal failure
    Completed,
    /// A fatal failure aborted the run
    Failed,
    /// The build file asked to skip the run
    Skipped,
}

/// Result of a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Success,
    /// The failure aborted the run
    FailedFatal { error: String },
    /// The failure was downgraded to a warning
    FailedNonFatal { error: String },
    /// The step had nothing to do
    Skipped { reason: String },
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StepOutcome::FailedFatal { .. } | StepOutcome::FailedNonFatal { .. }
        )
    }
}

/// State of a single module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModuleState {
    Pending,
    Running {
        step: StepKind,
        started_at: DateTime<Utc>,
    },
    Completed {
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },
    Aborted {
        step: StepKind,
        error: String,
        aborted_at: DateTime<Utc>,
    },
    /// Module had no enabled steps, or was filtered out
    Skipped {
        reason: String,
    },
}

/// Per-module record of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleReport {
    pub name: String,
    pub state: ModuleState,
    /// Outcome of every step that ran, in run order
    pub steps: Vec<(StepKind, StepOutcome)>,
}

impl ModuleReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: ModuleState::Pending,
            steps: Vec::new(),
        }
    }

    pub fn outcome(&self, kind: StepKind) -> Option<&StepOutcome> {
        self.steps.iter().find(|(k, _)| *k == kind).map(|(_, o)| o)
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run ID
    pub run_id: Uuid,

    pub status: RunStatus,

    pub started_at: Option<DateTime<Utc>>,

    pub completed_at: Option<DateTime<Utc>>,

    /// Modules in declaration order
    pub modules: Vec<ModuleReport>,

    /// The error that aborted the run
    pub failure: Option<String>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: RunStatus::Pending,
            started_at: None,
            completed_at: None,
            modules: Vec::new(),
            failure: None,
        }
    }

    /// Mark the run as started
    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Mark the run as completed
    pub fn complete(&mut self) {
        self.status = RunStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Mark the run as failed
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.failure = Some(error.into());
        self.completed_at = Some(Utc::now());
    }

    pub fn skip(&mut self) {
        self.status = RunStatus::Skipped;
        self.completed_at = Some(Utc::now());
    }

    /// Skipped runs count as successful
    pub fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Completed | RunStatus::Skipped)
    }

    pub fn module(&self, name: &str) -> Option<&ModuleReport> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Number of non-fatal step failures across all modules
    pub fn warning_count(&self) -> usize {
        self.modules
            .iter()
            .flat_map(|m| m.steps.iter())
            .filter(|(_, o)| matches!(o, StepOutcome::FailedNonFatal { .. }))
            .count()
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
