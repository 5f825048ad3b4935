//! Core types for plan execution

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use output_builder::OutputArtifact;
use perceiver_extract::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabpilot_core_types::SessionId;

/// Outcome of one attempted compiled step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Succeeded,
    Failed,
    Stopped,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StepStatus::Succeeded => "succeeded",
            StepStatus::Failed => "failed",
            StepStatus::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Result of one compiled step, reported against a plan index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub compiled_index: usize,
    pub plan_index: usize,
    pub status: StepStatus,
    pub status_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    pub finished_at: DateTime<Utc>,
}

impl StepResult {
    pub fn succeeded(
        compiled_index: usize,
        plan_index: usize,
        message: impl Into<String>,
        payload: Option<Value>,
    ) -> Self {
        Self {
            compiled_index,
            plan_index,
            status: StepStatus::Succeeded,
            status_message: message.into(),
            error: None,
            payload,
            finished_at: Utc::now(),
        }
    }

    pub fn failed(compiled_index: usize, plan_index: usize, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            compiled_index,
            plan_index,
            status: StepStatus::Failed,
            status_message: format!("Failed: {error}"),
            error: Some(error),
            payload: None,
            finished_at: Utc::now(),
        }
    }

    pub fn stopped(compiled_index: usize, plan_index: usize) -> Self {
        Self {
            compiled_index,
            plan_index,
            status: StepStatus::Stopped,
            status_message: "Stopped before this step started".to_string(),
            error: None,
            payload: None,
            finished_at: Utc::now(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == StepStatus::Succeeded
    }

    /// Same outcome reported against another plan index.
    pub fn for_plan_index(&self, plan_index: usize) -> Self {
        Self {
            plan_index,
            ..self.clone()
        }
    }
}

/// Run lifecycle: Idle, then Running, then one terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Failed,
    Stopped,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed | RunState::Stopped)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
            RunState::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Everything the caller receives once a run ends
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub session_id: SessionId,
    pub state: RunState,
    /// Latest result per plan index, in plan order
    pub results: Vec<StepResult>,
    pub records: Vec<Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<OutputArtifact>,
}

impl RunOutcome {
    pub fn failed_steps(&self) -> usize {
        self.results.iter().filter(|r| r.status == StepStatus::Failed).count()
    }
}

/// Execution tuning
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Pause between steps for observable progress
    pub step_pacing: Duration,
    /// Cap on records per extraction pass
    pub max_results: usize,
    /// Delay before the single retry of an empty extraction
    pub extraction_retry_delay: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            step_pacing: Duration::from_millis(500),
            max_results: 10,
            extraction_retry_delay: Duration::from_millis(1_500),
        }
    }
}
