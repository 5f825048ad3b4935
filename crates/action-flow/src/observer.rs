//! Progress notifications for whoever started a run

use crate::types::{RunOutcome, StepResult};

/// Receives progress from the controller.
///
/// `on_step_result` fires once per reported plan index of each attempted
/// step. `on_done` fires exactly once per run, after the last result.
pub trait ProgressObserver: Send + Sync {
    fn on_step_result(&self, result: &StepResult);

    fn on_done(&self, outcome: &RunOutcome);
}
