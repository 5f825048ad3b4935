//! Per-run execution state

use std::collections::BTreeMap;

use agent_core::{CompiledPlan, CompiledStep};
use output_builder::OutputArtifact;
use perceiver_extract::Record;
use tabpilot_core_types::SessionId;
use tokio_util::sync::CancellationToken;

use crate::types::{RunOutcome, RunState, StepResult};

/// State owned by exactly one run.
///
/// Records only grow during a run and are never shared with another one.
#[derive(Debug)]
pub struct ExecutionSession {
    id: SessionId,
    plan: CompiledPlan,
    state: RunState,
    cursor: usize,
    records: Vec<Record>,
    results: BTreeMap<usize, StepResult>,
    artifact: Option<OutputArtifact>,
    cancel: CancellationToken,
}

impl ExecutionSession {
    pub fn new(plan: CompiledPlan, cancel: CancellationToken) -> Self {
        Self {
            id: SessionId::new(),
            plan,
            state: RunState::Idle,
            cursor: 0,
            records: Vec::new(),
            results: BTreeMap::new(),
            artifact: None,
            cancel,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn set_state(&mut self, state: RunState) {
        self.state = state;
    }

    pub fn plan(&self) -> &CompiledPlan {
        &self.plan
    }

    /// Compiled step the cursor points at, if any remain.
    pub fn current(&self) -> Option<&CompiledStep> {
        self.plan.steps.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Rank the next extracted record receives.
    pub fn next_rank(&self) -> u32 {
        self.records.len() as u32 + 1
    }

    pub fn extend_records(&mut self, records: impl IntoIterator<Item = Record>) {
        self.records.extend(records);
    }

    pub fn set_artifact(&mut self, artifact: OutputArtifact) {
        self.artifact = Some(artifact);
    }

    /// Store `result`, replacing any earlier result for the same plan index.
    pub fn record_result(&mut self, result: StepResult) {
        self.results.insert(result.plan_index, result);
    }

    pub fn into_outcome(self) -> RunOutcome {
        RunOutcome {
            session_id: self.id,
            state: self.state,
            results: self.results.into_values().collect(),
            records: self.records,
            artifact: self.artifact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{Step, StepAction};

    fn plan() -> CompiledPlan {
        CompiledPlan {
            steps: vec![CompiledStep::new(
                Step::new("wait", StepAction::Wait { duration_ms: 10 }),
                0,
            )],
            plan_len: 1,
        }
    }

    #[test]
    fn later_result_replaces_earlier_for_same_plan_index() {
        let mut session = ExecutionSession::new(plan(), CancellationToken::new());
        session.record_result(StepResult::failed(0, 0, "boom"));
        session.record_result(StepResult::succeeded(1, 0, "ok", None));
        let outcome = session.into_outcome();
        assert_eq!(outcome.results.len(), 1);
        assert!(outcome.results[0].success());
        assert_eq!(outcome.results[0].compiled_index, 1);
    }

    #[test]
    fn rank_continues_after_existing_records() {
        let mut session = ExecutionSession::new(plan(), CancellationToken::new());
        assert_eq!(session.next_rank(), 1);
        session.extend_records([Record {
            name: "First".into(),
            url: "https://a.example".into(),
            description: String::new(),
            rank: 1,
        }]);
        assert_eq!(session.next_rank(), 2);
    }
}
