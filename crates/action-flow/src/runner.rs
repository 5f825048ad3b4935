//! Single-run guard around a [`PlanExecutor`]

use std::sync::Arc;

use agent_core::{AgentError, CompiledPlan, PlanCompiler, PlanRequest};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::errors::FlowError;
use crate::executor::PlanExecutor;
use crate::observer::ProgressObserver;
use crate::types::RunOutcome;

/// Owns the "is a run active" flag for one execution context.
///
/// At most one run is active at a time; [`FlowRunner::stop`] requests
/// cancellation of the active run.
pub struct FlowRunner {
    executor: Arc<dyn PlanExecutor>,
    active: Mutex<Option<CancellationToken>>,
}

struct ActiveRun<'a> {
    slot: &'a Mutex<Option<CancellationToken>>,
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        self.slot.lock().take();
    }
}

impl FlowRunner {
    pub fn new(executor: Arc<dyn PlanExecutor>) -> Self {
        Self {
            executor,
            active: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Run `plan` to completion. Fails fast, without notifying `observer`,
    /// when another run is active.
    pub async fn start(
        &self,
        plan: CompiledPlan,
        observer: &dyn ProgressObserver,
    ) -> Result<RunOutcome, FlowError> {
        let token = {
            let mut active = self.active.lock();
            if active.is_some() {
                return Err(FlowError::AlreadyRunning);
            }
            let token = CancellationToken::new();
            *active = Some(token.clone());
            token
        };
        let _active = ActiveRun { slot: &self.active };
        self.executor.execute(plan, token, observer).await
    }

    /// Compile `request` and run the result. A request that compiles to
    /// nothing still produces a `Failed` outcome.
    pub async fn start_request(
        &self,
        compiler: &(dyn PlanCompiler + Sync),
        request: &PlanRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<RunOutcome, FlowError> {
        let plan = match compiler.compile(request) {
            Ok(plan) => plan,
            Err(AgentError::EmptyPlan) => CompiledPlan {
                steps: Vec::new(),
                plan_len: request.steps.len(),
            },
            Err(err) => return Err(err.into()),
        };
        self.start(plan, observer).await
    }

    /// Request cancellation of the active run. Returns whether one existed.
    pub fn stop(&self) -> bool {
        match self.active.lock().as_ref() {
            Some(token) => {
                info!("Stop requested");
                token.cancel();
                true
            }
            None => false,
        }
    }
}
