//! Execution controller: walks a compiled plan one step at a time

use std::sync::Arc;

use action_primitives::BrowserSession;
use agent_core::{CompiledPlan, CompiledStep, Step, StepAction};
use async_trait::async_trait;
use output_builder::OutputBuilder;
use perceiver_extract::{ExtractOptions, ExtractOutcome};
use serde_json::Value;
use tabpilot_core_types::{OutputFormat, ScrollDirection, SelectorHint};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::FlowError;
use crate::observer::ProgressObserver;
use crate::session::ExecutionSession;
use crate::types::{FlowConfig, RunOutcome, RunState, StepResult};

/// Plan executor trait
#[async_trait]
pub trait PlanExecutor: Send + Sync {
    /// Execute every compiled step in order.
    ///
    /// A failing step is reported and the run moves on. Cancellation is
    /// honoured between steps only. A plan without steps ends `Failed`
    /// straight from `Idle`.
    async fn execute(
        &self,
        plan: CompiledPlan,
        cancel: CancellationToken,
        observer: &dyn ProgressObserver,
    ) -> Result<RunOutcome, FlowError>;
}

/// What a successful step reports.
struct StepOutput {
    message: String,
    payload: Option<Value>,
}

impl StepOutput {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
        }
    }

    fn with_payload(mut self, payload: Option<Value>) -> Self {
        self.payload = payload;
        self
    }
}

/// Default plan executor over a [`BrowserSession`] and an [`OutputBuilder`].
pub struct DefaultPlanExecutor {
    browser: Arc<dyn BrowserSession>,
    output: OutputBuilder,
    config: FlowConfig,
}

impl DefaultPlanExecutor {
    pub fn new(browser: Arc<dyn BrowserSession>, output: OutputBuilder) -> Self {
        Self {
            browser,
            output,
            config: FlowConfig::default(),
        }
    }

    pub fn with_config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Emit `result` for every plan index `entry` reports to.
    fn report(
        session: &mut ExecutionSession,
        entry: &CompiledStep,
        result: StepResult,
        observer: &dyn ProgressObserver,
    ) {
        for plan_index in entry.plan_indices() {
            let reported = result.for_plan_index(plan_index);
            observer.on_step_result(&reported);
            session.record_result(reported);
        }
    }

    async fn execute_step(
        &self,
        session: &mut ExecutionSession,
        step: &Step,
    ) -> Result<StepOutput, FlowError> {
        match &step.action {
            StepAction::Navigate { url } => {
                let report = self.browser.navigate(url).await?;
                let mut message = format!("Opened {}", report.final_url);
                if !report.settled {
                    message.push_str(" (page was still loading)");
                }
                for warning in &report.warnings {
                    message.push_str(&format!("; {warning}"));
                }
                Ok(StepOutput::message(message).with_payload(serde_json::to_value(&report).ok()))
            }
            StepAction::Search { query } => {
                let report = self.browser.search(query).await?;
                let mut message = format!("Searched for \"{query}\"");
                for warning in &report.warnings {
                    message.push_str(&format!("; {warning}"));
                }
                Ok(StepOutput::message(message).with_payload(serde_json::to_value(&report).ok()))
            }
            StepAction::Extract { hint } => self.run_extract(session, *hint).await,
            StepAction::Click { target } => {
                self.browser.click(target).await?;
                Ok(StepOutput::message(format!("Clicked {target}")))
            }
            StepAction::Type { target, text } => {
                self.browser.type_text(target, text).await?;
                Ok(StepOutput::message(format!("Typed \"{text}\" into {target}")))
            }
            StepAction::Scroll { direction } => {
                self.browser.scroll(*direction).await?;
                let label = match direction {
                    ScrollDirection::Down => "down",
                    ScrollDirection::Up => "up",
                };
                Ok(StepOutput::message(format!("Scrolled {label}")))
            }
            StepAction::Wait { duration_ms } => {
                self.browser
                    .wait(std::time::Duration::from_millis(*duration_ms))
                    .await;
                Ok(StepOutput::message(format!("Waited {duration_ms}ms")))
            }
            StepAction::ProduceOutput { format } => self.run_output(session, *format).await,
        }
    }

    async fn run_extract(
        &self,
        session: &mut ExecutionSession,
        hint: SelectorHint,
    ) -> Result<StepOutput, FlowError> {
        let first_rank = session.next_rank();
        let mut outcome = self.extract_once(hint, first_rank).await?;
        if outcome.records.is_empty() && hint.is_search_results() {
            debug!(
                delay_ms = self.config.extraction_retry_delay.as_millis() as u64,
                "no records found; retrying extraction once"
            );
            tokio::time::sleep(self.config.extraction_retry_delay).await;
            outcome = self.extract_once(hint, first_rank).await?;
        }

        let count = outcome.records.len();
        let payload = serde_json::to_value(&outcome.records).ok();
        session.extend_records(outcome.records);
        let message = match (count, outcome.strategy) {
            (0, _) => "No matching results found on this page".to_string(),
            (n, Some(strategy)) => format!("Extracted {n} records ({strategy})"),
            (n, None) => format!("Extracted {n} records"),
        };
        info!(count, total = session.records().len(), "extraction finished");
        Ok(StepOutput::message(message).with_payload(payload))
    }

    async fn extract_once(
        &self,
        hint: SelectorHint,
        first_rank: u32,
    ) -> Result<ExtractOutcome, FlowError> {
        let snapshot = self.browser.capture_dom().await?;
        let options = ExtractOptions {
            max_results: self.config.max_results,
            ..ExtractOptions::default()
        }
        .with_first_rank(first_rank)
        .with_page_url(snapshot.url.clone());
        Ok(perceiver_extract::extract(&snapshot.root, hint, &options))
    }

    async fn run_output(
        &self,
        session: &mut ExecutionSession,
        format: OutputFormat,
    ) -> Result<StepOutput, FlowError> {
        let artifact = self.output.build(format, session.records()).await?;
        let message = artifact.summary();
        let payload = serde_json::to_value(&artifact).ok();
        session.set_artifact(artifact);
        Ok(StepOutput::message(message).with_payload(payload))
    }
}

#[async_trait]
impl PlanExecutor for DefaultPlanExecutor {
    async fn execute(
        &self,
        plan: CompiledPlan,
        cancel: CancellationToken,
        observer: &dyn ProgressObserver,
    ) -> Result<RunOutcome, FlowError> {
        let mut session = ExecutionSession::new(plan, cancel.clone());
        if session.plan().is_empty() {
            warn!(session = %session.id().0, "Plan has no executable steps");
            session.set_state(RunState::Failed);
            let outcome = session.into_outcome();
            observer.on_done(&outcome);
            return Ok(outcome);
        }

        session.set_state(RunState::Running);
        info!(
            session = %session.id().0,
            steps = session.plan().len(),
            "Starting plan execution"
        );

        while let Some(entry) = session.current().cloned() {
            let compiled_index = session.cursor();

            if session.is_cancelled() {
                info!(compiled_index, "Run stopped before step");
                let result = StepResult::stopped(compiled_index, entry.plan_index);
                Self::report(&mut session, &entry, result, observer);
                session.set_state(RunState::Stopped);
                break;
            }

            debug!(
                compiled_index,
                plan_index = entry.plan_index,
                kind = %entry.step.kind(),
                description = %entry.step.description,
                "Executing step"
            );
            let result = match self.execute_step(&mut session, &entry.step).await {
                Ok(output) => StepResult::succeeded(
                    compiled_index,
                    entry.plan_index,
                    output.message,
                    output.payload,
                ),
                Err(err) => {
                    warn!(compiled_index, kind = %entry.step.kind(), error = %err, "Step failed");
                    StepResult::failed(compiled_index, entry.plan_index, err.to_string())
                }
            };
            Self::report(&mut session, &entry, result, observer);
            session.advance();

            if session.current().is_some() && !self.config.step_pacing.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.step_pacing) => {}
                    _ = cancel.cancelled() => {}
                }
            }
        }

        if session.state() == RunState::Running {
            session.set_state(RunState::Completed);
        }
        let outcome = session.into_outcome();
        info!(
            state = %outcome.state,
            records = outcome.records.len(),
            failed = outcome.failed_steps(),
            "Plan execution finished"
        );
        observer.on_done(&outcome);
        Ok(outcome)
    }
}
