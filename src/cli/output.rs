//! Console rendering for compiled plans and run progress

use std::io::Write;

use action_flow::{ProgressObserver, RunOutcome, StepResult, StepStatus};
use agent_core::{CompiledPlan, StepAction};
use clap::ValueEnum;
use output_builder::OutputArtifact;
use serde_json::json;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

/// One-line parameter summary of a step.
pub fn describe_action(action: &StepAction) -> String {
    match action {
        StepAction::Navigate { url } => format!("url={url}"),
        StepAction::Search { query } => format!("query=\"{query}\""),
        StepAction::Extract { hint } => format!("hint={hint:?}"),
        StepAction::Click { target } => format!("target={target}"),
        StepAction::Type { target, text } => format!("target={target} text=\"{text}\""),
        StepAction::Scroll { direction } => format!("direction={direction:?}"),
        StepAction::Wait { duration_ms } => format!("duration={duration_ms}ms"),
        StepAction::ProduceOutput { format } => format!("format={format}"),
    }
}

pub fn render_compiled_plan(plan: &CompiledPlan) -> String {
    let mut out = format!(
        "{} plan steps compiled to {} executable steps\n",
        plan.plan_len,
        plan.len()
    );
    for (idx, entry) in plan.steps.iter().enumerate() {
        let mut reports = format!("plan {}", entry.plan_index);
        for extra in &entry.also_satisfies {
            reports.push_str(&format!(",{extra}"));
        }
        out.push_str(&format!(
            "{idx:>3}. {:<15} {:<40} [{reports}]{}\n",
            entry.step.kind().as_str(),
            describe_action(&entry.step.action),
            if entry.synthesized { " (implied)" } else { "" }
        ));
    }
    out
}

/// Prints progress to stdout as it happens.
pub struct ConsoleObserver {
    plan_len: usize,
    json: bool,
}

impl ConsoleObserver {
    pub fn new(plan_len: usize, json: bool) -> Self {
        Self { plan_len, json }
    }

    fn emit(&self, line: String) {
        let mut stdout = std::io::stdout().lock();
        // A closed stdout must not abort the run.
        let _ = writeln!(stdout, "{line}");
    }
}

impl ProgressObserver for ConsoleObserver {
    fn on_step_result(&self, result: &StepResult) {
        if self.json {
            self.emit(json!({ "event": "step", "result": result }).to_string());
            return;
        }
        let marker = match result.status {
            StepStatus::Succeeded => "ok",
            StepStatus::Failed => "FAILED",
            StepStatus::Stopped => "stopped",
        };
        self.emit(format!(
            "[{}/{}] {marker:<7} {}",
            result.plan_index + 1,
            self.plan_len.max(1),
            result.status_message
        ));
    }

    fn on_done(&self, outcome: &RunOutcome) {
        if self.json {
            self.emit(json!({ "event": "done", "outcome": outcome }).to_string());
            return;
        }
        self.emit(format!(
            "Run {}: {} records, {} failed steps",
            outcome.state,
            outcome.records.len(),
            outcome.failed_steps()
        ));
        if let Some(artifact) = &outcome.artifact {
            self.emit(artifact.summary());
            if let OutputArtifact::Inline { content, .. } = artifact {
                self.emit(content.trim_end().to_string());
            }
        }
    }
}
