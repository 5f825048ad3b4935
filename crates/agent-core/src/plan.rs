//! Step model: typed actions produced by the compiler.

use std::fmt;

use serde::{Deserialize, Serialize};
use tabpilot_core_types::{ElementTarget, OutputFormat, ScrollDirection, SelectorHint};

/// Kind-specific parameters of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepAction {
    Navigate { url: String },
    Search { query: String },
    Extract { hint: SelectorHint },
    Click { target: ElementTarget },
    Type { target: ElementTarget, text: String },
    Scroll { direction: ScrollDirection },
    Wait { duration_ms: u64 },
    ProduceOutput { format: OutputFormat },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Navigate,
    Search,
    Extract,
    Click,
    Type,
    Scroll,
    Wait,
    ProduceOutput,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Navigate => "navigate",
            StepKind::Search => "search",
            StepKind::Extract => "extract",
            StepKind::Click => "click",
            StepKind::Type => "type",
            StepKind::Scroll => "scroll",
            StepKind::Wait => "wait",
            StepKind::ProduceOutput => "produce_output",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One executable step. Immutable once compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub description: String,
    #[serde(flatten)]
    pub action: StepAction,
}

impl Step {
    pub fn new(description: impl Into<String>, action: StepAction) -> Self {
        Self {
            description: description.into(),
            action,
        }
    }

    pub fn kind(&self) -> StepKind {
        match self.action {
            StepAction::Navigate { .. } => StepKind::Navigate,
            StepAction::Search { .. } => StepKind::Search,
            StepAction::Extract { .. } => StepKind::Extract,
            StepAction::Click { .. } => StepKind::Click,
            StepAction::Type { .. } => StepKind::Type,
            StepAction::Scroll { .. } => StepKind::Scroll,
            StepAction::Wait { .. } => StepKind::Wait,
            StepAction::ProduceOutput { .. } => StepKind::ProduceOutput,
        }
    }

    /// Whether executing this step opens a tab.
    pub fn opens_tab(&self) -> bool {
        matches!(self.kind(), StepKind::Navigate | StepKind::Search)
    }
}

/// A compiled step plus its back-reference into the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledStep {
    pub step: Step,
    /// Plan step whose progress this step reports.
    pub plan_index: usize,
    /// Plan steps with no executable meaning of their own that are reported
    /// done together with this step.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub also_satisfies: Vec<usize>,
    /// Inserted by the compiler rather than derived from a plan step.
    #[serde(default)]
    pub synthesized: bool,
}

impl CompiledStep {
    pub fn new(step: Step, plan_index: usize) -> Self {
        Self {
            step,
            plan_index,
            also_satisfies: Vec::new(),
            synthesized: false,
        }
    }

    pub fn synthesized(step: Step, plan_index: usize) -> Self {
        Self {
            synthesized: true,
            ..Self::new(step, plan_index)
        }
    }

    /// Every plan index this step reports to, own index first.
    pub fn plan_indices(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.plan_index).chain(self.also_satisfies.iter().copied())
    }
}

/// Output of the plan compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledPlan {
    pub steps: Vec<CompiledStep>,
    /// Number of plan steps the compiler was given.
    pub plan_len: usize,
}

impl CompiledPlan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn kinds(&self) -> Vec<StepKind> {
        self.steps.iter().map(|entry| entry.step.kind()).collect()
    }

    pub fn plan_index_of(&self, compiled_index: usize) -> Option<usize> {
        self.steps.get(compiled_index).map(|entry| entry.plan_index)
    }

    /// `(compiled_index, plan_index)` pairs, one per reported plan index.
    pub fn index_map(&self) -> Vec<(usize, usize)> {
        self.steps
            .iter()
            .enumerate()
            .flat_map(|(compiled, entry)| entry.plan_indices().map(move |plan| (compiled, plan)))
            .collect()
    }
}
