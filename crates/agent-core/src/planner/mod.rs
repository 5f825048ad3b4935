mod classify;
mod discovery;
mod rule_based;

use tabpilot_core_types::OutputFormat;

use crate::{errors::AgentError, model::PlanRequest, plan::CompiledPlan};

pub use classify::{
    capture_wait_ms, classify, extract_first_url, format_named_in, has_search_phrasing,
    Classification, Rule, DEFAULT_INPUT_SELECTOR, DEFAULT_WAIT_MS, RULES,
};
pub use discovery::{derive_search_query, is_discovery_request};
pub use rule_based::RuleBasedCompiler;

/// Compiler configuration controlling synthesized steps.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Wait inserted between a search and the extraction reading its results.
    pub post_search_wait_ms: u64,
    /// Synthesize a search from the intent for open-ended requests.
    pub discovery_shortcut: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            post_search_wait_ms: 2_000,
            discovery_shortcut: true,
        }
    }
}

/// Trait implemented by compilers turning plan text into executable steps.
pub trait PlanCompiler {
    fn compile(&self, request: &PlanRequest) -> Result<CompiledPlan, AgentError>;
}

/// Compile with the default rule-based compiler.
pub fn compile(
    plan_steps: &[String],
    output_format: OutputFormat,
    intent: &str,
) -> Result<CompiledPlan, AgentError> {
    let request = PlanRequest {
        intent: intent.to_string(),
        output_format,
        steps: plan_steps.to_vec(),
    };
    RuleBasedCompiler::new(CompilerConfig::default()).compile(&request)
}
