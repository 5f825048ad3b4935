//! Step model and plan compiler.
//!
//! Turns the ordered free-text plan produced by the planning collaborator
//! into typed, executable steps, together with the mapping from each
//! compiled step back to the plan step whose progress it reports.

pub mod errors;
pub mod model;
pub mod plan;
pub mod planner;

pub use errors::AgentError;
pub use model::PlanRequest;
pub use plan::{CompiledPlan, CompiledStep, Step, StepAction, StepKind};
pub use planner::{
    classify, compile, derive_search_query, is_discovery_request, Classification,
    CompilerConfig, PlanCompiler, RuleBasedCompiler,
};
