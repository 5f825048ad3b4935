//! Flow execution error types

use action_primitives::BrowserError;
use agent_core::AgentError;
use output_builder::OutputError;
use thiserror::Error;

/// Flow execution errors
#[derive(Debug, Error)]
pub enum FlowError {
    /// Another run is active in this context
    #[error("a plan is already running; stop it before starting another")]
    AlreadyRunning,

    /// Plan could not be compiled
    #[error("plan compilation failed: {0}")]
    Compile(String),

    /// Browser session error raised by a step
    #[error("{0}")]
    Browser(#[from] BrowserError),

    /// Output stage error raised by a step
    #[error("{0}")]
    Output(#[from] OutputError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AgentError> for FlowError {
    fn from(err: AgentError) -> Self {
        FlowError::Compile(err.to_string())
    }
}
