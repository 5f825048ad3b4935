use thiserror::Error;

/// Errors emitted by the agent-core crate.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Compilation produced no executable step; the run must not start.
    #[error("plan compiled to zero executable steps")]
    EmptyPlan,

    /// Raised when a plan request is malformed or missing required fields.
    #[error("invalid plan request: {0}")]
    InvalidRequest(String),

    /// Plan document could not be decoded.
    #[error("failed to parse plan document: {0}")]
    Parse(String),
}

impl AgentError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}

impl From<serde_yaml::Error> for AgentError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
