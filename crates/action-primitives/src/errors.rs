//! Error types for browser session operations

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrowserError {
    /// The host could not create a tab at all
    #[error("Tab creation failed: {0}")]
    TabCreation(String),

    /// No tab has been opened yet in this session
    #[error("No active tab; navigate or search first")]
    NoActiveTab,

    /// Target element could not be located in the active tab
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Injected script raised or returned an unexpected value
    #[error("Script evaluation failed: {0}")]
    Script(String),

    /// Page snapshot could not be captured or decoded
    #[error("Snapshot failed: {0}")]
    Snapshot(String),

    /// Host transport or protocol error
    #[error("Browser host error: {0}")]
    Host(String),
}

impl From<perceiver_extract::ExtractError> for BrowserError {
    fn from(err: perceiver_extract::ExtractError) -> Self {
        BrowserError::Snapshot(err.to_string())
    }
}
