use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The page snapshot could not be decoded into a node tree.
    #[error("invalid DOM snapshot: {0}")]
    InvalidSnapshot(String),
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        ExtractError::InvalidSnapshot(err.to_string())
    }
}
