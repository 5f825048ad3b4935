use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OutputError {
    /// Output requested before any record was collected.
    #[error("no data: nothing was extracted to build output from")]
    NoData,

    /// The download collaborator rejected the payload.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// The spreadsheet collaborator failed.
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Records could not be rendered.
    #[error("encoding failed: {0}")]
    Encode(String),
}

impl From<csv::Error> for OutputError {
    fn from(err: csv::Error) -> Self {
        Self::Encode(err.to_string())
    }
}

impl From<serde_json::Error> for OutputError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err.to_string())
    }
}
