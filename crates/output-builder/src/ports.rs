//! Collaborators the output stage delegates delivery to.

use async_trait::async_trait;

use crate::errors::OutputError;

/// Hands a text payload to the user (download prompt, file write, ...).
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Deliver `payload` under `filename`, returning where it ended up.
    async fn trigger_download(&self, payload: &str, filename: &str) -> Result<String, OutputError>;
}

/// Opaque handle issued by a [`SpreadsheetService`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetHandle(pub String);

#[async_trait]
pub trait SpreadsheetService: Send + Sync {
    async fn create_spreadsheet(&self, title: &str) -> Result<SheetHandle, OutputError>;

    async fn write_rows(&self, handle: &SheetHandle, rows: &[Vec<String>]) -> Result<(), OutputError>;

    async fn shareable_url(&self, handle: &SheetHandle) -> Result<String, OutputError>;
}
