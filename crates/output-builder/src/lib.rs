//! Output stage: renders accumulated records and hands them to the
//! download or spreadsheet collaborator.

mod builder;
pub mod errors;
pub mod ports;
pub mod render;
pub mod rows;

pub use builder::{OutputArtifact, OutputBuilder};
pub use errors::OutputError;
pub use ports::{DownloadSink, SheetHandle, SpreadsheetService};
pub use rows::Rows;
