use std::sync::Arc;

use chrono::Utc;
use perceiver_extract::Record;
use serde::Serialize;
use tabpilot_core_types::OutputFormat;
use tracing::{info, warn};

use crate::errors::OutputError;
use crate::ports::{DownloadSink, SpreadsheetService};
use crate::render::{render_csv, render_table, render_text};
use crate::rows::Rows;

/// What the output stage produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputArtifact {
    /// Delimited text handed to the download collaborator.
    Download {
        filename: String,
        location: String,
        rows: usize,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    /// Spreadsheet created through the spreadsheet collaborator. `rows` is
    /// zero when the write failed but the sheet itself exists.
    Spreadsheet {
        url: String,
        rows: usize,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    /// Rendered in place and returned with the completion payload.
    Inline {
        format: OutputFormat,
        content: String,
        rows: usize,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
}

impl OutputArtifact {
    pub fn warnings(&self) -> &[String] {
        match self {
            OutputArtifact::Download { warnings, .. }
            | OutputArtifact::Spreadsheet { warnings, .. }
            | OutputArtifact::Inline { warnings, .. } => warnings,
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            OutputArtifact::Download { rows, .. }
            | OutputArtifact::Spreadsheet { rows, .. }
            | OutputArtifact::Inline { rows, .. } => *rows,
        }
    }

    /// One-line status for progress reporting.
    pub fn summary(&self) -> String {
        let base = match self {
            OutputArtifact::Download { location, rows, .. } => {
                format!("Saved {rows} rows to {location}")
            }
            OutputArtifact::Spreadsheet { url, rows, .. } => {
                format!("Spreadsheet with {rows} rows: {url}")
            }
            OutputArtifact::Inline { format, rows, .. } => format!("Rendered {rows} rows as {format}"),
        };
        match self.warnings() {
            [] => base,
            warnings => format!("{base} ({})", warnings.join("; ")),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        match &mut self {
            OutputArtifact::Download { warnings, .. }
            | OutputArtifact::Spreadsheet { warnings, .. }
            | OutputArtifact::Inline { warnings, .. } => warnings.push(warning.into()),
        }
        self
    }
}

/// Converts accumulated records into an [`OutputArtifact`].
#[derive(Clone)]
pub struct OutputBuilder {
    download: Option<Arc<dyn DownloadSink>>,
    sheets: Option<Arc<dyn SpreadsheetService>>,
    filename_prefix: String,
    title: String,
}

impl Default for OutputBuilder {
    fn default() -> Self {
        Self {
            download: None,
            sheets: None,
            filename_prefix: "tabpilot-results".to_string(),
            title: "Tabpilot results".to_string(),
        }
    }
}

impl OutputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_download_sink(mut self, sink: Arc<dyn DownloadSink>) -> Self {
        self.download = Some(sink);
        self
    }

    pub fn with_spreadsheet_service(mut self, service: Arc<dyn SpreadsheetService>) -> Self {
        self.sheets = Some(service);
        self
    }

    pub fn with_filename_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.filename_prefix = prefix.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Build output in `format`. Fails with [`OutputError::NoData`] for
    /// every format when `records` is empty.
    pub async fn build(
        &self,
        format: OutputFormat,
        records: &[Record],
    ) -> Result<OutputArtifact, OutputError> {
        if records.is_empty() {
            warn!(%format, "output requested with no records");
            return Err(OutputError::NoData);
        }
        let rows = Rows::from_records(records)?;
        let artifact = match format {
            OutputFormat::Csv => self.deliver_csv(&rows).await?,
            OutputFormat::Sheet => self.deliver_sheet(&rows).await?,
            OutputFormat::Table => OutputArtifact::Inline {
                format,
                content: render_table(&rows),
                rows: rows.len(),
                warnings: Vec::new(),
            },
            OutputFormat::Text => OutputArtifact::Inline {
                format,
                content: render_text(&rows),
                rows: rows.len(),
                warnings: Vec::new(),
            },
        };
        info!(%format, rows = rows.len(), summary = %artifact.summary(), "output built");
        Ok(artifact)
    }

    fn filename(&self) -> String {
        format!(
            "{}-{}.csv",
            self.filename_prefix,
            Utc::now().format("%Y%m%d-%H%M%S")
        )
    }

    async fn deliver_csv(&self, rows: &Rows) -> Result<OutputArtifact, OutputError> {
        let payload = render_csv(rows)?;
        let Some(sink) = &self.download else {
            return Ok(OutputArtifact::Inline {
                format: OutputFormat::Csv,
                content: payload,
                rows: rows.len(),
                warnings: vec!["no download target configured; returning csv inline".to_string()],
            });
        };
        let filename = self.filename();
        let location = sink.trigger_download(&payload, &filename).await?;
        Ok(OutputArtifact::Download {
            filename,
            location,
            rows: rows.len(),
            warnings: Vec::new(),
        })
    }

    /// Spreadsheet path. Creation failure falls back to CSV; a failed write
    /// still surfaces the created sheet.
    async fn deliver_sheet(&self, rows: &Rows) -> Result<OutputArtifact, OutputError> {
        let Some(sheets) = &self.sheets else {
            warn!("no spreadsheet service configured; falling back to csv");
            return Ok(self
                .deliver_csv(rows)
                .await?
                .with_warning("spreadsheet service unavailable; exported csv instead"));
        };

        let handle = match sheets.create_spreadsheet(&self.title).await {
            Ok(handle) => handle,
            Err(err) => {
                warn!(error = %err, "spreadsheet creation failed; falling back to csv");
                return Ok(self
                    .deliver_csv(rows)
                    .await?
                    .with_warning(format!("spreadsheet creation failed ({err}); exported csv instead")));
            }
        };

        let written = sheets.write_rows(&handle, &rows.with_header()).await;
        let url = sheets.shareable_url(&handle).await?;
        match written {
            Ok(()) => Ok(OutputArtifact::Spreadsheet {
                url,
                rows: rows.len(),
                warnings: Vec::new(),
            }),
            Err(err) => {
                warn!(error = %err, url = %url, "writing rows failed; returning empty spreadsheet");
                Ok(OutputArtifact::Spreadsheet {
                    url,
                    rows: 0,
                    warnings: vec![format!("rows could not be written: {err}")],
                })
            }
        }
    }
}
