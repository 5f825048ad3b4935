//! Download sink that writes payloads into the output directory

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use output_builder::{DownloadSink, OutputError};
use tracing::info;

pub struct FileDownloadSink {
    directory: PathBuf,
}

impl FileDownloadSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl DownloadSink for FileDownloadSink {
    async fn trigger_download(&self, payload: &str, filename: &str) -> Result<String, OutputError> {
        // Only the final path component is honoured.
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| OutputError::Delivery(format!("invalid filename '{filename}'")))?;
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|err| {
                OutputError::Delivery(format!(
                    "cannot create {}: {err}",
                    self.directory.display()
                ))
            })?;
        let path = self.directory.join(name);
        tokio::fs::write(&path, payload)
            .await
            .map_err(|err| OutputError::Delivery(format!("cannot write {}: {err}", path.display())))?;
        info!(path = %path.display(), bytes = payload.len(), "output written");
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_payload_under_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileDownloadSink::new(dir.path().join("nested"));
        let location = sink
            .trigger_download("\"name\"\n\"x\"\n", "results.csv")
            .await
            .unwrap();
        let written = std::fs::read_to_string(&location).unwrap();
        assert_eq!(written, "\"name\"\n\"x\"\n");
        assert!(location.ends_with("results.csv"));
    }

    #[tokio::test]
    async fn strips_directories_from_filename() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileDownloadSink::new(dir.path());
        let location = sink.trigger_download("x", "../escape.csv").await.unwrap();
        assert_eq!(Path::new(&location), dir.path().join("escape.csv"));
    }
}
