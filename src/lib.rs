//! TabPilot library
//!
//! Exposes the CLI and its supporting modules for integration testing

pub mod cli;
pub mod config;
pub mod download;

pub use config::{load_config, Config, LoadedConfig};
pub use download::FileDownloadSink;
