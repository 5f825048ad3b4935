//! Configuration management module
//!
//! YAML configuration with per-section defaults, looked up in the usual
//! places and then overridden from the environment.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use action_flow::FlowConfig;
use action_primitives::{SearchEngine, SessionTimings};
use agent_core::CompilerConfig;
use anyhow::{Context, Result};
use cdp_adapter::ChromiumConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const ENV_HEADLESS: &str = "TABPILOT_HEADLESS";
pub const ENV_CHROME: &str = "TABPILOT_CHROME";
pub const ENV_OUTPUT_DIR: &str = "TABPILOT_OUTPUT_DIR";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserSection,
    pub navigation: NavigationSection,
    pub extraction: ExtractionSection,
    pub execution: ExecutionSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSection {
    pub headless: bool,
    pub executable: Option<PathBuf>,
    pub user_data_dir: PathBuf,
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            user_data_dir: PathBuf::from(".tabpilot/profile"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSection {
    pub timeout_ms: u64,
    pub settle_ms: u64,
    pub search_engine: String,
}

impl Default for NavigationSection {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            settle_ms: 1_500,
            search_engine: "https://www.google.com/search?q=".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSection {
    pub max_results: usize,
    pub retry_delay_ms: u64,
}

impl Default for ExtractionSection {
    fn default() -> Self {
        Self {
            max_results: 10,
            retry_delay_ms: 1_500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSection {
    pub step_pacing_ms: u64,
    pub post_search_wait_ms: u64,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            step_pacing_ms: 500,
            post_search_wait_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub directory: PathBuf,
    pub filename_prefix: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            filename_prefix: "tabpilot-results".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("Failed to parse config file")
    }

    /// Apply `TABPILOT_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = env::var(ENV_HEADLESS) {
            match parse_bool(&raw) {
                Some(headless) => {
                    self.browser.headless = headless;
                    info!(headless, "headless mode overridden from {ENV_HEADLESS}");
                }
                None => warn!(value = %raw, "ignoring invalid {ENV_HEADLESS}"),
            }
        }
        if let Ok(path) = env::var(ENV_CHROME) {
            if !path.trim().is_empty() {
                self.browser.executable = Some(PathBuf::from(path.trim()));
            }
        }
        if let Ok(dir) = env::var(ENV_OUTPUT_DIR) {
            if !dir.trim().is_empty() {
                self.output.directory = PathBuf::from(dir.trim());
            }
        }
    }

    pub fn chromium(&self) -> ChromiumConfig {
        ChromiumConfig {
            executable: self.browser.executable.clone(),
            user_data_dir: self.browser.user_data_dir.clone(),
            headless: self.browser.headless,
            ..ChromiumConfig::default()
        }
    }

    pub fn session_timings(&self) -> SessionTimings {
        SessionTimings {
            load_timeout: Duration::from_millis(self.navigation.timeout_ms),
            settle_delay: Duration::from_millis(self.navigation.settle_ms),
        }
    }

    pub fn search_engine(&self) -> SearchEngine {
        SearchEngine::new(self.navigation.search_engine.clone())
    }

    pub fn compiler(&self) -> CompilerConfig {
        CompilerConfig {
            post_search_wait_ms: self.execution.post_search_wait_ms,
            ..CompilerConfig::default()
        }
    }

    pub fn flow(&self) -> FlowConfig {
        FlowConfig {
            step_pacing: Duration::from_millis(self.execution.step_pacing_ms),
            max_results: self.extraction.max_results,
            extraction_retry_delay: Duration::from_millis(self.extraction.retry_delay_ms),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub struct LoadedConfig {
    pub config: Config,
    /// File the configuration came from, if any was found.
    pub path: Option<PathBuf>,
}

/// Candidate files in lookup order.
pub fn config_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    let mut candidates = vec![PathBuf::from("config/tabpilot.yaml")];
    if let Some(mut dir) = dirs::config_dir() {
        dir.push("tabpilot");
        dir.push("config.yaml");
        candidates.push(dir);
    }
    candidates
}

/// Load configuration: explicit file, then `./config/tabpilot.yaml`, then
/// the user config directory, then defaults. An explicit file must exist.
pub async fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    }

    let mut loaded = LoadedConfig {
        config: Config::default(),
        path: None,
    };
    match config_candidates(explicit).into_iter().find(|path| path.exists()) {
        Some(path) => {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            loaded.config = Config::from_yaml(&content)?;
            info!("Loaded configuration from: {}", path.display());
            loaded.path = Some(path);
        }
        None => warn!("No config file found, using defaults"),
    }
    loaded.config.apply_env_overrides();
    Ok(loaded)
}
