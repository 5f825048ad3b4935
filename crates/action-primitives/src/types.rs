//! Core types for the browser session adapter

use std::time::Duration;

use perceiver_extract::DomNode;
use serde::{Deserialize, Serialize};

/// Timing knobs applied to every navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    /// Upper bound on waiting for a tab to report load completion
    pub load_timeout: Duration,
    /// Extra quiet period after load for late-rendering content
    pub settle_delay: Duration,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_millis(15_000),
            settle_delay: Duration::from_millis(1_500),
        }
    }
}

/// Search engine used by [`crate::BrowserSession::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEngine {
    /// URL prefix the encoded query is appended to
    pub base_url: String,
    /// Query parameter that must survive the navigation
    pub query_param: String,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com/search?q=".to_string(),
            query_param: "q".to_string(),
        }
    }
}

impl SearchEngine {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Results-page URL for `query`.
    pub fn results_url(&self, query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
        format!("{}{}", self.base_url, encoded)
    }
}

/// What a navigation actually achieved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationReport {
    /// URL requested by the caller
    pub requested_url: String,
    /// URL the tab reports after loading, or the requested one if unknown
    pub final_url: String,
    /// Whether the load completed inside the timeout
    pub settled: bool,
    /// Non-fatal problems observed along the way
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl NavigationReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Detached copy of the active tab's document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub url: String,
    pub root: DomNode,
}
