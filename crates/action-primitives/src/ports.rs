//! Port implemented by the concrete browser host.

use async_trait::async_trait;
use serde_json::Value;
use tabpilot_core_types::TabId;

use crate::errors::BrowserError;

/// Minimal capability surface a browser must expose.
///
/// Everything above this trait (timeouts, settle delays, search
/// verification, synthetic input) lives in [`crate::DefaultBrowserSession`].
#[async_trait]
pub trait TabHost: Send + Sync {
    /// Open a new tab and start loading `url`.
    async fn open_tab(&self, url: &str) -> Result<TabId, BrowserError>;

    /// Resolve once the tab reports its navigation as complete.
    async fn wait_for_load(&self, tab: &TabId) -> Result<(), BrowserError>;

    /// URL currently loaded in the tab.
    async fn current_url(&self, tab: &TabId) -> Result<String, BrowserError>;

    /// Evaluate `script` in the tab's document and return its JSON value.
    async fn evaluate(&self, tab: &TabId, script: &str) -> Result<Value, BrowserError>;
}
