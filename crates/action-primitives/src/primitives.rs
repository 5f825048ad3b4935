//! Browser session trait and its default implementation

mod capture;
mod click;
mod navigate;
mod scroll;
mod type_text;
mod wait;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tabpilot_core_types::{ElementTarget, ScrollDirection, TabId};

use crate::{
    errors::BrowserError,
    ports::TabHost,
    types::{NavigationReport, PageSnapshot, SearchEngine, SessionTimings},
};

/// Operations the execution controller drives a browser with.
///
/// Input primitives act on the most recently opened tab.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Open a new tab at `url` and wait for it to settle
    async fn navigate(&self, url: &str) -> Result<NavigationReport, BrowserError>;

    /// Navigate to the search engine's results page for `query`
    async fn search(&self, query: &str) -> Result<NavigationReport, BrowserError>;

    /// Click an element in the active tab
    async fn click(&self, target: &ElementTarget) -> Result<(), BrowserError>;

    /// Replace an element's value, notifying page scripts
    async fn type_text(&self, target: &ElementTarget, text: &str) -> Result<(), BrowserError>;

    /// Scroll the active tab by most of one viewport
    async fn scroll(&self, direction: ScrollDirection) -> Result<(), BrowserError>;

    /// Pure delay
    async fn wait(&self, duration: Duration);

    /// Capture the active tab's document for extraction
    async fn capture_dom(&self) -> Result<PageSnapshot, BrowserError>;
}

/// Default [`BrowserSession`] over a [`TabHost`].
pub struct DefaultBrowserSession {
    host: Arc<dyn TabHost>,
    timings: SessionTimings,
    engine: SearchEngine,
    active_tab: Mutex<Option<TabId>>,
}

impl DefaultBrowserSession {
    pub fn new(host: Arc<dyn TabHost>) -> Self {
        Self {
            host,
            timings: SessionTimings::default(),
            engine: SearchEngine::default(),
            active_tab: Mutex::new(None),
        }
    }

    pub fn with_timings(mut self, timings: SessionTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_search_engine(mut self, engine: SearchEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn timings(&self) -> SessionTimings {
        self.timings
    }

    pub fn search_engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub(crate) fn host(&self) -> &dyn TabHost {
        self.host.as_ref()
    }

    /// Tab the input primitives currently act on.
    pub fn active_tab(&self) -> Option<TabId> {
        self.active_tab.lock().clone()
    }

    pub(crate) fn set_active_tab(&self, tab: TabId) {
        *self.active_tab.lock() = Some(tab);
    }

    pub(crate) fn require_active_tab(&self) -> Result<TabId, BrowserError> {
        self.active_tab().ok_or(BrowserError::NoActiveTab)
    }

    /// Run an input script and map its `{ ok, reason }` reply.
    pub(crate) async fn run_input_script(
        &self,
        script: &str,
        target: &ElementTarget,
    ) -> Result<(), BrowserError> {
        let tab = self.require_active_tab()?;
        let reply = self.host.evaluate(&tab, script).await?;
        script_reply(&reply, target)
    }
}

fn script_reply(reply: &Value, target: &ElementTarget) -> Result<(), BrowserError> {
    if reply.get("ok").and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }
    match reply.get("reason").and_then(Value::as_str) {
        Some("not_found") => Err(BrowserError::ElementNotFound(target.to_string())),
        Some(reason) => Err(BrowserError::Script(format!("{target}: {reason}"))),
        None => Err(BrowserError::Script(format!(
            "{target}: unexpected script reply {reply}"
        ))),
    }
}

#[async_trait]
impl BrowserSession for DefaultBrowserSession {
    async fn navigate(&self, url: &str) -> Result<NavigationReport, BrowserError> {
        navigate::execute_navigate(self, url).await
    }

    async fn search(&self, query: &str) -> Result<NavigationReport, BrowserError> {
        navigate::execute_search(self, query).await
    }

    async fn click(&self, target: &ElementTarget) -> Result<(), BrowserError> {
        click::execute_click(self, target).await
    }

    async fn type_text(&self, target: &ElementTarget, text: &str) -> Result<(), BrowserError> {
        type_text::execute_type_text(self, target, text).await
    }

    async fn scroll(&self, direction: ScrollDirection) -> Result<(), BrowserError> {
        scroll::execute_scroll(self, direction).await
    }

    async fn wait(&self, duration: Duration) {
        wait::execute_wait(duration).await
    }

    async fn capture_dom(&self) -> Result<PageSnapshot, BrowserError> {
        capture::execute_capture(self).await
    }
}
