//! [`TabHost`] backed by a launched Chromium instance.

use std::fs;
use std::hash::Hash;

use action_primitives::{BrowserError, TabHost};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use dashmap::DashMap;
use futures::StreamExt;
use serde_json::Value;
use tabpilot_core_types::TabId;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{launch_args, ChromiumConfig};

pub struct ChromiumTabHost {
    browser: Mutex<Browser>,
    pages: DashMap<TabId, Page>,
    handler: JoinHandle<()>,
}

impl ChromiumTabHost {
    /// Launch the browser and start driving its DevTools connection.
    pub async fn launch(cfg: ChromiumConfig) -> Result<Self, BrowserError> {
        let browser_config = build_browser_config(&cfg)?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|err| BrowserError::Host(format!("failed to launch chromium: {err}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(target: "cdp-adapter", ?err, "devtools handler event error");
                }
            }
            debug!(target: "cdp-adapter", "devtools handler finished");
        });

        info!(target: "cdp-adapter", headless = cfg.headless, "chromium launched");
        Ok(Self {
            browser: Mutex::new(browser),
            pages: DashMap::new(),
            handler,
        })
    }

    fn page(&self, tab: &TabId) -> Result<Page, BrowserError> {
        self.pages
            .get(tab)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BrowserError::Host(format!("unknown tab {tab}")))
    }

    pub fn open_tabs(&self) -> usize {
        self.pages.len()
    }

    /// Close the browser and stop the handler task.
    pub async fn shutdown(self) {
        self.pages.clear();
        let mut browser = self.browser.into_inner();
        if let Err(err) = browser.close().await {
            warn!(target: "cdp-adapter", ?err, "browser close failed");
        }
        if let Err(err) = browser.wait().await {
            warn!(target: "cdp-adapter", ?err, "browser process wait failed");
        }
        self.handler.abort();
    }
}

fn build_browser_config(cfg: &ChromiumConfig) -> Result<BrowserConfig, BrowserError> {
    let profile_dir = cfg
        .resolve_profile_dir()
        .map_err(|err| BrowserError::Host(format!("failed to resolve user-data-dir: {err}")))?;
    fs::create_dir_all(&profile_dir)
        .map_err(|err| BrowserError::Host(format!("failed to ensure user-data-dir: {err}")))?;

    let mut builder = BrowserConfig::builder()
        .request_timeout(cfg.request_timeout())
        .args(launch_args(cfg.headless))
        .user_data_dir(profile_dir);
    if !cfg.headless {
        builder = builder.with_head();
    }
    if let Some(executable) = cfg.resolve_executable() {
        builder = builder.chrome_executable(executable);
    }
    builder
        .build()
        .map_err(|err| BrowserError::Host(format!("browser config error: {err}")))
}

/// Remove and return every entry except `keep`.
fn drain_except<K, V>(map: &DashMap<K, V>, keep: &K) -> Vec<V>
where
    K: Eq + Hash + Clone,
{
    let stale: Vec<K> = map
        .iter()
        .map(|entry| entry.key().clone())
        .filter(|key| key != keep)
        .collect();
    stale
        .into_iter()
        .filter_map(|key| map.remove(&key).map(|(_, value)| value))
        .collect()
}

fn host_error(err: CdpError) -> BrowserError {
    BrowserError::Host(err.to_string())
}

#[async_trait]
impl TabHost for ChromiumTabHost {
    async fn open_tab(&self, url: &str) -> Result<TabId, BrowserError> {
        let page = self
            .browser
            .lock()
            .await
            .new_page(url)
            .await
            .map_err(|err| BrowserError::TabCreation(err.to_string()))?;
        let tab = TabId::new();
        debug!(target: "cdp-adapter", tab = %tab, url = %url, "tab opened");
        self.pages.insert(tab.clone(), page);

        // Only the newest tab is ever driven.
        for stale in drain_except(&self.pages, &tab) {
            if let Err(err) = stale.close().await {
                warn!(target: "cdp-adapter", ?err, "closing previous tab failed");
            }
        }
        Ok(tab)
    }

    async fn wait_for_load(&self, tab: &TabId) -> Result<(), BrowserError> {
        let page = self.page(tab)?;
        page.wait_for_navigation().await.map_err(host_error)?;
        Ok(())
    }

    async fn current_url(&self, tab: &TabId) -> Result<String, BrowserError> {
        let page = self.page(tab)?;
        Ok(page.url().await.map_err(host_error)?.unwrap_or_default())
    }

    async fn evaluate(&self, tab: &TabId, script: &str) -> Result<Value, BrowserError> {
        let page = self.page(tab)?;
        let result = page
            .evaluate(script)
            .await
            .map_err(|err| BrowserError::Script(err.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_a_tab_retires_the_others() {
        let pages = DashMap::new();
        let first = TabId::new();
        let second = TabId::new();
        let newest = TabId::new();
        pages.insert(first, 1);
        pages.insert(second, 2);
        pages.insert(newest.clone(), 3);

        let mut closed = drain_except(&pages, &newest);
        closed.sort();
        assert_eq!(closed, vec![1, 2]);
        assert_eq!(pages.len(), 1);
        assert!(pages.contains_key(&newest));

        assert!(drain_except(&pages, &newest).is_empty());
    }
}
