//! Load waiting applied after a tab is opened

use std::time::Duration;

use tabpilot_core_types::TabId;
use tracing::{debug, warn};

use crate::{ports::TabHost, types::SessionTimings};

/// Result of waiting on a freshly opened tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Load completed and the settle delay elapsed
    Settled,
    /// Load did not complete in time; the tab is usable but may be partial
    TimedOut(Duration),
    /// Host reported an error while waiting; treated like a timeout
    Failed(String),
}

impl LoadOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, LoadOutcome::Settled)
    }

    pub fn warning(&self) -> Option<String> {
        match self {
            LoadOutcome::Settled => None,
            LoadOutcome::TimedOut(limit) => Some(format!(
                "page did not finish loading within {}ms",
                limit.as_millis()
            )),
            LoadOutcome::Failed(reason) => Some(format!("page load reported an error: {reason}")),
        }
    }
}

/// Wait for `tab` to load, bounded by the configured timeout.
///
/// Never fails: a slow or broken load resolves as a non-settled outcome so
/// the caller can continue against whatever has rendered.
pub async fn wait_for_settle(host: &dyn TabHost, tab: &TabId, timings: SessionTimings) -> LoadOutcome {
    match tokio::time::timeout(timings.load_timeout, host.wait_for_load(tab)).await {
        Ok(Ok(())) => {
            debug!(tab = %tab, settle_ms = timings.settle_delay.as_millis() as u64, "tab loaded; settling");
            tokio::time::sleep(timings.settle_delay).await;
            LoadOutcome::Settled
        }
        Ok(Err(err)) => {
            warn!(tab = %tab, error = %err, "tab load failed; continuing unsettled");
            LoadOutcome::Failed(err.to_string())
        }
        Err(_) => {
            warn!(
                tab = %tab,
                timeout_ms = timings.load_timeout.as_millis() as u64,
                "tab load timed out; continuing unsettled"
            );
            LoadOutcome::TimedOut(timings.load_timeout)
        }
    }
}
