//! DOM capture for the extraction layer

use perceiver_extract::DomNode;
use tracing::debug;

use crate::{
    errors::BrowserError, primitives::DefaultBrowserSession, scripts, types::PageSnapshot,
};

pub async fn execute_capture(session: &DefaultBrowserSession) -> Result<PageSnapshot, BrowserError> {
    let tab = session.require_active_tab()?;
    let url = session.host().current_url(&tab).await?;
    let value = session.host().evaluate(&tab, &scripts::snapshot()).await?;
    let root = DomNode::from_value(value)?;
    debug!(tab = %tab, url = %url, nodes = root.descendants().count(), "captured dom snapshot");
    Ok(PageSnapshot { url, root })
}
