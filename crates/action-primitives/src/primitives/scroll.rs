//! Scroll primitive

use tabpilot_core_types::ScrollDirection;
use tracing::{debug, info};

use crate::{errors::BrowserError, primitives::DefaultBrowserSession, scripts};

pub async fn execute_scroll(
    session: &DefaultBrowserSession,
    direction: ScrollDirection,
) -> Result<(), BrowserError> {
    info!(direction = ?direction, "Executing scroll primitive");
    let tab = session.require_active_tab()?;
    let reply = session
        .host()
        .evaluate(&tab, &scripts::scroll(direction))
        .await?;
    debug!(scroll_y = ?reply.get("y"), "scroll applied");
    Ok(())
}
