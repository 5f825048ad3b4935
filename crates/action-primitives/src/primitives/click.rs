//! Click primitive

use tabpilot_core_types::ElementTarget;
use tracing::info;

use crate::{errors::BrowserError, primitives::DefaultBrowserSession, scripts};

pub async fn execute_click(
    session: &DefaultBrowserSession,
    target: &ElementTarget,
) -> Result<(), BrowserError> {
    info!(target = %target, "Executing click primitive");
    session
        .run_input_script(&scripts::click(target), target)
        .await
}
