//! Type text primitive

use tabpilot_core_types::ElementTarget;
use tracing::info;

use crate::{errors::BrowserError, primitives::DefaultBrowserSession, scripts};

/// Replace the target's value with `text`.
///
/// The script fires `input` and `change` after assignment so listeners
/// attached by the page see the new value.
pub async fn execute_type_text(
    session: &DefaultBrowserSession,
    target: &ElementTarget,
    text: &str,
) -> Result<(), BrowserError> {
    info!(target = %target, text_len = text.len(), "Executing type_text primitive");
    session
        .run_input_script(&scripts::type_text(target, text), target)
        .await
}
