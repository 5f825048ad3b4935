//! Wait primitive

use std::time::Duration;

use tracing::debug;

pub async fn execute_wait(duration: Duration) {
    debug!(wait_ms = duration.as_millis() as u64, "Executing wait primitive");
    tokio::time::sleep(duration).await;
}
