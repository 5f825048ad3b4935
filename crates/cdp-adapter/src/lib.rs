//! Chromium implementation of the browser session's tab host.
//!
//! Launches a browser through `chromiumoxide`, keeps one DevTools page per
//! opened tab and evaluates injected scripts in them.

pub mod config;
pub mod host;

pub use config::{detect_chrome_executable, launch_args, ChromiumConfig};
pub use host::ChromiumTabHost;
