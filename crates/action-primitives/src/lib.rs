//! Browser session adapter
//!
//! The only layer that talks to a browser. Tab creation, load waiting and
//! script evaluation go through the [`TabHost`] port so a fake host can
//! stand in during tests; [`DefaultBrowserSession`] adds load timeouts,
//! settle delays, search verification and synthetic input on top.

pub mod errors;
pub mod ports;
mod primitives;
pub mod scripts;
pub mod types;
mod waiting;

pub use errors::*;
pub use ports::TabHost;
pub use primitives::*;
pub use types::*;
pub use waiting::*;
