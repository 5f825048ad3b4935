//! Execution controller
//!
//! Walks a compiled plan sequentially against a browser session, carries
//! extracted records forward to the output stage and reports progress per
//! plan index.

pub mod errors;
pub mod executor;
pub mod observer;
pub mod runner;
pub mod session;
pub mod types;

pub use errors::FlowError;
pub use executor::{DefaultPlanExecutor, PlanExecutor};
pub use observer::ProgressObserver;
pub use runner::FlowRunner;
pub use session::ExecutionSession;
pub use types::*;
