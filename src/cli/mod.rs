pub mod app;
pub mod check;
pub mod commands;
pub mod compile;
pub mod env;
pub mod output;
pub mod run;
pub mod runtime;

pub use check::{cmd_check, CheckArgs};
pub use compile::{cmd_compile, read_plan, CompileArgs};
pub use run::{cmd_run, RunArgs};
