use clap::Subcommand;

use super::check::CheckArgs;
use super::compile::CompileArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Compile a plan file and show the executable steps
    Compile(CompileArgs),

    /// Compile and execute a plan in a Chromium tab
    Run(RunArgs),

    /// Check one extraction candidate against the validity filter
    Check(CheckArgs),
}
