use std::path::{Path, PathBuf};

use agent_core::{AgentError, CompiledPlan, PlanCompiler, PlanRequest, RuleBasedCompiler};
use anyhow::{bail, Context, Result};
use clap::Args;
use tabpilot_core_types::OutputFormat;
use tracing::info;

use super::output::render_compiled_plan;
use crate::config::Config;

#[derive(Args, Clone, Debug)]
pub struct CompileArgs {
    /// Plan file (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    pub plan: PathBuf,

    /// Override the plan's output format
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Print the compiled plan as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn read_plan(path: &Path, format: Option<OutputFormat>) -> Result<PlanRequest> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read plan file {}", path.display()))?;
    let mut request = PlanRequest::from_document(&raw)
        .with_context(|| format!("Failed to parse plan file {}", path.display()))?;
    if let Some(format) = format {
        request.output_format = format;
    }
    Ok(request)
}

/// Compile `request`, turning an empty result into a user-facing error.
pub fn compile_request(request: &PlanRequest, config: &Config) -> Result<CompiledPlan> {
    let compiler = RuleBasedCompiler::new(config.compiler());
    match compiler.compile(request) {
        Ok(plan) => {
            info!(
                plan_steps = plan.plan_len,
                compiled = plan.len(),
                "plan compiled"
            );
            Ok(plan)
        }
        Err(AgentError::EmptyPlan) => {
            bail!("Nothing to run: none of the plan steps maps to a browser action")
        }
        Err(err) => Err(err).context("Failed to compile plan"),
    }
}

pub async fn cmd_compile(args: CompileArgs, config: &Config) -> Result<()> {
    let request = read_plan(&args.plan, args.format).await?;
    let plan = compile_request(&request, config)?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&plan).context("Failed to encode compiled plan")?
        );
    } else {
        print!("{}", render_compiled_plan(&plan));
    }
    Ok(())
}
