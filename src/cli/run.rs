use std::path::PathBuf;
use std::sync::Arc;

use action_flow::{DefaultPlanExecutor, FlowRunner};
use action_primitives::{BrowserSession, DefaultBrowserSession, TabHost};
use anyhow::{Context, Result};
use cdp_adapter::ChromiumTabHost;
use clap::Args;
use output_builder::OutputBuilder;
use tabpilot_core_types::OutputFormat;
use tracing::{info, warn};

use super::compile::{compile_request, read_plan};
use super::output::ConsoleObserver;
use crate::config::Config;
use crate::download::FileDownloadSink;

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Plan file (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    pub plan: PathBuf,

    /// Override the plan's output format
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Stream progress as JSON lines
    #[arg(long)]
    pub json: bool,
}

pub async fn cmd_run(args: RunArgs, config: &Config) -> Result<()> {
    let request = read_plan(&args.plan, args.format).await?;
    // Compile before launching anything so an empty plan never starts.
    let plan = compile_request(&request, config)?;

    let mut chromium = config.chromium();
    if args.headful {
        chromium.headless = false;
    }
    let host = Arc::new(
        ChromiumTabHost::launch(chromium)
            .await
            .context("Failed to launch Chromium")?,
    );

    let tab_host: Arc<dyn TabHost> = host.clone();
    let browser: Arc<dyn BrowserSession> = Arc::new(
        DefaultBrowserSession::new(tab_host)
            .with_timings(config.session_timings())
            .with_search_engine(config.search_engine()),
    );
    let output = OutputBuilder::new()
        .with_download_sink(Arc::new(FileDownloadSink::new(&config.output.directory)))
        .with_filename_prefix(config.output.filename_prefix.clone())
        .with_title(request.intent.clone());
    let executor = DefaultPlanExecutor::new(browser, output).with_config(config.flow());
    let runner = Arc::new(FlowRunner::new(Arc::new(executor)));

    let interrupt = tokio::spawn({
        let runner = runner.clone();
        async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if runner.stop() {
                    warn!("Interrupt received; stopping after the current step");
                }
            }
        }
    });

    let observer = ConsoleObserver::new(plan.plan_len, args.json);
    let outcome = runner.start(plan, &observer).await;

    interrupt.abort();
    let _ = interrupt.await;
    drop(runner);
    match Arc::try_unwrap(host) {
        Ok(host) => host.shutdown().await,
        Err(_) => warn!("browser still referenced; leaving it to exit with the process"),
    }

    let outcome = outcome.context("Plan execution failed")?;
    info!(
        state = %outcome.state,
        records = outcome.records.len(),
        "run finished"
    );
    Ok(())
}
