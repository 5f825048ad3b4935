use std::sync::Arc;
use std::time::Duration;

use action_flow::{
    DefaultPlanExecutor, FlowConfig, FlowError, FlowRunner, PlanExecutor, ProgressObserver,
    RunOutcome, RunState, StepResult, StepStatus,
};
use action_primitives::{BrowserError, BrowserSession, NavigationReport, PageSnapshot};
use agent_core::{
    compile, CompiledPlan, CompiledStep, CompilerConfig, PlanRequest, RuleBasedCompiler, Step,
    StepAction,
};
use async_trait::async_trait;
use output_builder::{DownloadSink, OutputArtifact, OutputBuilder, OutputError};
use parking_lot::Mutex;
use perceiver_extract::DomNode;
use tabpilot_core_types::{ElementTarget, OutputFormat, ScrollDirection, SelectorHint};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

const RESULTS_URL: &str = "https://www.google.com/search?q=headphones";

fn results_page(count: usize) -> DomNode {
    let blocks = (1..=count).map(|i| {
        DomNode::element("div").with_attr("data-hveid", "CA").with_children([
            DomNode::element("a")
                .with_attr("href", format!("https://shop{i}.example.com/item"))
                .with_child(DomNode::element("h3").with_text(format!("Headphones deal {i}"))),
            DomNode::element("div")
                .with_class("VwiC3b")
                .with_text(format!("Quiet, \"cheap\" pair {i}")),
        ])
    });
    DomNode::element("body")
        .with_child(DomNode::element("div").with_attr("id", "search").with_children(blocks))
}

struct FakeBrowser {
    calls: Mutex<Vec<String>>,
    results: usize,
    /// Captures that return an empty page before results appear.
    empty_captures: Mutex<usize>,
    fail_click: bool,
    /// When set, navigation blocks until notified.
    gate: Option<Arc<Notify>>,
    current_url: Mutex<String>,
}

impl FakeBrowser {
    fn new(results: usize) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            results,
            empty_captures: Mutex::new(0),
            fail_click: false,
            gate: None,
            current_url: Mutex::new("about:blank".to_string()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }
}

#[async_trait]
impl BrowserSession for FakeBrowser {
    async fn navigate(&self, url: &str) -> Result<NavigationReport, BrowserError> {
        self.log(format!("navigate {url}"));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        *self.current_url.lock() = url.to_string();
        Ok(NavigationReport {
            requested_url: url.to_string(),
            final_url: url.to_string(),
            settled: true,
            warnings: Vec::new(),
        })
    }

    async fn search(&self, query: &str) -> Result<NavigationReport, BrowserError> {
        self.log(format!("search {query}"));
        *self.current_url.lock() = RESULTS_URL.to_string();
        Ok(NavigationReport {
            requested_url: RESULTS_URL.to_string(),
            final_url: RESULTS_URL.to_string(),
            settled: true,
            warnings: Vec::new(),
        })
    }

    async fn click(&self, target: &ElementTarget) -> Result<(), BrowserError> {
        self.log(format!("click {target}"));
        if self.fail_click {
            return Err(BrowserError::ElementNotFound(target.to_string()));
        }
        Ok(())
    }

    async fn type_text(&self, target: &ElementTarget, text: &str) -> Result<(), BrowserError> {
        self.log(format!("type {target} {text}"));
        Ok(())
    }

    async fn scroll(&self, direction: ScrollDirection) -> Result<(), BrowserError> {
        self.log(format!("scroll {direction:?}"));
        Ok(())
    }

    async fn wait(&self, duration: Duration) {
        self.log(format!("wait {}", duration.as_millis()));
        tokio::time::sleep(duration).await;
    }

    async fn capture_dom(&self) -> Result<PageSnapshot, BrowserError> {
        self.log("capture");
        let url = self.current_url.lock().clone();
        let mut empty = self.empty_captures.lock();
        let root = if *empty > 0 {
            *empty -= 1;
            DomNode::element("body")
        } else {
            results_page(self.results)
        };
        Ok(PageSnapshot { url, root })
    }
}

#[derive(Default)]
struct RecordingObserver {
    results: Mutex<Vec<StepResult>>,
    done: Mutex<Vec<RunState>>,
}

impl ProgressObserver for RecordingObserver {
    fn on_step_result(&self, result: &StepResult) {
        self.results.lock().push(result.clone());
    }

    fn on_done(&self, outcome: &RunOutcome) {
        self.done.lock().push(outcome.state);
    }
}

#[derive(Default)]
struct RecordingSink {
    payloads: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl DownloadSink for RecordingSink {
    async fn trigger_download(&self, payload: &str, filename: &str) -> Result<String, OutputError> {
        self.payloads
            .lock()
            .push((filename.to_string(), payload.to_string()));
        Ok(format!("/downloads/{filename}"))
    }
}

fn quick_config() -> FlowConfig {
    FlowConfig {
        step_pacing: Duration::ZERO,
        ..FlowConfig::default()
    }
}

fn executor(browser: Arc<FakeBrowser>, output: OutputBuilder) -> DefaultPlanExecutor {
    let browser: Arc<dyn BrowserSession> = browser;
    DefaultPlanExecutor::new(browser, output).with_config(quick_config())
}

fn plan_of(actions: Vec<StepAction>) -> CompiledPlan {
    let plan_len = actions.len();
    CompiledPlan {
        steps: actions
            .into_iter()
            .enumerate()
            .map(|(idx, action)| CompiledStep::new(Step::new(format!("step {idx}"), action), idx))
            .collect(),
        plan_len,
    }
}

fn steps(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn search_extract_csv_produces_quoted_download() {
    let plan = compile(
        &steps(&[
            "Search for cheap noise-cancelling headphones",
            "Extract results",
            "Create a CSV",
        ]),
        OutputFormat::Csv,
        "find cheap noise-cancelling headphones",
    )
    .unwrap();
    let browser = Arc::new(FakeBrowser::new(3));
    let sink = Arc::new(RecordingSink::default());
    let output = OutputBuilder::new().with_download_sink(sink.clone());
    let observer = RecordingObserver::default();

    let outcome = executor(browser.clone(), output)
        .execute(plan, CancellationToken::new(), &observer)
        .await
        .unwrap();

    assert_eq!(outcome.state, RunState::Completed);
    assert_eq!(outcome.records.len(), 3);
    assert!(outcome.results.iter().all(StepResult::success));
    assert!(matches!(outcome.artifact, Some(OutputArtifact::Download { rows: 3, .. })));

    let payloads = sink.payloads.lock();
    assert_eq!(payloads.len(), 1);
    let lines: Vec<&str> = payloads[0].1.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], r#""name","url","description","rank""#);
    assert_eq!(
        lines[1],
        r#""Headphones deal 1","https://shop1.example.com/item","Quiet, ""cheap"" pair 1","1""#
    );

    assert_eq!(
        browser.calls(),
        vec![
            "search cheap noise-cancelling headphones".to_string(),
            "wait 2000".to_string(),
            "capture".to_string(),
        ]
    );
    assert_eq!(*observer.done.lock(), vec![RunState::Completed]);
}

#[tokio::test(start_paused = true)]
async fn dropped_open_tab_step_is_reported_with_navigation() {
    let plan = compile(
        &steps(&[
            "Open a new tab",
            "Navigate to https://example.com",
            "Extract results",
        ]),
        OutputFormat::Text,
        "",
    )
    .unwrap();
    let browser = Arc::new(FakeBrowser::new(3));
    let observer = RecordingObserver::default();

    let outcome = executor(browser.clone(), OutputBuilder::new())
        .execute(plan, CancellationToken::new(), &observer)
        .await
        .unwrap();

    let open_tab = outcome
        .results
        .iter()
        .find(|result| result.plan_index == 0)
        .expect("plan index 0 reported");
    assert!(open_tab.success());
    assert_eq!(outcome.results.len(), 3);
    assert_eq!(
        browser.calls().iter().filter(|c| c.starts_with("navigate")).count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn failed_step_does_not_abort_the_run() {
    let plan = plan_of(vec![
        StepAction::Navigate {
            url: "https://example.com".into(),
        },
        StepAction::Click {
            target: ElementTarget::Css("#missing".into()),
        },
        StepAction::Scroll {
            direction: ScrollDirection::Down,
        },
        StepAction::Wait { duration_ms: 100 },
    ]);
    let browser = Arc::new(FakeBrowser {
        fail_click: true,
        ..FakeBrowser::new(0)
    });
    let observer = RecordingObserver::default();

    let outcome = executor(browser.clone(), OutputBuilder::new())
        .execute(plan, CancellationToken::new(), &observer)
        .await
        .unwrap();

    assert_eq!(outcome.state, RunState::Completed);
    let statuses: Vec<StepStatus> = outcome.results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            StepStatus::Succeeded,
            StepStatus::Failed,
            StepStatus::Succeeded,
            StepStatus::Succeeded
        ]
    );
    assert!(outcome.results[1]
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("css:#missing"));
    assert_eq!(observer.results.lock().len(), 4);
    assert_eq!(observer.done.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_start_stops_at_first_step() {
    let plan = plan_of(vec![
        StepAction::Wait { duration_ms: 10 },
        StepAction::Wait { duration_ms: 10 },
    ]);
    let browser = Arc::new(FakeBrowser::new(0));
    let observer = RecordingObserver::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = executor(browser.clone(), OutputBuilder::new())
        .execute(plan, cancel, &observer)
        .await
        .unwrap();

    assert_eq!(outcome.state, RunState::Stopped);
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].status, StepStatus::Stopped);
    assert!(browser.calls().is_empty());
    assert_eq!(*observer.done.lock(), vec![RunState::Stopped]);
}

/// Stops the runner as soon as the first result arrives.
struct StopAfterFirst {
    runner: Arc<FlowRunner>,
    inner: RecordingObserver,
}

impl ProgressObserver for StopAfterFirst {
    fn on_step_result(&self, result: &StepResult) {
        self.runner.stop();
        self.inner.on_step_result(result);
    }

    fn on_done(&self, outcome: &RunOutcome) {
        self.inner.on_done(outcome);
    }
}

#[tokio::test(start_paused = true)]
async fn stop_takes_effect_at_next_step_boundary() {
    let plan = plan_of(vec![
        StepAction::Navigate {
            url: "https://example.com".into(),
        },
        StepAction::Scroll {
            direction: ScrollDirection::Down,
        },
        StepAction::Wait { duration_ms: 10 },
    ]);
    let browser = Arc::new(FakeBrowser::new(0));
    let runner = Arc::new(FlowRunner::new(Arc::new(executor(
        browser.clone(),
        OutputBuilder::new(),
    ))));
    let observer = StopAfterFirst {
        runner: runner.clone(),
        inner: RecordingObserver::default(),
    };

    let outcome = runner.start(plan, &observer).await.unwrap();

    assert_eq!(outcome.state, RunState::Stopped);
    assert_eq!(browser.calls(), vec!["navigate https://example.com".to_string()]);
    let seen = observer.inner.results.lock();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].plan_index, 1);
    assert_eq!(seen[1].status, StepStatus::Stopped);
    assert!(!runner.is_running());
}

#[tokio::test]
async fn second_run_is_rejected_while_first_is_active() {
    let gate = Arc::new(Notify::new());
    let browser = Arc::new(FakeBrowser {
        gate: Some(gate.clone()),
        ..FakeBrowser::new(0)
    });
    let runner = Arc::new(FlowRunner::new(Arc::new(executor(
        browser.clone(),
        OutputBuilder::new(),
    ))));
    let navigate = || {
        plan_of(vec![StepAction::Navigate {
            url: "https://example.com".into(),
        }])
    };

    let first = tokio::spawn({
        let runner = runner.clone();
        let plan = navigate();
        async move { runner.start(plan, &RecordingObserver::default()).await }
    });
    while browser.calls().is_empty() {
        tokio::task::yield_now().await;
    }

    let second = tokio_test::assert_err!(runner.start(navigate(), &RecordingObserver::default()).await);
    assert!(matches!(second, FlowError::AlreadyRunning));

    gate.notify_one();
    let outcome = tokio_test::assert_ok!(first.await.unwrap());
    assert_eq!(outcome.state, RunState::Completed);
    assert!(!runner.is_running());
}

#[tokio::test]
async fn empty_plan_fails_without_touching_the_browser() {
    let browser = Arc::new(FakeBrowser::new(0));
    let runner = FlowRunner::new(Arc::new(executor(browser.clone(), OutputBuilder::new())));
    let observer = RecordingObserver::default();

    let outcome = tokio_test::assert_ok!(runner.start(CompiledPlan::default(), &observer).await);
    assert_eq!(outcome.state, RunState::Failed);
    assert!(outcome.results.is_empty());
    assert!(outcome.artifact.is_none());
    assert!(browser.calls().is_empty());
    assert!(observer.results.lock().is_empty());
    assert_eq!(*observer.done.lock(), vec![RunState::Failed]);
    assert!(!runner.is_running());
}

#[tokio::test(start_paused = true)]
async fn empty_results_page_is_retried_once() {
    let plan = plan_of(vec![
        StepAction::Search {
            query: "headphones".into(),
        },
        StepAction::Extract {
            hint: SelectorHint::SearchResults,
        },
    ]);
    let browser = Arc::new(FakeBrowser::new(2));
    *browser.empty_captures.lock() = 1;

    let outcome = executor(browser.clone(), OutputBuilder::new())
        .execute(plan, CancellationToken::new(), &RecordingObserver::default())
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(browser.calls().iter().filter(|c| *c == "capture").count(), 2);
}

#[tokio::test(start_paused = true)]
async fn ranks_continue_across_extractions() {
    let extract = || StepAction::Extract {
        hint: SelectorHint::SearchResults,
    };
    let plan = plan_of(vec![
        StepAction::Search {
            query: "headphones".into(),
        },
        extract(),
        extract(),
    ]);
    let browser = Arc::new(FakeBrowser::new(3));

    let outcome = executor(browser, OutputBuilder::new())
        .execute(plan, CancellationToken::new(), &RecordingObserver::default())
        .await
        .unwrap();

    let ranks: Vec<u32> = outcome.records.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test(start_paused = true)]
async fn output_without_records_fails_that_step_only() {
    let plan = plan_of(vec![
        StepAction::Navigate {
            url: "https://example.com".into(),
        },
        StepAction::ProduceOutput {
            format: OutputFormat::Csv,
        },
    ]);
    let outcome = executor(Arc::new(FakeBrowser::new(0)), OutputBuilder::new())
        .execute(plan, CancellationToken::new(), &RecordingObserver::default())
        .await
        .unwrap();

    assert_eq!(outcome.state, RunState::Completed);
    assert!(outcome.results[0].success());
    assert_eq!(outcome.results[1].status, StepStatus::Failed);
    assert!(outcome.artifact.is_none());
}

#[tokio::test(start_paused = true)]
async fn shared_plan_index_keeps_latest_result() {
    let mut plan = plan_of(vec![
        StepAction::Search {
            query: "headphones".into(),
        },
        StepAction::Wait { duration_ms: 2_000 },
        StepAction::Extract {
            hint: SelectorHint::SearchResults,
        },
    ]);
    // Search, then a synthesized wait sharing the extraction's plan index.
    plan.steps[1].synthesized = true;
    plan.steps[2].plan_index = 1;
    plan.plan_len = 2;
    let observer = RecordingObserver::default();

    let outcome = executor(Arc::new(FakeBrowser::new(1)), OutputBuilder::new())
        .execute(plan, CancellationToken::new(), &observer)
        .await
        .unwrap();

    assert_eq!(observer.results.lock().len(), 3);
    assert_eq!(outcome.results.len(), 2);
    let merged = &outcome.results[1];
    assert_eq!(merged.plan_index, 1);
    assert_eq!(merged.compiled_index, 2);
}

#[tokio::test(start_paused = true)]
async fn request_is_compiled_before_running() {
    let runner = FlowRunner::new(Arc::new(executor(
        Arc::new(FakeBrowser::new(2)),
        OutputBuilder::new(),
    )));
    let compiler = RuleBasedCompiler::new(CompilerConfig::default());
    let observer = RecordingObserver::default();

    let request = PlanRequest::new("", OutputFormat::Table)
        .with_steps(["Search for budget laptops", "Extract results", "Create a table"]);
    let outcome = runner.start_request(&compiler, &request, &observer).await.unwrap();
    assert_eq!(outcome.records.len(), 2);
    assert!(matches!(
        outcome.artifact,
        Some(OutputArtifact::Inline {
            format: OutputFormat::Table,
            rows: 2,
            ..
        })
    ));

    let nothing = PlanRequest::new("", OutputFormat::Text).with_steps(["Think about it"]);
    let failed = runner.start_request(&compiler, &nothing, &observer).await.unwrap();
    assert_eq!(failed.state, RunState::Failed);
    assert!(failed.records.is_empty());
    assert_eq!(
        *observer.done.lock(),
        vec![RunState::Completed, RunState::Failed]
    );
}
