use perceiver_extract::links::is_results_page;
use tabpilot_core_types::{OutputFormat, SelectorHint};
use tracing::{debug, info};

use crate::errors::AgentError;
use crate::model::PlanRequest;
use crate::plan::{CompiledPlan, CompiledStep, Step, StepAction, StepKind};
use crate::planner::classify::{classify, Classification};
use crate::planner::discovery::{derive_search_query, is_discovery_request};
use crate::planner::{CompilerConfig, PlanCompiler};

/// Table-driven compiler from plan-step phrases to typed steps.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedCompiler {
    config: CompilerConfig,
}

/// Plan steps with no executable meaning, resolved after ordering.
#[derive(Debug, Default)]
struct Pending {
    /// Satisfied by the next tab-opening step.
    next: Vec<usize>,
    /// Satisfied by the preceding step.
    previous: Vec<usize>,
}

impl RuleBasedCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    fn translate(
        &self,
        request: &PlanRequest,
        steps: &mut Vec<CompiledStep>,
        pending: &mut Pending,
    ) -> bool {
        let mut explicit_output = false;
        for (index, text) in request.steps.iter().enumerate() {
            let (class, rule) = classify(text);
            debug!(plan_index = index, rule, ?class, "plan step classified");
            let description = text.trim();
            let action = match class {
                Classification::Output(format) => {
                    explicit_output = true;
                    StepAction::ProduceOutput {
                        format: format.unwrap_or(request.output_format),
                    }
                }
                Classification::Extract => StepAction::Extract {
                    hint: SelectorHint::Page,
                },
                Classification::Navigate { url } => StepAction::Navigate { url },
                Classification::Search { query } => StepAction::Search {
                    query: self.fill_query(query, &request.intent, description),
                },
                Classification::Click { target } => StepAction::Click { target },
                Classification::Type { target, text } => StepAction::Type { target, text },
                Classification::Scroll { direction } => StepAction::Scroll { direction },
                Classification::Wait { duration_ms } => StepAction::Wait { duration_ms },
                Classification::OpenTab | Classification::NavigateWithoutUrl => {
                    pending.next.push(index);
                    continue;
                }
                Classification::NoOp => {
                    pending.previous.push(index);
                    continue;
                }
            };
            steps.push(CompiledStep::new(Step::new(description, action), index));
        }
        explicit_output
    }

    fn fill_query(&self, query: String, intent: &str, description: &str) -> String {
        if !query.trim().is_empty() {
            return query;
        }
        if !intent.trim().is_empty() {
            return derive_search_query(intent);
        }
        derive_search_query(description)
    }

    fn apply_discovery_shortcut(&self, request: &PlanRequest, steps: &mut Vec<CompiledStep>) {
        if !self.config.discovery_shortcut
            || request.intent.trim().is_empty()
            || !is_discovery_request(&request.intent)
            || steps.iter().any(|entry| entry.step.kind() == StepKind::Search)
        {
            return;
        }
        let query = derive_search_query(&request.intent);
        let plan_index = steps.first().map(|entry| entry.plan_index).unwrap_or(0);
        info!(query = %query, "discovery request without search; synthesizing one");
        steps.insert(
            0,
            CompiledStep::synthesized(
                Step::new(format!("Search for \"{query}\""), StepAction::Search { query }),
                plan_index,
            ),
        );
    }
}

impl PlanCompiler for RuleBasedCompiler {
    fn compile(&self, request: &PlanRequest) -> Result<CompiledPlan, AgentError> {
        let mut steps = Vec::new();
        let mut pending = Pending::default();

        let explicit_output = self.translate(request, &mut steps, &mut pending);
        self.apply_discovery_shortcut(request, &mut steps);

        if !explicit_output && request.output_format.is_deliverable() && has_kind(&steps, StepKind::Extract) {
            let plan_index = steps.last().map(|entry| entry.plan_index).unwrap_or(0);
            let format = request.output_format;
            steps.push(CompiledStep::synthesized(
                Step::new(
                    format!("Produce {format} output"),
                    StepAction::ProduceOutput { format },
                ),
                plan_index,
            ));
        }

        if has_kind(&steps, StepKind::ProduceOutput) {
            move_extracts_after_first_search(&mut steps);
            move_outputs_to_end(&mut steps);
        }
        insert_post_search_waits(&mut steps, self.config.post_search_wait_ms);
        assign_extract_hints(&mut steps);

        if steps.is_empty() {
            return Err(AgentError::EmptyPlan);
        }
        resolve_pending(&mut steps, pending);

        let plan = CompiledPlan {
            steps,
            plan_len: request.steps.len(),
        };
        info!(
            plan_steps = plan.plan_len,
            compiled_steps = plan.len(),
            kinds = ?plan.kinds(),
            "plan compiled"
        );
        Ok(plan)
    }
}

fn has_kind(steps: &[CompiledStep], kind: StepKind) -> bool {
    steps.iter().any(|entry| entry.step.kind() == kind)
}

/// Extracts that no search precedes are moved right after the first search.
fn move_extracts_after_first_search(steps: &mut Vec<CompiledStep>) {
    let Some(first_search) = steps
        .iter()
        .position(|entry| entry.step.kind() == StepKind::Search)
    else {
        return;
    };
    let (early, rest): (Vec<_>, Vec<_>) = steps
        .drain(..first_search)
        .partition(|entry| entry.step.kind() == StepKind::Extract);
    if !early.is_empty() {
        debug!(moved = early.len(), "moving extraction after its triggering search");
    }
    let mut reordered = rest;
    reordered.push(steps.remove(0));
    reordered.extend(early);
    reordered.append(steps);
    *steps = reordered;
}

/// Stable partition putting every output step last.
fn move_outputs_to_end(steps: &mut Vec<CompiledStep>) {
    let (outputs, others): (Vec<_>, Vec<_>) = steps
        .drain(..)
        .partition(|entry| entry.step.kind() == StepKind::ProduceOutput);
    steps.extend(others);
    steps.extend(outputs);
}

fn insert_post_search_waits(steps: &mut Vec<CompiledStep>, wait_ms: u64) {
    let mut index = 1;
    while index < steps.len() {
        let follows_search = steps[index - 1].step.kind() == StepKind::Search;
        if follows_search && steps[index].step.kind() == StepKind::Extract {
            let plan_index = steps[index].plan_index;
            steps.insert(
                index,
                CompiledStep::synthesized(
                    Step::new(
                        "Wait for search results to settle",
                        StepAction::Wait {
                            duration_ms: wait_ms,
                        },
                    ),
                    plan_index,
                ),
            );
            index += 1;
        }
        index += 1;
    }
}

/// Extraction reads a results page only when the latest page-loading step
/// was a search or a navigation to a results URL.
fn assign_extract_hints(steps: &mut [CompiledStep]) {
    let mut on_results_page = false;
    for entry in steps.iter_mut() {
        match &mut entry.step.action {
            StepAction::Search { .. } => on_results_page = true,
            StepAction::Navigate { url } => on_results_page = is_results_page(url),
            StepAction::Extract { hint } => {
                *hint = if on_results_page {
                    SelectorHint::SearchResults
                } else {
                    SelectorHint::Page
                };
            }
            _ => {}
        }
    }
}

fn resolve_pending(steps: &mut [CompiledStep], pending: Pending) {
    for plan_index in pending.next {
        let target = steps
            .iter()
            .position(|entry| entry.plan_index > plan_index && entry.step.opens_tab())
            .or_else(|| steps.iter().position(|entry| entry.plan_index > plan_index))
            .unwrap_or(steps.len() - 1);
        steps[target].also_satisfies.push(plan_index);
    }
    for plan_index in pending.previous {
        let target = steps
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.plan_index < plan_index)
            .max_by_key(|(position, entry)| (entry.plan_index, *position))
            .map(|(position, _)| position)
            .or_else(|| {
                steps
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, entry)| entry.plan_index)
                    .map(|(position, _)| position)
            })
            .unwrap_or(0);
        steps[target].also_satisfies.push(plan_index);
    }
    for entry in steps.iter_mut() {
        entry.also_satisfies.sort_unstable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(steps: &[&str]) -> PlanRequest {
        PlanRequest::new("", OutputFormat::Text).with_steps(steps.iter().copied())
    }

    #[test]
    fn wait_maps_to_the_extract_it_precedes() {
        let compiled = RuleBasedCompiler::default()
            .compile(&plan(&["Search for rust books", "Extract results"]))
            .unwrap();
        assert_eq!(
            compiled.kinds(),
            vec![StepKind::Search, StepKind::Wait, StepKind::Extract]
        );
        assert_eq!(compiled.steps[1].plan_index, 1);
        assert!(compiled.steps[1].synthesized);
    }

    #[test]
    fn existing_wait_is_kept_and_no_extra_is_added() {
        let compiled = RuleBasedCompiler::default()
            .compile(&plan(&["Search for rust books", "Wait 5 seconds", "Extract results"]))
            .unwrap();
        assert_eq!(
            compiled.kinds(),
            vec![StepKind::Search, StepKind::Wait, StepKind::Extract]
        );
        assert!(!compiled.steps[1].synthesized);
    }

    #[test]
    fn no_op_marker_reports_with_previous_step() {
        let compiled = RuleBasedCompiler::default()
            .compile(&plan(&["Navigate to https://example.com", "Review the page"]))
            .unwrap();
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled.steps[0].also_satisfies, vec![1]);
    }

    #[test]
    fn leading_no_op_reports_with_first_step() {
        let compiled = RuleBasedCompiler::default()
            .compile(&plan(&["Think about it", "Navigate to https://example.com"]))
            .unwrap();
        assert_eq!(compiled.steps[0].also_satisfies, vec![0]);
    }

    #[test]
    fn extraction_after_plain_navigation_uses_page_hint() {
        let compiled = RuleBasedCompiler::default()
            .compile(&plan(&["Navigate to https://example.com", "Extract results"]))
            .unwrap();
        assert_eq!(
            compiled.steps[1].step.action,
            StepAction::Extract {
                hint: SelectorHint::Page
            }
        );
    }

    #[test]
    fn navigation_to_results_url_uses_results_hint() {
        let compiled = RuleBasedCompiler::default()
            .compile(&plan(&[
                "Go to https://www.bing.com/search?q=rust",
                "Extract results",
            ]))
            .unwrap();
        assert_eq!(
            compiled.steps[1].step.action,
            StepAction::Extract {
                hint: SelectorHint::SearchResults
            }
        );
    }
}
