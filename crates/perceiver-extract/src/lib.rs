//! Extraction heuristics.
//!
//! Recovers structured records from a captured DOM tree using a layered
//! strategy list and a validity filter that rejects interface chrome,
//! styling/script text and engine-internal links.

pub mod dom;
pub mod errors;
pub mod judges;
pub mod links;
pub mod model;
pub mod strategies;

use std::collections::HashSet;

use tabpilot_core_types::SelectorHint;
use tracing::debug;
use url::Url;

pub use dom::DomNode;
pub use errors::ExtractError;
pub use judges::{is_valid, judge, Rejection};
pub use model::{Candidate, ExtractOptions, ExtractOutcome, Record};
pub use strategies::{Strategy, SEARCH_RESULT_STRATEGIES};

/// Scan `root` for records.
///
/// Only search-results pages are scanned; any other hint yields an empty
/// outcome instead of grabbing arbitrary elements.
pub fn extract(root: &DomNode, hint: SelectorHint, options: &ExtractOptions) -> ExtractOutcome {
    if !hint.is_search_results() {
        debug!(?hint, "hint is not a results page; skipping extraction");
        return ExtractOutcome::default();
    }
    extract_with(root, &SEARCH_RESULT_STRATEGIES, options)
}

/// Run `strategies` in order, stopping at the first that yields a record.
pub fn extract_with(
    root: &DomNode,
    strategies: &[Strategy],
    options: &ExtractOptions,
) -> ExtractOutcome {
    let base = options
        .page_url
        .as_deref()
        .and_then(|url| Url::parse(url).ok());
    let mut rejected_total = 0;

    for strategy in strategies {
        let candidates = (strategy.collect)(root, base.as_ref());
        let found = candidates.len();
        let (records, rejected) = validate(candidates, base.as_ref(), options);
        rejected_total += rejected;
        debug!(
            strategy = strategy.name,
            found,
            accepted = records.len(),
            rejected,
            "extraction strategy evaluated"
        );
        if !records.is_empty() {
            return ExtractOutcome {
                records,
                strategy: Some(strategy.name),
                rejected: rejected_total,
            };
        }
    }

    ExtractOutcome {
        records: Vec::new(),
        strategy: None,
        rejected: rejected_total,
    }
}

fn validate(
    candidates: Vec<Candidate>,
    base: Option<&Url>,
    options: &ExtractOptions,
) -> (Vec<Record>, usize) {
    let mut records: Vec<Record> = Vec::new();
    let mut seen_urls = HashSet::new();
    let mut rejected = 0;

    for candidate in candidates {
        if records.len() >= options.max_results {
            break;
        }
        let link = candidate.link.as_deref().map(|raw| {
            links::normalize_link(raw, base).unwrap_or_else(|| raw.to_string())
        });
        if let Err(reason) = judge(&candidate.title, link.as_deref()) {
            debug!(title = %candidate.title, %reason, "candidate rejected");
            rejected += 1;
            continue;
        }
        let url = link.unwrap_or_default();
        if !url.is_empty() && !seen_urls.insert(url.clone()) {
            continue;
        }
        let rank = options.first_rank + records.len() as u32;
        records.push(Record {
            name: candidate.title,
            url,
            description: candidate.snippet,
            rank,
        });
    }

    (records, rejected)
}
