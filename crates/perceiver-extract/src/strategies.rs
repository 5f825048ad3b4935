//! Layered candidate strategies for search-results pages.
//!
//! Each strategy is a pure function over the captured tree. They are tried
//! in order and the first one yielding a validated candidate wins.

use url::Url;

use crate::dom::{normalize_whitespace, DomNode};
use crate::links::{is_internal_engine_url, normalize_link};
use crate::model::Candidate;

/// How many ancestors a heading may climb to find its result container.
const MAX_CONTAINER_DEPTH: usize = 3;
const MAX_SNIPPET_CHARS: usize = 300;

const RESULT_CLASSES: &[&str] = &[
    "g",
    "tF2Cxc",
    "MjjYud",
    "b_algo",
    "result",
    "result__body",
    "search-result",
];

const SNIPPET_CLASSES: &[&str] = &[
    "VwiC3b",
    "IsZvec",
    "b_caption",
    "b_lineclamp2",
    "result__snippet",
    "snippet",
];

pub type CollectFn = fn(&DomNode, Option<&Url>) -> Vec<Candidate>;

#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub collect: CollectFn,
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

pub const SEARCH_RESULT_STRATEGIES: [Strategy; 3] = [
    Strategy {
        name: "attribute",
        collect: attribute_containers,
    },
    Strategy {
        name: "class",
        collect: class_containers,
    },
    Strategy {
        name: "heading_link",
        collect: headings_with_external_links,
    },
];

/// Result blocks marked by engine data attributes.
pub fn attribute_containers(root: &DomNode, _base: Option<&Url>) -> Vec<Candidate> {
    innermost(root, is_attribute_container)
        .into_iter()
        .filter_map(candidate_from_container)
        .collect()
}

/// Result blocks marked by well-known result classes.
pub fn class_containers(root: &DomNode, _base: Option<&Url>) -> Vec<Candidate> {
    innermost(root, |node| {
        RESULT_CLASSES.iter().any(|class| node.has_class(class))
    })
    .into_iter()
    .filter_map(candidate_from_container)
    .collect()
}

/// Any heading whose nearby container also holds an external link.
pub fn headings_with_external_links(root: &DomNode, base: Option<&Url>) -> Vec<Candidate> {
    let mut out = Vec::new();
    let mut ancestors = Vec::new();
    walk_headings(root, base, &mut ancestors, &mut out);
    out
}

fn walk_headings<'a>(
    node: &'a DomNode,
    base: Option<&Url>,
    ancestors: &mut Vec<&'a DomNode>,
    out: &mut Vec<Candidate>,
) {
    if node.is_heading() {
        if let Some(candidate) = heading_candidate(node, ancestors, base) {
            out.push(candidate);
        }
        // Nested headings would only repeat the same container.
        return;
    }
    ancestors.push(node);
    for child in &node.children {
        walk_headings(child, base, ancestors, out);
    }
    ancestors.pop();
}

fn heading_candidate(
    heading: &DomNode,
    ancestors: &[&DomNode],
    base: Option<&Url>,
) -> Option<Candidate> {
    let title = heading.text_content();
    if title.is_empty() {
        return None;
    }
    // The nearest ancestor holding any link is the result container.
    let container = ancestors
        .iter()
        .rev()
        .take(MAX_CONTAINER_DEPTH)
        .find(|container| container.find_first(DomNode::is_link).is_some())?;
    let link = external_link(container, base)?;
    Some(Candidate {
        snippet: snippet_for(container, &title),
        title,
        link: Some(link),
    })
}

fn external_link(container: &DomNode, base: Option<&Url>) -> Option<String> {
    container
        .find_all(DomNode::is_link)
        .filter_map(|anchor| anchor.href())
        .filter_map(|href| normalize_link(href, base))
        .find(|link| {
            Url::parse(link)
                .map(|url| matches!(url.scheme(), "http" | "https") && !is_internal_engine_url(&url))
                .unwrap_or(false)
        })
}

fn is_attribute_container(node: &DomNode) -> bool {
    if node.attr("data-testid") == Some("result") || node.has_attr("data-sokoban-container") {
        return true;
    }
    node.has_attr("data-hveid")
        && node.find_first(DomNode::is_heading).is_some()
        && node.find_first(DomNode::is_link).is_some()
}

/// Matching nodes that contain no other matching node.
fn innermost<P>(root: &DomNode, predicate: P) -> Vec<&DomNode>
where
    P: Fn(&DomNode) -> bool,
{
    root.descendants()
        .filter(|node| predicate(node))
        .filter(|node| {
            !node
                .children
                .iter()
                .any(|child| child.descendants().any(|inner| predicate(inner)))
        })
        .collect()
}

fn candidate_from_container(container: &DomNode) -> Option<Candidate> {
    let heading = container.find_first(DomNode::is_heading);
    let title_link = container
        .find_first(|node| node.is_link() && node.find_first(DomNode::is_heading).is_some())
        .or_else(|| container.find_first(DomNode::is_link));

    let title = heading
        .map(DomNode::text_content)
        .filter(|text| !text.is_empty())
        .or_else(|| title_link.map(DomNode::text_content))
        .filter(|text| !text.is_empty())?;

    Some(Candidate {
        snippet: snippet_for(container, &title),
        link: title_link.and_then(DomNode::href).map(str::to_string),
        title,
    })
}

fn snippet_for(container: &DomNode, title: &str) -> String {
    let marked = container.find_first(|node| {
        node.has_attr("data-sncf") || SNIPPET_CLASSES.iter().any(|class| node.has_class(class))
    });
    let text = match marked {
        Some(node) => node.text_content(),
        None => {
            let full = container.text_content();
            normalize_whitespace(&full.replacen(title, "", 1))
        }
    };
    truncate_chars(&text, MAX_SNIPPET_CHARS)
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push('…');
    cut
}
