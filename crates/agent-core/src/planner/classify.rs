//! Ordered classification table mapping one plan-step phrase to a step kind.
//!
//! Rules are tried top to bottom and the first match wins:
//! output, extract, navigate-with-URL, open-tab, URL-less navigation,
//! search, click, type, scroll, wait. Anything else is a no-op marker.

use once_cell::sync::Lazy;
use perceiver_extract::links::is_search_engine_host;
use regex::Regex;
use tabpilot_core_types::{ElementTarget, OutputFormat, ScrollDirection};
use url::Url;

/// Fallback input target when a type step names no field.
pub const DEFAULT_INPUT_SELECTOR: &str =
    "input[type='search'], input[type='text'], input:not([type]), textarea";
pub const DEFAULT_WAIT_MS: u64 = 2_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Explicit output. `None` defers to the plan's requested format.
    Output(Option<OutputFormat>),
    Extract,
    Navigate { url: String },
    /// Query may be empty when the phrase names no subject.
    Search { query: String },
    OpenTab,
    NavigateWithoutUrl,
    Click { target: ElementTarget },
    Type { target: ElementTarget, text: String },
    Scroll { direction: ScrollDirection },
    Wait { duration_ms: u64 },
    NoOp,
}

impl Classification {
    pub fn is_dropped(&self) -> bool {
        matches!(
            self,
            Classification::OpenTab | Classification::NavigateWithoutUrl | Classification::NoOp
        )
    }
}

/// Phrase with its derived forms computed once.
#[derive(Debug)]
pub struct Phrase<'a> {
    pub original: &'a str,
    /// Leading enumerators and connectives removed.
    pub core: String,
    pub lower: String,
    pub url: Option<String>,
}

impl<'a> Phrase<'a> {
    pub fn new(original: &'a str) -> Self {
        let core = strip_leading_connectives(original.trim());
        let lower = core.to_lowercase();
        let url = extract_first_url(&core);
        Self {
            original,
            core,
            lower,
            url,
        }
    }
}

pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&Phrase<'_>) -> Option<Classification>,
}

pub static RULES: &[Rule] = &[
    Rule {
        name: "output",
        apply: output_rule,
    },
    Rule {
        name: "extract",
        apply: extract_rule,
    },
    Rule {
        name: "navigate_url",
        apply: navigate_rule,
    },
    Rule {
        name: "open_tab",
        apply: open_tab_rule,
    },
    Rule {
        name: "navigate_without_url",
        apply: bare_navigation_rule,
    },
    Rule {
        name: "search",
        apply: search_rule,
    },
    Rule {
        name: "click",
        apply: click_rule,
    },
    Rule {
        name: "type",
        apply: type_rule,
    },
    Rule {
        name: "scroll",
        apply: scroll_rule,
    },
    Rule {
        name: "wait",
        apply: wait_rule,
    },
];

/// Classify one plan-step phrase, returning the matching rule name.
pub fn classify(text: &str) -> (Classification, &'static str) {
    let phrase = Phrase::new(text);
    if phrase.core.is_empty() {
        return (Classification::NoOp, "empty");
    }
    RULES
        .iter()
        .find_map(|rule| (rule.apply)(&phrase).map(|class| (class, rule.name)))
        .unwrap_or((Classification::NoOp, "no_op"))
}

static LEADING_CONNECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:step\s*)?\d+\s*[.):-]\s*|[-*•]\s+|(?:then|and|next|finally|first|afterwards|after that|now|lastly)\b[,:]?\s*)",
    )
    .expect("leading connective regex")
});
static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s"'<>)]+"#).expect("url regex"));
static DOMAIN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(?:www\.)?[a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)*\.(?:com|org|net|io|dev|edu|gov|co|ai|app|info|uk|de)\b(?:/[^\s"'<>)]*)?"#,
    )
    .expect("domain regex")
});
static QUOTED_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)"|“([^”]+)”|'([^']+)'"#).expect("quoted regex"));

static OUTPUT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:create|make|generate|build|produce|export|save|write|put|compile|prepare|present|deliver|download|output)\b.*\b(?:csv|sheets?|spreadsheet|table|file|report|document|list)\b",
    )
    .expect("output regex")
});
static EXTRACT_ANYWHERE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:extract(?:s|ed|ing)?|scrap(?:e|es|ed|ing)|harvest(?:s|ed|ing)?)\b").expect("extract regex")
});
/// Phrases opening with a search verb stay searches whatever their subject says.
static SEARCH_LEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:search|look\s+up|lookup|look\s+for|google|query)\b")
        .expect("leading search regex")
});
static EXTRACT_LEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:collect|gather|grab|capture|record|note|list|identify|pick out|pull)\b")
        .expect("extract leading regex")
});
static EXTRACT_FETCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:get|copy|take|fetch|read)\b.*\b(?:results?|links?|titles?|listings?|entries|items|names|urls?|data)\b",
    )
    .expect("extract fetch regex")
});
static NAV_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:go|goes|navigate|open|visit|load|browse|head|proceed)\b")
        .expect("navigation regex")
});
static NAV_LEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:go|navigate|open|visit|load|browse|head|proceed)\b")
        .expect("leading navigation regex")
});
static NEW_TAB_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bnew\s+(?:browser\s+)?tab\b").expect("new tab regex"));
static SEARCH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:search|look\s+up|lookup|look\s+for|google|query|find|discover)\b")
        .expect("search regex")
});
/// Search-box style nouns that are not search phrasing.
static SEARCH_NOUNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bsearch\s+(?:box|bar|field|input|button|results?|page|engine)\b")
        .expect("search noun regex")
});
/// Subject extractors, most explicit verb first.
static SEARCH_SUBJECTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bsearch(?:\s+(?:the\s+web|online|google|bing))?(?:\s+(?:for|about))?\b\s*(?P<subject>.*)$",
        r"(?i)\b(?:look\s+up|lookup|look\s+for)\b\s*(?P<subject>.*)$",
        r"(?i)\b(?:find|discover)\b\s*(?P<subject>.*)$",
        r"(?i)\b(?:query(?:\s+for)?|google)\b\s*(?P<subject>.*)$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("search subject regex"))
    .collect()
});
static SEARCH_ENGINE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s+(?:on|using|with|via|in)\s+(?:the\s+)?(?:google|bing|duckduckgo|search\s+engine|web)(?:\.com)?\s*$",
    )
    .expect("search engine suffix regex")
});
static CLICK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\b(?:click|press|tap|hit)\b|^(?:select|choose)\b)(?:\s+on)?(?:\s+the)?\s*(?P<label>.*)$")
        .expect("click regex")
});
static CLICK_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:button|link|tab|icon|option)\s*\.?$").expect("click suffix regex")
});
static TYPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:type|enter|fill\s+in|fill|input)\b\s*(?P<rest>.*)$").expect("type regex")
});
static TYPE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:into|in|on)\s+(?:the\s+)?(?P<field>[\w\s-]+?)(?:\s+(?:field|box|input|bar))?\s*\.?$")
        .expect("type field regex")
});
static SCROLL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bscroll\b").expect("scroll regex"));
static SCROLL_UP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:up|top|upwards)\b").expect("scroll up regex"));
static WAIT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:wait|pause|sleep)\b").expect("wait regex"));
static WAIT_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?P<value>\d+(?:\.\d+)?)\s*(?P<unit>ms|milliseconds?|s|secs?|seconds?|m|mins?|minutes?)\b",
    )
    .expect("wait duration regex")
});

fn output_rule(phrase: &Phrase<'_>) -> Option<Classification> {
    if !OUTPUT_REGEX.is_match(&phrase.core) {
        return None;
    }
    Some(Classification::Output(format_named_in(&phrase.lower)))
}

/// Output format explicitly named in a phrase.
pub fn format_named_in(lower: &str) -> Option<OutputFormat> {
    if lower.contains("csv") {
        Some(OutputFormat::Csv)
    } else if lower.contains("sheet") {
        Some(OutputFormat::Sheet)
    } else if lower.contains("table") {
        Some(OutputFormat::Table)
    } else {
        None
    }
}

fn extract_rule(phrase: &Phrase<'_>) -> Option<Classification> {
    let core = &phrase.core;
    if SEARCH_LEADING.is_match(core) {
        return None;
    }
    (EXTRACT_ANYWHERE.is_match(core) || EXTRACT_LEADING.is_match(core) || EXTRACT_FETCH.is_match(core))
        .then_some(Classification::Extract)
}

fn navigate_rule(phrase: &Phrase<'_>) -> Option<Classification> {
    let url = phrase.url.as_ref()?;
    let searching = has_search_phrasing(&strip_domains(&phrase.core));
    let host = Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_default();

    // "Go to google.com and search for X" is a search, not a visit to the homepage.
    if searching && is_search_engine_host(&host) {
        let query = first_quoted(&phrase.core)
            .or_else(|| search_subject(&strip_domains(&phrase.core)))
            .unwrap_or_default();
        return Some(Classification::Search { query });
    }
    if NAV_REGEX.is_match(&phrase.core) || !searching {
        return Some(Classification::Navigate { url: url.clone() });
    }
    None
}

fn open_tab_rule(phrase: &Phrase<'_>) -> Option<Classification> {
    NEW_TAB_REGEX
        .is_match(&phrase.core)
        .then_some(Classification::OpenTab)
}

fn bare_navigation_rule(phrase: &Phrase<'_>) -> Option<Classification> {
    (phrase.url.is_none() && NAV_LEADING.is_match(&phrase.core))
        .then_some(Classification::NavigateWithoutUrl)
}

fn search_rule(phrase: &Phrase<'_>) -> Option<Classification> {
    if !has_search_phrasing(&phrase.core) {
        return None;
    }
    let query = first_quoted(&phrase.core)
        .or_else(|| search_subject(&phrase.core))
        .unwrap_or_default();
    Some(Classification::Search { query })
}

fn click_rule(phrase: &Phrase<'_>) -> Option<Classification> {
    let captures = CLICK_REGEX.captures(&phrase.core)?;
    let label = first_quoted(&phrase.core).or_else(|| {
        captures.name("label").map(|m| {
            let label = CLICK_SUFFIX.replace(m.as_str().trim(), "");
            trim_punctuation(&label)
        })
    })?;
    if label.is_empty() {
        return None;
    }
    Some(Classification::Click {
        target: ElementTarget::Text(label),
    })
}

fn type_rule(phrase: &Phrase<'_>) -> Option<Classification> {
    let captures = TYPE_REGEX.captures(&phrase.core)?;
    let quoted = all_quoted(&phrase.core);
    let rest = captures.name("rest").map(|m| m.as_str()).unwrap_or("");

    let field = quoted.get(1).cloned().or_else(|| {
        TYPE_FIELD
            .captures(rest)
            .and_then(|c| c.name("field"))
            .map(|m| m.as_str().trim().to_string())
            .filter(|field| !field.is_empty())
    });
    let text = match quoted.first() {
        Some(value) => value.clone(),
        None => {
            let value = TYPE_FIELD.replace(rest, "");
            trim_punctuation(&value)
        }
    };
    if text.is_empty() {
        return None;
    }
    let target = field
        .map(ElementTarget::Text)
        .unwrap_or_else(|| ElementTarget::Css(DEFAULT_INPUT_SELECTOR.to_string()));
    Some(Classification::Type { target, text })
}

fn scroll_rule(phrase: &Phrase<'_>) -> Option<Classification> {
    if !SCROLL_REGEX.is_match(&phrase.core) {
        return None;
    }
    let direction = if SCROLL_UP.is_match(&phrase.core) {
        ScrollDirection::Up
    } else {
        ScrollDirection::Down
    };
    Some(Classification::Scroll { direction })
}

fn wait_rule(phrase: &Phrase<'_>) -> Option<Classification> {
    if !WAIT_REGEX.is_match(&phrase.core) {
        return None;
    }
    let duration_ms = capture_wait_ms(&phrase.core).unwrap_or(DEFAULT_WAIT_MS);
    Some(Classification::Wait { duration_ms })
}

pub fn capture_wait_ms(text: &str) -> Option<u64> {
    let captures = WAIT_DURATION.captures(text)?;
    let value: f64 = captures.name("value")?.as_str().parse().ok()?;
    let unit = captures.name("unit")?.as_str().to_ascii_lowercase();
    let factor = if unit.starts_with("ms") || unit.starts_with("milli") {
        1.0
    } else if unit.starts_with('m') {
        60_000.0
    } else {
        1_000.0
    };
    Some((value * factor).round() as u64)
}

/// First absolute URL or bare domain, normalised to an absolute URL.
pub fn extract_first_url(text: &str) -> Option<String> {
    if let Some(found) = URL_REGEX.find(text) {
        return Some(found.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']).to_string());
    }
    let domain = DOMAIN_REGEX.find(text)?;
    // Part of an e-mail address, not a site.
    if text[..domain.start()].ends_with('@') {
        return None;
    }
    let bare = domain.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
    Some(format!("https://{bare}"))
}

/// Whether the phrase uses "search" and friends as a verb.
pub fn has_search_phrasing(core: &str) -> bool {
    SEARCH_REGEX.is_match(&SEARCH_NOUNS.replace_all(core, ""))
}

fn search_subject(core: &str) -> Option<String> {
    let subject = SEARCH_SUBJECTS
        .iter()
        .find_map(|regex| regex.captures(core))?
        .name("subject")?
        .as_str()
        .to_string();
    let subject = SEARCH_ENGINE_SUFFIX.replace(&subject, "");
    let subject = trim_punctuation(&subject);
    (!subject.is_empty()).then_some(subject)
}

fn strip_domains(text: &str) -> String {
    let without_urls = URL_REGEX.replace_all(text, "");
    let without_domains = DOMAIN_REGEX.replace_all(&without_urls, "");
    let cleaned = SEARCH_ENGINE_SUFFIX.replace(without_domains.trim(), "");
    trim_punctuation(&cleaned)
}

fn strip_leading_connectives(text: &str) -> String {
    let mut current = text.trim().to_string();
    loop {
        let next = LEADING_CONNECTIVE.replace(&current, "").trim().to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn all_quoted(text: &str) -> Vec<String> {
    QUOTED_REGEX
        .captures_iter(text)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn first_quoted(text: &str) -> Option<String> {
    all_quoted(text).into_iter().next()
}

fn trim_punctuation(text: &str) -> String {
    text.trim()
        .trim_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '"' | '\''))
        .trim()
        .to_string()
}
