//! Search-query derivation for open-ended discovery requests.
//!
//! The query comes from the user's original wording so counts and
//! qualifiers survive; only leading imperatives and trailing delivery or
//! sourcing clauses are removed.

use once_cell::sync::Lazy;
use regex::Regex;

static DISCOVERY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:find|discover|top|best|search|look\s+(?:up|for)|recommend\w*|compare|research|cheapest|popular|leading)\b",
    )
    .expect("discovery regex")
});

static LEADING_POLITENESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:please|kindly|can\s+you|could\s+you|would\s+you|help\s+me|i\s+want\s+to|i\s+need\s+to|i'?d\s+like\s+to|i\s+would\s+like\s+to)\b[\s,]*",
    )
    .expect("politeness regex")
});

static LEADING_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:find(?:\s+out)?|discover|search(?:\s+(?:the\s+web|online))?(?:\s+(?:for|about))?|look\s+(?:up|for)|show(?:\s+me)?|get(?:\s+me)?|give\s+me|list|tell\s+me(?:\s+about)?|recommend|identify|locate|research|compare|compile(?:\s+a\s+list\s+of)?)\b[\s,:]*",
    )
    .expect("leading verb regex")
});

static LEADING_DETERMINER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:me\s+)?(?:the|some|a\s+few)\s+").expect("determiner regex"));

static TRAILING_QUALIFIERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\s+(?:on|from|using|via|at|in)\s+(?:a|an|the|some)?\s*(?:reliable|trusted|reputable|credible|good|popular|major)?\s*(?:websites?|sites?|sources?|web\s*pages?|search\s+engines?|web|internet)\s*$",
        r"(?i)\s+online\s*$",
        r"(?i)\s+(?:and|then)\s+(?:put|save|export|create|make|add|write|compile|list|store|organi[sz]e|return|send|give|show)\b.*$",
        r"(?i)\s+(?:in|into|as)\s+(?:a|an|the)\s+(?:csv|sheets?|spreadsheet|google\s+sheets?|table|file)(?:\s+(?:file|format))?\s*$",
        r"(?i)\s+for\s+me\b.*$",
        r"[\s.!?,;:]+$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("trailing qualifier regex"))
    .collect()
});

/// Whether the request reads as an open-ended find/top/best request.
pub fn is_discovery_request(intent: &str) -> bool {
    DISCOVERY_REGEX.is_match(intent)
}

/// Derive a search query from the user's original request.
///
/// Falls back to the unmodified (trimmed) text when stripping would leave
/// nothing.
pub fn derive_search_query(original: &str) -> String {
    let original = original.trim();
    let mut query = original.to_string();

    query = strip_repeatedly(&query, &LEADING_POLITENESS);
    query = strip_repeatedly(&query, &LEADING_VERB);
    query = LEADING_DETERMINER.replace(&query, "").to_string();

    loop {
        let before = query.clone();
        for regex in TRAILING_QUALIFIERS.iter() {
            query = regex.replace(&query, "").trim().to_string();
        }
        if query == before {
            break;
        }
    }

    if query.trim().is_empty() {
        original.to_string()
    } else {
        query.trim().to_string()
    }
}

fn strip_repeatedly(text: &str, regex: &Regex) -> String {
    let mut current = text.trim().to_string();
    loop {
        let next = regex.replace(&current, "").trim().to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_counts_and_qualifiers() {
        let query = derive_search_query("find the top 7 budget laptops under $500");
        assert_eq!(query, "top 7 budget laptops under $500");
        for token in ["7", "budget", "laptops", "$500"] {
            assert!(query.contains(token), "{token} missing from {query}");
        }
    }

    #[test]
    fn strips_trailing_sourcing_and_delivery_clauses() {
        assert_eq!(
            derive_search_query("Please find the best pizza places in Chicago on a reliable website"),
            "best pizza places in Chicago"
        );
        assert_eq!(
            derive_search_query("Search for 5 quiet mechanical keyboards and put them in a spreadsheet."),
            "5 quiet mechanical keyboards"
        );
    }

    #[test]
    fn keeps_subject_phrases_that_resemble_tails() {
        assert_eq!(
            derive_search_query("find the best courses in web development"),
            "best courses in web development"
        );
        assert_eq!(
            derive_search_query("find the top 10 ways to file taxes"),
            "top 10 ways to file taxes"
        );
        assert_eq!(
            derive_search_query("find the best standing desks in a table"),
            "best standing desks"
        );
    }

    #[test]
    fn never_returns_empty() {
        assert_eq!(derive_search_query("find"), "find");
        assert_eq!(derive_search_query("  Search for  "), "Search for");
        assert_eq!(derive_search_query("show me"), "show me");
    }

    #[test]
    fn detects_open_ended_requests() {
        assert!(is_discovery_request("What are the best budget laptops?"));
        assert!(is_discovery_request("find cheap flights"));
        assert!(!is_discovery_request("Open my bank statement"));
    }
}
