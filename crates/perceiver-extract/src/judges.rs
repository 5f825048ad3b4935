//! Validity filter applied to every extraction candidate.
//!
//! The judgement is a pure function of the candidate text and its link, so
//! the same input always yields the same verdict.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::links::is_internal_engine_url;

const MIN_TEXT_CHARS: usize = 5;
const MIN_SINGLE_WORD_CHARS: usize = 8;

/// Navigation labels and chrome that are never content on their own.
const UI_LABELS: &[&str] = &[
    "all",
    "images",
    "videos",
    "news",
    "shopping",
    "maps",
    "books",
    "flights",
    "more",
    "tools",
    "settings",
    "privacy",
    "terms",
    "feedback",
    "sign in",
    "log in",
    "next",
    "previous",
    "search results",
    "people also ask",
    "related searches",
    "skip to main content",
    "accessibility links",
    "accessibility feedback",
    "quick settings",
];

/// Upload widgets and error banners, matched anywhere in the text.
const UI_FRAGMENTS: &[&str] = &[
    "upload an image",
    "upload a file",
    "drag and drop",
    "drop an image here",
    "choose file",
    "something went wrong",
    "try again later",
    "an error occurred",
    "unusual traffic",
    "enable javascript",
    "our systems have detected",
];

static CSS_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|[\s;{])(?:display|color|background(?:-[a-z]+)?|margin(?:-[a-z]+)?|padding(?:-[a-z]+)?|width|height|position|font(?:-[a-z]+)?|border(?:-[a-z]+)?|flex(?:-[a-z]+)?|z-index|opacity|overflow|line-height|text-align|cursor)\s*:\s*\S",
    )
    .expect("css declaration regex")
});

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    TooShort,
    NoLetters,
    CodeLike,
    UiChrome(String),
    TooFewWords,
    NonHttpLink(String),
    EngineInternalLink(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooShort => write!(f, "text shorter than {MIN_TEXT_CHARS} characters"),
            Rejection::NoLetters => f.write_str("text contains no letters"),
            Rejection::CodeLike => f.write_str("text looks like CSS or script"),
            Rejection::UiChrome(label) => write!(f, "text is interface chrome ('{label}')"),
            Rejection::TooFewWords => f.write_str("single short token"),
            Rejection::NonHttpLink(link) => write!(f, "link is not an absolute http(s) URL: {link}"),
            Rejection::EngineInternalLink(link) => {
                write!(f, "link points inside the search engine: {link}")
            }
        }
    }
}

/// Judge one candidate. `Ok(())` means the candidate is content.
pub fn judge(text: &str, link: Option<&str>) -> Result<(), Rejection> {
    let text = text.trim();
    if text.chars().count() < MIN_TEXT_CHARS {
        return Err(Rejection::TooShort);
    }
    if !text.chars().any(char::is_alphabetic) {
        return Err(Rejection::NoLetters);
    }
    if looks_like_code(text) {
        return Err(Rejection::CodeLike);
    }
    if let Some(label) = ui_chrome_label(text) {
        return Err(Rejection::UiChrome(label.to_string()));
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    let has_long_word = words
        .iter()
        .any(|word| word.chars().count() >= MIN_SINGLE_WORD_CHARS);
    if words.len() < 2 && !has_long_word {
        return Err(Rejection::TooFewWords);
    }
    if let Some(link) = link.map(str::trim).filter(|link| !link.is_empty()) {
        judge_link(link)?;
    }
    Ok(())
}

pub fn is_valid(text: &str, link: Option<&str>) -> bool {
    judge(text, link).is_ok()
}

fn judge_link(link: &str) -> Result<(), Rejection> {
    let parsed = Url::parse(link).map_err(|_| Rejection::NonHttpLink(link.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(Rejection::NonHttpLink(link.to_string()));
    }
    if is_internal_engine_url(&parsed) {
        return Err(Rejection::EngineInternalLink(link.to_string()));
    }
    Ok(())
}

fn looks_like_code(text: &str) -> bool {
    let has_brace = text.contains('{') || text.contains('}');
    if has_brace && text.contains(':') {
        return true;
    }
    let lowered = text.to_ascii_lowercase();
    if lowered.contains("var(") || lowered.contains("function(") || lowered.contains("function (")
    {
        return true;
    }
    if !text.contains(';') {
        return false;
    }
    let leading = CSS_DECLARATION
        .find(text.trim_start())
        .is_some_and(|found| found.start() == 0);
    leading || CSS_DECLARATION.find_iter(text).count() >= 2
}

fn ui_chrome_label(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    UI_LABELS
        .iter()
        .find(|label| lowered == **label)
        .or_else(|| UI_FRAGMENTS.iter().find(|frag| lowered.contains(**frag)))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inline_css() {
        assert_eq!(
            judge("display:flex; background-color:#fff", None),
            Err(Rejection::CodeLike)
        );
        assert_eq!(judge(".a{color:red}", None), Err(Rejection::CodeLike));
        assert_eq!(
            judge("width: var(--gap) and more", None),
            Err(Rejection::CodeLike)
        );
    }

    #[test]
    fn accepts_result_title_with_external_link() {
        assert!(is_valid(
            "Top 10 Budget Laptops of 2024",
            Some("https://www.example.com/laptops")
        ));
    }

    #[test]
    fn rejects_short_and_letterless_text() {
        assert_eq!(judge("  abc ", None), Err(Rejection::TooShort));
        assert_eq!(judge("12345 678", None), Err(Rejection::NoLetters));
        assert_eq!(judge("Hello", None), Err(Rejection::TooFewWords));
        assert!(is_valid("Headphones", None));
    }

    #[test]
    fn rejects_interface_chrome() {
        assert!(matches!(judge("Images", None), Err(Rejection::UiChrome(_))));
        assert!(matches!(
            judge("Something went wrong. Please retry", None),
            Err(Rejection::UiChrome(_))
        ));
        assert!(matches!(
            judge("Upload an image to search", None),
            Err(Rejection::UiChrome(_))
        ));
    }

    #[test]
    fn rejects_engine_and_relative_links() {
        assert!(matches!(
            judge("Best headphones 2024", Some("https://www.google.com/search?q=x")),
            Err(Rejection::EngineInternalLink(_))
        ));
        assert!(matches!(
            judge("Best headphones 2024", Some("/relative/path")),
            Err(Rejection::NonHttpLink(_))
        ));
        assert!(matches!(
            judge("Best headphones 2024", Some("mailto:someone@example.com")),
            Err(Rejection::NonHttpLink(_))
        ));
    }

    #[test]
    fn verdict_is_stable_across_calls() {
        let inputs = [
            ("display:flex; background-color:#fff", None),
            ("Top 10 Budget Laptops of 2024", Some("https://example.com/a")),
            ("Maps", None),
        ];
        for (text, link) in inputs {
            assert_eq!(judge(text, link), judge(text, link));
        }
    }

    #[test]
    fn prose_with_colon_is_not_code() {
        assert!(is_valid(
            "Review: the quietest noise-cancelling headphones",
            None
        ));
    }

    #[test]
    fn single_declaration_inside_a_title_is_not_code() {
        assert!(is_valid(
            "Sony WH-1000XM5 review - Color: black; Price: $348",
            Some("https://www.example.com/sony")
        ));
        assert_eq!(
            judge("Buy now color:red; margin-top:4px", None),
            Err(Rejection::CodeLike)
        );
    }
}
