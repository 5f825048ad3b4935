use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle of a browser tab as issued by the tab host.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TabId(pub String);

impl TabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output format requested by the plan producer.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum OutputFormat {
    Sheet,
    Csv,
    Table,
    #[default]
    Text,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Sheet => "sheet",
            OutputFormat::Csv => "csv",
            OutputFormat::Table => "table",
            OutputFormat::Text => "text",
        }
    }

    /// Formats that are delivered outside the completion payload.
    pub fn is_deliverable(&self) -> bool {
        matches!(self, OutputFormat::Sheet | OutputFormat::Csv)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown output format '{0}' (expected sheet, csv, table or text)")]
pub struct UnknownOutputFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownOutputFormat;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sheet" | "sheets" | "spreadsheet" => Ok(OutputFormat::Sheet),
            "csv" => Ok(OutputFormat::Csv),
            "table" => Ok(OutputFormat::Table),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(UnknownOutputFormat(other.to_string())),
        }
    }
}

/// Hint telling extraction what kind of page it is looking at.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelectorHint {
    /// The active tab shows a search-engine results page.
    SearchResults,
    /// Any other page. Extraction yields nothing rather than guess at chrome.
    Page,
}

impl SelectorHint {
    pub fn is_search_results(&self) -> bool {
        matches!(self, SelectorHint::SearchResults)
    }
}

/// Element addressed by click and type actions.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(tag = "by", content = "value", rename_all = "snake_case"))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ElementTarget {
    Css(String),
    Text(String),
}

impl fmt::Display for ElementTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementTarget::Css(selector) => write!(f, "css:{selector}"),
            ElementTarget::Text(text) => write!(f, "text:{text}"),
        }
    }
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ScrollDirection {
    #[default]
    Down,
    Up,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parses_aliases() {
        assert_eq!("Sheets".parse::<OutputFormat>(), Ok(OutputFormat::Sheet));
        assert_eq!(" csv ".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn only_sheet_and_csv_are_delivered() {
        assert!(OutputFormat::Csv.is_deliverable());
        assert!(OutputFormat::Sheet.is_deliverable());
        assert!(!OutputFormat::Table.is_deliverable());
        assert!(!OutputFormat::Text.is_deliverable());
    }
}
