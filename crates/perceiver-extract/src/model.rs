use serde::{Deserialize, Serialize};

/// One structured row recovered from a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub url: String,
    pub description: String,
    /// 1-based position in extraction order.
    pub rank: u32,
}

/// Raw candidate produced by a strategy before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub link: Option<String>,
    pub snippet: String,
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum number of records returned by one pass.
    pub max_results: usize,
    /// Rank assigned to the first record of this pass.
    pub first_rank: u32,
    /// URL of the scanned page, used to resolve relative links.
    pub page_url: Option<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_results: 10,
            first_rank: 1,
            page_url: None,
        }
    }
}

impl ExtractOptions {
    pub fn with_first_rank(mut self, rank: u32) -> Self {
        self.first_rank = rank.max(1);
        self
    }

    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = Some(url.into());
        self
    }
}

/// Records from one pass plus the strategy that produced them.
#[derive(Debug, Clone, Default)]
pub struct ExtractOutcome {
    pub records: Vec<Record>,
    pub strategy: Option<&'static str>,
    pub rejected: usize,
}
