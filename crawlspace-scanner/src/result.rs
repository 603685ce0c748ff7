use serde::{Deserialize, Serialize};

/// Sentinel context for addresses that only appear in markup
/// (mailto: hrefs, data attributes) and never in rendered text.
pub const NO_VISIBLE_CONTEXT: &str = "No visible context";

/// A discovered email address plus up to 50 characters of the visible
/// text that preceded its first textual occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMatch {
    pub context: String,
    pub address: String,
}

impl EmailMatch {
    pub fn new(context: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            address: address.into(),
        }
    }
}

/// Per-page record of one crawl step, in visitation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageVisit {
    pub url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub emails_found: usize,
    pub links_found: usize,
    pub error: Option<String>,
}

impl PageVisit {
    pub fn new(url: String) -> Self {
        Self {
            url,
            status_code: 0,
            content_type: None,
            emails_found: 0,
            links_found: 0,
            error: None,
        }
    }

    pub fn with_error(url: String, error: String) -> Self {
        Self {
            url,
            status_code: 0,
            content_type: None,
            emails_found: 0,
            links_found: 0,
            error: Some(error),
        }
    }
}

/// Outcome of a whole crawl session. `matches` is in discovery order:
/// page visitation order first, then first-match order within a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub seed_url: String,
    pub matches: Vec<EmailMatch>,
    pub pages: Vec<PageVisit>,
}

impl CrawlResult {
    pub fn new(seed_url: String) -> Self {
        Self {
            seed_url,
            matches: Vec::new(),
            pages: Vec::new(),
        }
    }

    pub fn pages_visited(&self) -> usize {
        self.pages.len()
    }
}
