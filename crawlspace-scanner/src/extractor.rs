use crate::result::{EmailMatch, NO_VISIBLE_CONTEXT};
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// Characters of visible text captured before an address.
const CONTEXT_WINDOW: usize = 50;

/// Scans raw markup for email addresses and pairs each with a snippet of
/// the surrounding visible text.
///
/// The asymmetry is deliberate: addresses are matched against the markup so
/// that mailto: links and attribute values are caught, but context always
/// comes from the rendered text, which carries no tag noise.
pub struct EmailExtractor {
    pattern: Regex,
}

impl EmailExtractor {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
                .expect("email pattern is valid"),
        }
    }

    /// Extract addresses from `markup`, deduplicated against `seen`.
    ///
    /// `seen` accumulates across calls, so uniqueness holds for a whole
    /// crawl session rather than a single page. First occurrence wins.
    pub fn extract(
        &self,
        markup: &str,
        visible_text: &str,
        seen: &mut HashSet<String>,
    ) -> Vec<EmailMatch> {
        let mut matches = Vec::new();

        for found in self.pattern.find_iter(markup) {
            let address = found.as_str();

            if seen.contains(address) {
                continue;
            }
            seen.insert(address.to_string());

            let context = context_snippet(visible_text, address);
            matches.push(EmailMatch::new(context, address));
        }

        debug!("Extracted {} new addresses", matches.len());
        matches
    }

    /// Basic mode: scan only the visible text, no context capture.
    /// Returns distinct addresses in order of first appearance.
    pub fn extract_visible(&self, visible_text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut addresses = Vec::new();

        for found in self.pattern.find_iter(visible_text) {
            let address = found.as_str();
            if seen.insert(address.to_string()) {
                addresses.push(address.to_string());
            }
        }

        addresses
    }
}

impl Default for EmailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Up to `CONTEXT_WINDOW` characters of visible text preceding the first
/// occurrence of `address`, trimmed. Falls back to the sentinel when the
/// address never appears in the visible text.
fn context_snippet(visible_text: &str, address: &str) -> String {
    match visible_text.find(address) {
        Some(idx) => {
            let prefix = &visible_text[..idx];
            let start = prefix
                .char_indices()
                .rev()
                .take(CONTEXT_WINDOW)
                .last()
                .map(|(i, _)| i)
                .unwrap_or(prefix.len());
            prefix[start..].trim().to_string()
        }
        None => NO_VISIBLE_CONTEXT.to_string(),
    }
}
