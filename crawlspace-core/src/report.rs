// Report generation from crawl results

use crate::crawl::extract_url_path;
use chrono::Local;
use crawlspace_scanner::result::CrawlResult;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Tsv,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "tsv" => Some(ReportFormat::Tsv),
            _ => None,
        }
    }
}

pub fn generate_report(result: &CrawlResult, format: &ReportFormat) -> Result<String, String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(result)),
        ReportFormat::Json => serde_json::to_string_pretty(result)
            .map_err(|e| format!("Failed to serialize report: {}", e)),
        ReportFormat::Tsv => Ok(generate_tsv_report(result)),
    }
}

pub fn write_report(path: &Path, content: &str) -> Result<(), String> {
    let mut file =
        File::create(path).map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

fn generate_text_report(result: &CrawlResult) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Seed: {}\n", result.seed_url));
    report.push_str(&format!(
        "  Generated: {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    report.push_str(&format!("  Pages visited: {}\n", result.pages_visited()));
    report.push_str(&format!("  Addresses found: {}\n", result.matches.len()));

    let failed = result.pages.iter().filter(|p| p.error.is_some()).count();
    if failed > 0 {
        report.push_str(&format!("  Pages failed: {}\n", failed));
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str("# Addresses:\n");
    if result.matches.is_empty() {
        report.push_str("  (none)\n");
    }
    for m in &result.matches {
        if m.context.is_empty() {
            report.push_str(&format!("  {}\n", m.address));
        } else {
            report.push_str(&format!("  {}  \x1b[90m{}\x1b[0m\n", m.address, m.context));
        }
    }

    report.push_str("\n# Pages:\n");
    for page in &result.pages {
        let path = extract_url_path(&page.url);

        // Color code based on status
        let status_str = match page.status_code {
            100..=199 => format!("\x1b[37m{}\x1b[0m", page.status_code), // White
            200..=299 => format!("\x1b[32m{}\x1b[0m", page.status_code), // Green
            300..=399 => format!("\x1b[36m{}\x1b[0m", page.status_code), // Cyan
            400..=499 => format!("\x1b[33m{}\x1b[0m", page.status_code), // Orange/Yellow
            500..=599 => format!("\x1b[31m{}\x1b[0m", page.status_code), // Red
            _ => format!("{}", page.status_code),
        };

        let mut line = format!("  {} {}", status_str, path);

        if let Some(ref content_type) = page.content_type
            && !content_type.contains("text/html")
        {
            line.push_str(&format!(" \x1b[90m{}\x1b[0m", content_type));
        }
        if let Some(ref error) = page.error {
            line.push_str(&format!(" \x1b[31m{}\x1b[0m", error));
        }

        report.push_str(&line);
        report.push('\n');
    }
    report.push('\n');

    report
}

/// One `context<TAB>address` line per match, ready to paste into a
/// spreadsheet. Whitespace in context is flattened so rows stay intact.
fn generate_tsv_report(result: &CrawlResult) -> String {
    let mut out = String::new();
    for m in &result.matches {
        let context: String = m
            .context
            .chars()
            .map(|c| if c == '\t' || c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        out.push_str(&format!("{}\t{}\n", context, m.address));
    }
    out
}
