use crawlspace_scanner::crawler::DEFAULT_MAX_PAGES;
use crawlspace_scanner::result::CrawlResult;
use crawlspace_scanner::Crawler;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub url: String,
    pub max_pages: usize,
    pub timeout_secs: u64,
    pub show_progress_bar: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_pages: DEFAULT_MAX_PAGES,
            timeout_secs: 10,
            show_progress_bar: true,
        }
    }
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl with the given options.
/// Renders a page-budget progress bar while the crawler runs.
pub async fn execute_crawl(options: CrawlOptions) -> Result<CrawlResult, String> {
    let CrawlOptions {
        url,
        max_pages,
        timeout_secs,
        show_progress_bar,
    } = options;

    let progress_bar = if show_progress_bar {
        let pb = ProgressBar::new(max_pages as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] page {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=> "),
        );
        pb.set_message("crawling...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut crawler = Crawler::with_timeout(timeout_secs).with_max_pages(max_pages);

    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        crawler = crawler.with_progress_callback(Arc::new(move |current: usize, _total: usize| {
            pb_clone.set_position(current as u64);
        }));
    }

    let result = crawler
        .crawl(&url)
        .await
        .map_err(|e| format!("Failed to crawl {}: {}", url, e))?;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "done. {} pages, {} addresses",
            result.pages_visited(),
            result.matches.len()
        ));
    }

    Ok(result)
}

/// Fetch a single page and run the basic visible-text extraction over it.
/// No frontier, no context capture; the free-tier scan.
pub async fn execute_scan(url: &str, timeout_secs: u64) -> Result<Vec<String>, String> {
    let crawler = Crawler::with_timeout(timeout_secs);
    crawler
        .scan_page(url)
        .await
        .map_err(|e| format!("Failed to scan {}: {}", url, e))
}
