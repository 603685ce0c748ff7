use crate::error::{Result, ScanError};
use crate::extractor::EmailExtractor;
use crate::result::{CrawlResult, PageVisit};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Hard default carried over from the hosted product: a site crawl stops
/// after 50 pages.
pub const DEFAULT_MAX_PAGES: usize = 50;

/// Breadth-first crawler scoped to the seed URL's origin.
///
/// Traversal is strictly sequential: one outstanding fetch at a time,
/// frontier drained in FIFO discovery order. This bounds load on the target
/// host and keeps the page budget deterministic, so the session state needs
/// no locking at all.
pub struct Crawler {
    client: Client,
    extractor: EmailExtractor,
    max_pages: usize,
    progress_callback: Option<ProgressCallback>,
}

/// All mutable state for one crawl invocation. Built fresh per call to
/// [`Crawler::crawl`], dropped when it returns; concurrent crawls never
/// share anything.
struct CrawlSession {
    base: Url,
    visited: HashSet<String>,
    enqueued: HashSet<String>,
    frontier: VecDeque<String>,
    pages_visited: usize,
    seen_addresses: HashSet<String>,
    result: CrawlResult,
}

impl CrawlSession {
    fn new(seed: Url) -> Self {
        Self {
            result: CrawlResult::new(seed.to_string()),
            base: seed,
            visited: HashSet::new(),
            enqueued: HashSet::new(),
            frontier: VecDeque::new(),
            pages_visited: 0,
            seen_addresses: HashSet::new(),
        }
    }

    /// Append links to the frontier tail, skipping anything already
    /// visited or already queued. Preserves discovery order.
    fn enqueue(&mut self, links: Vec<String>) {
        for link in links {
            if !self.visited.contains(&link) && self.enqueued.insert(link.clone()) {
                self.frontier.push_back(link);
            }
        }
    }
}

/// What one fetch produced, before extraction.
struct FetchedPage {
    status_code: u16,
    content_type: Option<String>,
    body: String,
}

impl Crawler {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; ContactFinderBot/1.0)")
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            extractor: EmailExtractor::new(),
            max_pages: DEFAULT_MAX_PAGES,
            progress_callback: None,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawl the seed URL's site, breadth-first, up to the page budget.
    ///
    /// Seed failures (bad URL, unreachable host, error status) reject the
    /// whole crawl. Every later per-page failure is logged and recorded on
    /// that page's visit entry, and the traversal moves on.
    pub async fn crawl(&self, seed_url: &str) -> Result<CrawlResult> {
        let seed = Url::parse(seed_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", seed_url, e)))?;
        if seed.host_str().is_none() {
            return Err(ScanError::InvalidUrl(format!("{}: no host", seed_url)));
        }

        info!(
            "Starting crawl of {} (max {} pages)",
            seed.host_str().unwrap_or_default(),
            self.max_pages
        );

        let mut session = CrawlSession::new(seed.clone());

        // Seed counts as page 1, visited before its fetch is even attempted.
        session.visited.insert(seed.to_string());
        session.pages_visited += 1;
        self.report_progress(session.pages_visited);

        let page = self
            .fetch_page(seed.as_str())
            .await
            .map_err(|e| ScanError::SeedPage(e.to_string()))?;
        if !(200..300).contains(&page.status_code) {
            return Err(ScanError::SeedPage(format!(
                "{} returned status {}",
                seed, page.status_code
            )));
        }
        self.process_page(seed.as_str(), page, &mut session);

        // Drain the frontier one page at a time until it empties or the
        // budget runs out.
        while session.pages_visited < self.max_pages {
            let Some(url) = session.frontier.pop_front() else {
                break;
            };
            // Enqueue-time checks should make this impossible, but a stale
            // frontier entry must not abort the run.
            if !session.visited.insert(url.clone()) {
                continue;
            }
            session.pages_visited += 1;
            self.report_progress(session.pages_visited);

            match self.fetch_page(&url).await {
                Ok(page) => self.process_page(&url, page, &mut session),
                Err(e) => {
                    warn!("Crawl error for {}: {}", url, e);
                    session
                        .result
                        .pages
                        .push(PageVisit::with_error(url, e.to_string()));
                }
            }
        }

        info!(
            "Crawl complete. Visited {} pages, found {} addresses",
            session.pages_visited,
            session.result.matches.len()
        );
        Ok(session.result)
    }

    /// Single-page scan: fetch one URL and return the distinct addresses in
    /// its visible text. No context capture, no traversal.
    pub async fn scan_page(&self, url: &str) -> Result<Vec<String>> {
        let parsed =
            Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

        let page = self
            .fetch_page(parsed.as_str())
            .await
            .map_err(|e| ScanError::SeedPage(e.to_string()))?;
        if !(200..300).contains(&page.status_code) {
            return Err(ScanError::SeedPage(format!(
                "{} returned status {}",
                parsed, page.status_code
            )));
        }

        let document = Html::parse_document(&page.body);
        let text = visible_text(&document);
        Ok(self.extractor.extract_visible(&text))
    }

    fn report_progress(&self, current: usize) {
        if let Some(ref callback) = self.progress_callback {
            callback(current, self.max_pages);
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;

        Ok(FetchedPage {
            status_code,
            content_type,
            body,
        })
    }

    /// Extract addresses and harvest frontier links from one fetched page.
    /// Non-success and non-HTML responses still produce a visit record;
    /// they just contribute nothing.
    fn process_page(&self, url: &str, page: FetchedPage, session: &mut CrawlSession) {
        let mut visit = PageVisit::new(url.to_string());
        visit.status_code = page.status_code;
        visit.content_type = page.content_type.clone();

        let ok = (200..300).contains(&page.status_code);
        if !ok {
            warn!("Skipping {} (status {})", url, page.status_code);
        }

        let is_html = page
            .content_type
            .as_ref()
            .map(|ct| ct.contains("text/html") || ct.contains("application/xhtml"))
            .unwrap_or(false);
        if !is_html {
            debug!("Skipping extraction for {} (not HTML)", url);
        }

        if ok && is_html {
            let document = Html::parse_document(&page.body);
            let text = visible_text(&document);

            // Addresses come from the raw body, context from rendered text.
            let matches = self
                .extractor
                .extract(&page.body, &text, &mut session.seen_addresses);
            visit.emails_found = matches.len();
            session.result.matches.extend(matches);

            let links = harvest_links(&document, url, &session.base);
            visit.links_found = links.len();
            session.enqueue(links);
        }

        session.result.pages.push(visit);
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

/// Rendered-text approximation of a parsed document: concatenated text
/// nodes, with script and style subtrees dropped entirely.
pub fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    collect_text(document.root_element(), &mut out);
    out
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(el) = ElementRef::wrap(child) {
            match el.value().name() {
                "script" | "style" => continue,
                _ => collect_text(el, out),
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

/// All same-origin anchor targets in the document, absolutized against the
/// page URL, fragments stripped, in DOM order.
fn harvest_links(document: &Html, current_url: &str, base: &Url) -> Vec<String> {
    let link_selector = Selector::parse("a[href]").unwrap();
    let mut links = Vec::new();

    for element in document.select(&link_selector) {
        if let Some(href) = element.value().attr("href")
            && let Some(absolute) = resolve_url(current_url, href)
        {
            if is_same_origin(&absolute, base) {
                links.push(absolute.to_string());
            } else {
                debug!("Dropping cross-origin link {}", absolute);
            }
        }
    }

    links
}

fn resolve_url(base: &str, href: &str) -> Option<Url> {
    // Skip empty, javascript:, mailto:, tel:, and fragment-only hrefs
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let mut resolved = base_url.join(href).ok()?;
    resolved.set_fragment(None);

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    Some(resolved)
}

/// Strict origin check: scheme and hostname must both match the seed.
/// Hostname equality is exact; `example.com.evil.com` is not `example.com`,
/// and neither is any subdomain.
fn is_same_origin(url: &Url, base: &Url) -> bool {
    url.scheme() == base.scheme() && url.host_str() == base.host_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    async fn mount_html(server: &MockServer, at: &str, html: &str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(html.as_bytes().to_vec()),
            )
            .mount(server)
            .await;
    }

    fn visited_paths(result: &CrawlResult) -> Vec<String> {
        result
            .pages
            .iter()
            .map(|p| {
                Url::parse(&p.url)
                    .map(|u| u.path().to_string())
                    .unwrap_or_else(|_| p.url.clone())
            })
            .collect()
    }

    #[tokio::test]
    async fn test_bfs_visitation_order() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount_html(
            &server,
            "/",
            &format!(
                r#"<html><body>
                    <a href="{base}/b">B</a>
                    <a href="{base}/c">C</a>
                </body></html>"#
            ),
        )
        .await;
        mount_html(
            &server,
            "/b",
            &format!(r#"<html><body><a href="{base}/d">D</a></body></html>"#),
        )
        .await;
        mount_html(&server, "/c", "<html><body>C</body></html>").await;
        mount_html(&server, "/d", "<html><body>D</body></html>").await;

        let crawler = Crawler::new();
        let result = crawler.crawl(&base).await.unwrap();

        assert_eq!(visited_paths(&result), vec!["/", "/b", "/c", "/d"]);
    }

    #[tokio::test]
    async fn test_page_budget_halts_with_nonempty_frontier() {
        let server = MockServer::start().await;
        let base = server.uri();

        // every page links to 5 fresh pages; the graph never runs dry
        let mut root = String::from("<html><body>");
        for i in 1..=5 {
            root.push_str(&format!(r#"<a href="{base}/p{i}">p{i}</a>"#));
        }
        root.push_str("</body></html>");
        mount_html(&server, "/", &root).await;

        for i in 1..=5 {
            let mut html = String::from("<html><body>");
            for j in 1..=5 {
                html.push_str(&format!(r#"<a href="{base}/p{i}-{j}">x</a>"#));
            }
            html.push_str("</body></html>");
            mount_html(&server, &format!("/p{i}"), &html).await;
        }

        let crawler = Crawler::new().with_max_pages(3);
        let result = crawler.crawl(&base).await.unwrap();

        assert_eq!(result.pages_visited(), 3);
    }

    #[tokio::test]
    async fn test_cross_origin_links_are_never_enqueued() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount_html(
            &server,
            "/",
            &format!(
                r#"<html><body>
                    <a href="https://other.example.com/page">elsewhere</a>
                    <a href="{base}/sub?q=1">here</a>
                </body></html>"#
            ),
        )
        .await;
        mount_html(&server, "/sub", "<html><body>sub</body></html>").await;

        let crawler = Crawler::new();
        let result = crawler.crawl(&base).await.unwrap();

        assert_eq!(result.pages_visited(), 2);
        assert!(result.pages.iter().all(|p| !p.url.contains("other.example.com")));
        assert!(result.pages[1].url.ends_with("/sub?q=1"));
    }

    #[tokio::test]
    async fn test_failed_page_does_not_abort_crawl() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount_html(
            &server,
            "/",
            &format!(
                r#"<html><body>
                    <a href="{base}/broken">broken</a>
                    <a href="{base}/fine">fine</a>
                </body></html>"#
            ),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_html(
            &server,
            "/fine",
            "<html><body>mail ok@good.example.com</body></html>",
        )
        .await;

        let crawler = Crawler::new();
        let result = crawler.crawl(&base).await.unwrap();

        // broken page consumed budget and is recorded, but contributed nothing
        assert_eq!(result.pages_visited(), 3);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].address, "ok@good.example.com");
        let broken = result
            .pages
            .iter()
            .find(|p| p.url.ends_with("/broken"))
            .unwrap();
        assert_eq!(broken.emails_found, 0);
        assert_eq!(broken.links_found, 0);
    }

    #[tokio::test]
    async fn test_non_html_page_counts_but_contributes_nothing() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount_html(
            &server,
            "/",
            &format!(r#"<html><body><a href="{base}/data.json">data</a></body></html>"#),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_bytes(br#"{"email":"hidden@inside.json"}"#.to_vec()),
            )
            .mount(&server)
            .await;

        let crawler = Crawler::new();
        let result = crawler.crawl(&base).await.unwrap();

        assert_eq!(result.pages_visited(), 2);
        assert!(result.matches.is_empty());
    }

    #[tokio::test]
    async fn test_addresses_dedupe_across_pages() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount_html(
            &server,
            "/",
            &format!(
                r#"<html><body>
                    shared@site.example.com
                    <a href="{base}/about">about</a>
                </body></html>"#
            ),
        )
        .await;
        mount_html(
            &server,
            "/about",
            "<html><body>Write to shared@site.example.com or new@site.example.com</body></html>",
        )
        .await;

        let crawler = Crawler::new();
        let result = crawler.crawl(&base).await.unwrap();

        let addresses: Vec<&str> = result.matches.iter().map(|m| m.address.as_str()).collect();
        assert_eq!(
            addresses,
            vec!["shared@site.example.com", "new@site.example.com"]
        );
    }

    #[tokio::test]
    async fn test_mailto_address_gets_sentinel_context() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount_html(
            &server,
            "/",
            r#"<html><body><a href="mailto:x@y.com">Email us</a></body></html>"#,
        )
        .await;

        let crawler = Crawler::new();
        let result = crawler.crawl(&base).await.unwrap();

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].address, "x@y.com");
        assert_eq!(result.matches[0].context, crate::result::NO_VISIBLE_CONTEXT);
        // and the mailto: href itself must never reach the frontier
        assert_eq!(result.pages_visited(), 1);
    }

    #[tokio::test]
    async fn test_script_content_is_invisible_to_context() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount_html(
            &server,
            "/",
            r#"<html><body>
                <script>var owner = "admin@site.example.net";</script>
                <p>Nothing else here</p>
            </body></html>"#,
        )
        .await;

        let crawler = Crawler::new();
        let result = crawler.crawl(&base).await.unwrap();

        // found in markup, but the script body is stripped from visible text
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].context, crate::result::NO_VISIBLE_CONTEXT);
    }

    #[tokio::test]
    async fn test_progress_reports_are_monotonic_and_complete() {
        let server = MockServer::start().await;
        let base = server.uri();

        mount_html(
            &server,
            "/",
            &format!(
                r#"<html><body><a href="{base}/a">a</a><a href="{base}/b">b</a></body></html>"#
            ),
        )
        .await;
        mount_html(&server, "/a", "<html><body>a</body></html>").await;
        mount_html(&server, "/b", "<html><body>b</body></html>").await;

        let seen: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let crawler = Crawler::new()
            .with_max_pages(10)
            .with_progress_callback(Arc::new(move |current, total| {
                seen_clone.lock().unwrap().push((current, total));
            }));

        crawler.crawl(&base).await.unwrap();

        let events = seen.lock().unwrap();
        assert_eq!(*events, vec![(1, 10), (2, 10), (3, 10)]);
    }

    #[tokio::test]
    async fn test_scan_page_reads_visible_text_only() {
        let server = MockServer::start().await;

        mount_html(
            &server,
            "/",
            r#"<html><body>
                <p>Reach me at visible@site.example.com</p>
                <a href="mailto:hidden@site.example.com">mail</a>
            </body></html>"#,
        )
        .await;

        let crawler = Crawler::new();
        let addresses = crawler.scan_page(&server.uri()).await.unwrap();

        // basic mode never sees attribute-only addresses
        assert_eq!(addresses, vec!["visible@site.example.com"]);
    }

    #[tokio::test]
    async fn test_seed_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let crawler = Crawler::new();
        let err = crawler.crawl(&server.uri()).await.unwrap_err();

        assert!(matches!(err, ScanError::SeedPage(_)));
    }

    #[tokio::test]
    async fn test_invalid_seed_url_is_rejected() {
        let crawler = Crawler::new();
        let err = crawler.crawl("not a url").await.unwrap_err();
        assert!(matches!(err, ScanError::InvalidUrl(_)));
    }

    #[test]
    fn test_same_origin_rejects_prefix_spoof() {
        let base = Url::parse("https://example.com/").unwrap();
        let spoof = Url::parse("https://example.com.evil.com/login").unwrap();
        let sub = Url::parse("https://sub.example.com/").unwrap();
        let cross_scheme = Url::parse("http://example.com/").unwrap();
        let same = Url::parse("https://example.com/a/b?q=1").unwrap();

        assert!(!is_same_origin(&spoof, &base));
        assert!(!is_same_origin(&sub, &base));
        assert!(!is_same_origin(&cross_scheme, &base));
        assert!(is_same_origin(&same, &base));
    }

    #[test]
    fn test_resolve_url_skips_non_navigable_hrefs() {
        let base = "https://example.com/page";
        assert!(resolve_url(base, "").is_none());
        assert!(resolve_url(base, "#top").is_none());
        assert!(resolve_url(base, "javascript:void(0)").is_none());
        assert!(resolve_url(base, "mailto:a@b.com").is_none());
        assert!(resolve_url(base, "tel:+1555").is_none());

        let resolved = resolve_url(base, "/sub?q=1#frag").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/sub?q=1");
    }

    #[test]
    fn test_visible_text_strips_script_and_style() {
        let document = Html::parse_document(
            r#"<html><head><style>.x{color:red}</style></head>
               <body><p>Hello</p><script>var y = 1;</script></body></html>"#,
        );
        let text = visible_text(&document);
        assert!(text.contains("Hello"));
        assert!(!text.contains("color:red"));
        assert!(!text.contains("var y"));
    }
}
