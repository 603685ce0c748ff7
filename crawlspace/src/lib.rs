// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::normalize_seed_url;

// Re-export crawl functionality from crawlspace-core
pub use crawlspace_core::crawl::{execute_crawl, execute_scan, extract_url_path, CrawlOptions};
pub use crawlspace_core::report::{generate_report, write_report, ReportFormat};
