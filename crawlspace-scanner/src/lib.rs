pub mod crawler;
pub mod error;
pub mod extractor;
pub mod result;

pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use extractor::EmailExtractor;
pub use result::{CrawlResult, EmailMatch, PageVisit, NO_VISIBLE_CONTEXT};
