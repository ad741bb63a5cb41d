pub mod cache;
pub mod crawler;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod links;
pub mod normalize;
pub mod result;

pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use fetch::{Fetcher, HttpFetcher};
pub use links::{HtmlLinkExtractor, Link, LinkExtractor};
pub use normalize::{UrlFields, normalize};
pub use result::{CrawlResult, Edge, VisitEntry};
