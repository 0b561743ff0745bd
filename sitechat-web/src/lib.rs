//! Site acquisition for sitechat.
//!
//! - Visible-text and anchor extraction over `scraper` documents (`extract`)
//! - Timeout-bounded page fetching that degrades to empty text (`fetch`)
//! - Single-level crawl of a seed page and its links (`crawl`)

pub mod crawl;
pub mod extract;
pub mod fetch;

pub use crawl::{CrawlResult, PageText, SiteCrawler};
pub use fetch::PageFetcher;
