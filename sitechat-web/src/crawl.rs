//! Single-level crawl: the seed page plus every page it links to.
//!
//! Links are fetched one at a time in document order. Failed or empty pages
//! are dropped; the rest are joined with single spaces.

use crate::extract::anchor_hrefs;
use crate::fetch::PageFetcher;
use std::time::Instant;
use url::Url;

/// `scheme://host[:port]/` of `url`, with path, query and fragment cleared.
///
/// ```
/// use sitechat_web::crawl::base_origin;
/// use url::Url;
///
/// let seed = Url::parse("https://www.saucedemo.com/inventory.html?sort=az#top").unwrap();
/// assert_eq!(base_origin(&seed).as_str(), "https://www.saucedemo.com/");
/// ```
pub fn base_origin(url: &Url) -> Url {
    let mut base = url.clone();
    base.set_path("/");
    base.set_query(None);
    base.set_fragment(None);
    base
}

/// Resolve `href` against `base`; `None` unless the result is HTTP(S).
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    match base.join(href.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            tracing::debug!(href, scheme = url.scheme(), "crawl.link.skipped_scheme");
            None
        }
        Err(e) => {
            tracing::debug!(href, error = %e, "crawl.link.unresolvable");
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub url: Url,
    pub text: String,
}

/// Outcome of one crawl. `pages` keeps document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    pub pages: Vec<PageText>,
    pub links_found: usize,
    pub dropped: usize,
}

impl CrawlResult {
    pub fn joined(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Clone)]
pub struct SiteCrawler {
    fetcher: PageFetcher,
}

impl SiteCrawler {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }

    /// Crawl `seed_url` and its direct links. Never fails; a seed that cannot
    /// be parsed or fetched yields an empty result.
    pub async fn crawl(&self, seed_url: &str) -> CrawlResult {
        let started = Instant::now();

        let seed = match Url::parse(seed_url) {
            Ok(seed) => seed,
            Err(e) => {
                tracing::error!(seed = seed_url, error = %e, "crawl.seed.invalid_url");
                return CrawlResult::default();
            }
        };
        let base = base_origin(&seed);

        let html = match self.fetcher.fetch_html(&seed).await {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(seed = %seed, error = %e, "crawl.seed.fetch_failed");
                return CrawlResult::default();
            }
        };

        let hrefs = anchor_hrefs(&html);
        let links: Vec<Url> = hrefs
            .iter()
            .filter_map(|href| resolve_link(&base, href))
            .collect();
        tracing::info!(
            seed = %seed,
            anchors = hrefs.len(),
            links = links.len(),
            "crawl.seed.parsed"
        );

        let total = links.len();
        let mut result = CrawlResult {
            links_found: hrefs.len(),
            // Anchors that never became fetchable links.
            dropped: hrefs.len() - total,
            ..Default::default()
        };

        for (i, url) in links.into_iter().enumerate() {
            let text = self.fetcher.fetch_text(&url).await;
            tracing::info!(
                index = i + 1,
                total,
                url = %url,
                chars = text.chars().count(),
                "crawl.page.done"
            );
            if text.is_empty() {
                result.dropped += 1;
            } else {
                result.pages.push(PageText { url, text });
            }
        }

        tracing::info!(
            seed = %seed,
            links_found = result.links_found,
            kept = result.pages.len(),
            dropped = result.dropped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "crawl.done"
        );
        result
    }

    /// Concatenated visible text of every page linked from `seed_url`.
    pub async fn crawl_site(&self, seed_url: &str) -> String {
        self.crawl(seed_url).await.joined()
    }
}
