use crate::extract::visible_text;
use sitechat_http::{HttpClient, HttpError, RequestOpts};
use std::time::Duration;
use url::Url;

/// Bytes of a page read before the rest is discarded.
pub const MAX_PAGE_BYTES: usize = 5 * 1024 * 1024;

/// Single-page GET with a uniform timeout.
#[derive(Clone)]
pub struct PageFetcher {
    http: HttpClient,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let http = HttpClient::unanchored()?
            .with_timeout(timeout)
            .with_max_body(MAX_PAGE_BYTES);
        Ok(Self { http })
    }

    /// Raw body of `url`. Error statuses still yield their body (a 404 page
    /// is content too); only transport failures and timeouts are errors.
    pub async fn fetch_html(&self, url: &Url) -> Result<String, HttpError> {
        let page = self.http.get_page(url.as_str(), RequestOpts::default()).await?;
        if !page.status.is_success() {
            tracing::warn!(url = %url, status = %page.status, "fetch.page.error_status");
        }
        Ok(page.body)
    }

    /// Visible text of `url`, or an empty string on any failure.
    pub async fn fetch_text(&self, url: &Url) -> String {
        match self.fetch_html(url).await {
            Ok(html) => {
                let text = visible_text(&html);
                if text.is_empty() {
                    tracing::debug!(url = %url, "fetch.page.no_text");
                }
                text
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, timed_out = e.is_timeout(), "fetch.page.failed");
                String::new()
            }
        }
    }
}
