//! Single-attempt HTTP client with log-safe tracing.
//!
//! Every call makes exactly one request; failures go back to the caller
//! untouched. Secret headers and query values never reach the logs. Setting
//! `SITECHAT_HTTP_RAW=1` additionally logs a `curl` line per request and the
//! raw response (target `http.raw`).
//!
//! ```no_run
//! # async fn demo() -> Result<(), sitechat_http::HttpError> {
//! let client = sitechat_http::HttpClient::unanchored()?;
//! let html = client
//!     .get_text("https://www.example.com/", sitechat_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```

mod error;
mod redact;

pub use error::HttpError;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use uuid::Uuid;

const RAW_ENV: &str = "SITECHAT_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

fn raw_enabled() -> bool {
    std::env::var(RAW_ENV)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Per-request overrides.
///
/// ```
/// use reqwest::header::{HeaderName, HeaderValue};
/// use sitechat_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts::default()
///     .timeout(Duration::from_secs(10))
///     .secret_header(
///         HeaderName::from_static("x-goog-api-key"),
///         HeaderValue::from_static("demo"),
///     );
/// assert_eq!(opts.timeout, Some(Duration::from_secs(10)));
/// assert!(opts.headers["x-goog-api-key"].is_sensitive());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts {
    pub timeout: Option<Duration>,
    pub headers: HeaderMap,
}

impl RequestOpts {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Header whose value is marked sensitive and masked in every log line.
    pub fn secret_header(self, name: HeaderName, mut value: HeaderValue) -> Self {
        value.set_sensitive(true);
        self.header(name, value)
    }
}

/// Response of [`HttpClient::get_page`].
#[derive(Debug, Clone)]
pub struct Page {
    pub status: StatusCode,
    /// Lossy UTF-8, cut at the client's body cap when `truncated`.
    pub body: String,
    pub truncated: bool,
}

#[derive(Clone)]
pub struct HttpClient {
    base: Option<Url>,
    inner: Client,
    pub default_timeout: Duration,
    max_body: Option<usize>,
}

impl HttpClient {
    /// Client whose relative paths are joined onto `base`.
    ///
    /// ```
    /// use sitechat_http::HttpClient;
    ///
    /// let client = HttpClient::new("https://api.example.com/v1beta/").unwrap();
    /// assert_eq!(
    ///     client.resolve("models/m:generateContent").unwrap().as_str(),
    ///     "https://api.example.com/v1beta/models/m:generateContent"
    /// );
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(format!("{base}: {e}")))?;
        Self::build(Some(base))
    }

    /// Client that only accepts absolute URLs.
    pub fn unanchored() -> Result<Self, HttpError> {
        Self::build(None)
    }

    fn build(base: Option<Url>) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("sitechat/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base,
            inner,
            default_timeout: DEFAULT_TIMEOUT,
            max_body: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Stop reading response bodies after `bytes`; the rest is discarded.
    pub fn with_max_body(mut self, bytes: usize) -> Self {
        self.max_body = Some(bytes);
        self
    }

    pub fn resolve(&self, path: &str) -> Result<Url, HttpError> {
        let joined = match &self.base {
            Some(base) => base.join(path),
            None => Url::parse(path),
        };
        joined.map_err(|e| HttpError::Url(format!("{path}: {e}")))
    }

    /// GET `path` and return the body as text. Invalid UTF-8 is replaced.
    /// Non-2xx statuses are [`HttpError::Api`].
    pub async fn get_text(&self, path: &str, opts: RequestOpts) -> Result<String, HttpError> {
        let bytes = self.send(Method::GET, path, None, opts).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// GET `path` and return whatever the server sent, whatever the status.
    /// Only transport failures and timeouts are errors.
    pub async fn get_page(&self, path: &str, opts: RequestOpts) -> Result<Page, HttpError> {
        let exchange = self.exchange(Method::GET, path, None, opts).await?;
        Ok(Page {
            status: exchange.status,
            body: String::from_utf8_lossy(&exchange.body).into_owned(),
            truncated: exchange.truncated,
        })
    }

    /// POST `body` as JSON and decode a JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B, opts: RequestOpts) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)
            .map_err(|e| HttpError::Build(format!("serialize body: {e}")))?;
        let bytes = self.send(Method::POST, path, Some(payload), opts).await?;

        serde_json::from_slice(&bytes).map_err(|e| {
            let snippet = snip_body(&bytes);
            tracing::warn!(
                line = e.line(),
                column = e.column(),
                error = %e,
                body_snippet = %snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        opts: RequestOpts,
    ) -> Result<Vec<u8>, HttpError> {
        let exchange = self.exchange(method, path, body, opts).await?;
        if exchange.status.is_success() {
            return Ok(exchange.body);
        }

        let message = error_message(&exchange.body);
        tracing::warn!(
            req_id = %exchange.req_id,
            status = %exchange.status,
            %message,
            server_id = %exchange.server_id,
            "http.status_error"
        );
        Err(HttpError::Api {
            status: exchange.status,
            message,
            request_id: exchange.server_id,
        })
    }

    async fn exchange(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        opts: RequestOpts,
    ) -> Result<Exchange, HttpError> {
        let url = self.resolve(path)?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);

        let mut headers = opts.headers;
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let req_id = format!("r{}", &Uuid::new_v4().simple().to_string()[..12]);
        let secret_headers = headers.values().filter(|v| v.is_sensitive()).count();
        tracing::debug!(
            %req_id,
            %method,
            url = %redact::url(&url),
            timeout_ms = timeout.as_millis() as u64,
            secret_headers,
            body_len = body.as_ref().map_or(0, Vec::len),
            "http.request.start"
        );
        if raw_enabled() {
            let curl = redact::curl(&method, &url, &headers, body.as_deref(), RAW_MAX_BODY);
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        let mut request = self
            .inner
            .request(method, url)
            .timeout(timeout)
            .headers(headers);
        if let Some(bytes) = body {
            request = request.body(bytes);
        }

        let started = Instant::now();
        let mut response = request.send().await.map_err(|e| {
            let err = HttpError::from(e);
            tracing::warn!(%req_id, error = %err, "http.send_failed");
            err
        })?;
        let status = response.status();
        let resp_headers = response.headers().clone();

        let mut bytes = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            let err = HttpError::from(e);
            tracing::warn!(%req_id, error = %err, "http.body_failed");
            err
        })? {
            let room = self.max_body.map_or(usize::MAX, |max| max - bytes.len());
            if chunk.len() > room {
                bytes.extend_from_slice(&chunk[..room]);
                truncated = true;
                break;
            }
            bytes.extend_from_slice(&chunk);
        }
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let server_id = resp_headers
            .get("x-request-id")
            .or_else(|| resp_headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        tracing::debug!(
            %req_id,
            %status,
            elapsed_ms,
            body_len = bytes.len(),
            content_type = ?resp_headers.get(CONTENT_TYPE),
            server_id = %server_id,
            "http.response"
        );
        if truncated {
            tracing::warn!(%req_id, max_body = ?self.max_body, "http.response.truncated");
        }
        if raw_enabled() {
            let shown = &bytes[..bytes.len().min(RAW_MAX_BODY)];
            tracing::debug!(
                target: "http.raw",
                %req_id,
                %status,
                headers = ?redact::headers(&resp_headers),
                body = %String::from_utf8_lossy(shown),
                truncated = bytes.len() > RAW_MAX_BODY,
                "response"
            );
        }

        Ok(Exchange {
            req_id,
            status,
            server_id,
            body: bytes,
            truncated,
        })
    }
}

struct Exchange {
    req_id: String,
    status: StatusCode,
    server_id: String,
    body: Vec<u8>,
    truncated: bool,
}

/// Best human-readable message in an error body.
///
/// Understands the Google envelope (`{"error":{"message":..}}`) and flat
/// `message`/`detail`/`error` strings; anything else falls back to a snippet.
fn error_message(body: &[u8]) -> String {
    let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) else {
        return snip_body(body);
    };
    [
        json.pointer("/error/message"),
        json.get("message"),
        json.get("detail"),
        json.get("error"),
    ]
    .into_iter()
    .flatten()
    .filter_map(serde_json::Value::as_str)
    .find(|m| !m.is_empty())
    .map_or_else(|| snip_body(body), str::to_string)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).into_owned();
    if snip.len() > SNIPPET_MAX {
        truncate_on_char_boundary(&mut snip, SNIPPET_MAX);
        snip.push_str("...");
    }
    snip
}

pub(crate) fn truncate_on_char_boundary(s: &mut String, max: usize) {
    let mut cut = max.min(s.len());
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}
