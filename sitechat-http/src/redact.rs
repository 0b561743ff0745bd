//! Log-safe renderings of URLs, headers and whole requests.

use reqwest::header::HeaderMap;
use reqwest::{Method, Url};

pub(crate) const REDACTED: &str = "<redacted>";

const SECRET_NAMES: &[&str] = &[
    "access_token",
    "api_key",
    "auth",
    "authorization",
    "bearer",
    "client_secret",
    "key",
    "secret",
    "token",
    "x-api-key",
    "x-goog-api-key",
];

pub(crate) fn is_secret(name: &str) -> bool {
    SECRET_NAMES
        .iter()
        .any(|secret| secret.eq_ignore_ascii_case(name))
}

/// Header pairs with secret or sensitive values masked.
pub(crate) fn headers(map: &HeaderMap) -> Vec<(String, String)> {
    map.iter()
        .map(|(name, value)| {
            let shown = if value.is_sensitive() || is_secret(name.as_str()) {
                REDACTED
            } else {
                value.to_str().unwrap_or("<binary>")
            };
            (name.as_str().to_string(), shown.to_string())
        })
        .collect()
}

/// `url` with secret query values masked.
pub(crate) fn url(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if is_secret(&k) {
                REDACTED.to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    let mut out = url.clone();
    if pairs.is_empty() {
        out.set_query(None);
    } else {
        out.query_pairs_mut().clear().extend_pairs(pairs);
    }
    out
}

/// A shell-pasteable `curl` line for the request, secrets masked.
pub(crate) fn curl(
    method: &Method,
    target: &Url,
    map: &HeaderMap,
    body: Option<&[u8]>,
    max_body: usize,
) -> String {
    let quote = |s: &str| format!("'{}'", s.replace('\'', r"'\''"));

    let mut line = format!("curl -X{method}");
    for (name, value) in headers(map) {
        line.push_str(" -H ");
        line.push_str(&quote(&format!("{name}: {value}")));
    }
    match body.map(std::str::from_utf8) {
        Some(Ok(text)) => {
            let mut text = text.to_string();
            if text.len() > max_body {
                crate::truncate_on_char_boundary(&mut text, max_body);
                text.push('…');
            }
            line.push_str(" -d ");
            line.push_str(&quote(&text));
        }
        Some(Err(_)) => {
            let len = body.map_or(0, <[u8]>::len);
            line.push_str(&format!(" --data-binary @- # ({len} bytes)"));
        }
        None => {}
    }
    line.push(' ');
    line.push_str(&quote(url(target).as_str()));
    line
}
