use crate::safety::SafetySettings;
use crate::traits::{GenerationParams, LlmClient, LlmResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use sitechat_common::{Result, SitechatError};
use sitechat_http::{HttpClient, HttpError, RequestOpts};
use std::time::Duration;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
    safety_settings: &'a SafetySettings,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl From<&GenerationParams> for GeminiGenerationConfig {
    fn from(p: &GenerationParams) -> Self {
        Self {
            temperature: p.temperature,
            top_p: p.top_p,
            top_k: p.top_k,
            max_output_tokens: p.max_output_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    total_token_count: Option<u32>,
}

/// Everything the Gemini client needs, fixed at construction.
#[derive(Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub request_timeout: Duration,
    pub safety: SafetySettings,
}

impl GeminiSettings {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            endpoint: GEMINI_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
            safety: SafetySettings::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Google Gemini `generateContent` client.
///
/// Requires a valid API key and internet access.
pub struct GeminiClient {
    http: HttpClient,
    api_key: HeaderValue,
    model: String,
    safety: SafetySettings,
}

impl GeminiClient {
    /// Create a new client from immutable settings.
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        let mut endpoint = settings.endpoint;
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        let http = HttpClient::new(&endpoint)
            .map_err(|e| SitechatError::Config(format!("Failed to create HTTP client: {e}")))?
            .with_timeout(settings.request_timeout);

        let mut api_key = HeaderValue::from_str(settings.api_key.trim())
            .map_err(|e| SitechatError::Config(format!("API key is not a valid header: {e}")))?;
        api_key.set_sensitive(true);

        Ok(Self {
            http,
            api_key,
            model: settings.model,
            safety: settings.safety,
        })
    }
}

fn map_http_error(err: HttpError) -> SitechatError {
    let msg = match err {
        HttpError::Api {
            status, message, ..
        } => match status {
            StatusCode::TOO_MANY_REQUESTS => format!("Rate limit exceeded: {message}"),
            StatusCode::UNAUTHORIZED => format!("Invalid API key: {message}"),
            StatusCode::FORBIDDEN => format!("API access forbidden: {message}"),
            _ => format!("Gemini API error ({status}): {message}"),
        },
        HttpError::Decode(e, _) => format!("Failed to parse Gemini response: {e}"),
        other => format!("Gemini request failed: {other}"),
    };
    SitechatError::Provider(msg)
}

fn into_llm_response(resp: GeminiResponse, model: &str) -> Result<LlmResponse> {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(SitechatError::Provider(format!(
            "Prompt blocked by Gemini: {reason}"
        )));
    }

    let candidate = resp.candidates.into_iter().next().ok_or_else(|| {
        SitechatError::Provider("No candidates returned from Gemini".to_string())
    })?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(SitechatError::Provider(
            "Content blocked by Gemini safety filters".to_string(),
        ));
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(SitechatError::Provider(format!(
            "No text in Gemini response (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(LlmResponse {
        text,
        model: Some(model.to_string()),
        tokens_used: resp.usage_metadata.and_then(|u| u.total_token_count),
        finish_reason: candidate.finish_reason,
    })
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<LlmResponse> {
        let path = format!("models/{}:generateContent", self.model);

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: params.into(),
            safety_settings: &self.safety,
        };

        let opts = RequestOpts::default()
            .secret_header(HeaderName::from_static(API_KEY_HEADER), self.api_key.clone());

        tracing::debug!(model = %self.model, prompt_chars = prompt.chars().count(), "gemini.generate.start");

        let resp: GeminiResponse = self
            .http
            .post_json(&path, &request, opts)
            .await
            .map_err(map_http_error)?;

        let out = into_llm_response(resp, &self.model)?;
        tracing::debug!(
            model = %self.model,
            tokens_used = ?out.tokens_used,
            finish_reason = ?out.finish_reason,
            "gemini.generate.done"
        );
        Ok(out)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
