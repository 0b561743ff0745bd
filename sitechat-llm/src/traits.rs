use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sitechat_common::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
    pub finish_reason: Option<String>,
}

/// Sampling parameters sent with every completion request.
///
/// The defaults are the service's fixed policy; only the output budget varies
/// per call.
///
/// ```
/// use sitechat_llm::traits::GenerationParams;
///
/// let params = GenerationParams::default().with_max_output_tokens(512);
/// assert_eq!(params.temperature, 0.9);
/// assert_eq!(params.top_k, 50);
/// assert_eq!(params.max_output_tokens, 512);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            top_p: 1.0,
            top_k: 50,
            max_output_tokens: 2048,
        }
    }
}

impl GenerationParams {
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<LlmResponse>;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}
