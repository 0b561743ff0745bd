//! Grounded question answering over crawled site text.

use crate::traits::{GenerationParams, LlmClient};
use std::sync::Arc;

/// Upper bound on context characters embedded in a prompt.
pub const MAX_CONTEXT_CHARS: usize = 13_000;

/// Prefix of the string returned in place of an answer when the provider fails.
pub const ERROR_PREFIX: &str = "Error generating response: ";

const PROMPT_PREVIEW_CHARS: usize = 100;

/// First `limit` characters of `context` (characters, not bytes or tokens).
///
/// ```
/// use sitechat_llm::answer::truncate_context;
///
/// assert_eq!(truncate_context("héllo world", 5), "héllo");
/// assert_eq!(truncate_context("short", 100), "short");
/// ```
pub fn truncate_context(context: &str, limit: usize) -> &str {
    match context.char_indices().nth(limit) {
        Some((byte_idx, _)) => &context[..byte_idx],
        None => context,
    }
}

/// Prompt shape: the context block, then the literal query.
pub fn build_prompt(query: &str, context: &str) -> String {
    format!("Context: {context}...\n\n{query}")
}

/// Turns a question plus site text into an answer string.
///
/// Never fails: provider errors come back as `"Error generating response: <cause>"`.
#[derive(Clone)]
pub struct AnswerGenerator {
    client: Arc<dyn LlmClient>,
    params: GenerationParams,
    context_limit: usize,
}

impl AnswerGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            params: GenerationParams::default(),
            context_limit: MAX_CONTEXT_CHARS,
        }
    }

    pub async fn generate_answer(&self, query: &str, context: &str, max_tokens: u32) -> String {
        let context = truncate_context(context, self.context_limit);
        let prompt = build_prompt(query, context);
        let params = self.params.with_max_output_tokens(max_tokens);

        tracing::info!(
            model = %self.client.model_name(),
            context_chars = context.chars().count(),
            query_chars = query.chars().count(),
            max_tokens,
            "answer.generate.start"
        );
        tracing::debug!(
            prompt_preview = %truncate_context(&prompt, PROMPT_PREVIEW_CHARS),
            "answer.generate.prompt"
        );

        match self.client.generate(&prompt, &params).await {
            Ok(resp) => {
                tracing::info!(
                    answer_chars = resp.text.chars().count(),
                    tokens_used = ?resp.tokens_used,
                    "answer.generate.done"
                );
                tracing::debug!(answer = %resp.text, "answer.generate.text");
                resp.text
            }
            Err(e) => {
                tracing::error!(error = %e, "answer.generate.failed");
                format!("{ERROR_PREFIX}{e}")
            }
        }
    }
}
