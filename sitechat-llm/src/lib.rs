//! Completion-provider integration for sitechat.
//!
//! This crate exposes the [`traits::LlmClient`] interface, the Gemini
//! implementation, the fixed safety policy, and the [`answer::AnswerGenerator`]
//! that turns a question plus crawled text into an answer string.
//!
//! # Examples
//! ```no_run
//! use sitechat_llm::answer::AnswerGenerator;
//! use sitechat_llm::gemini::GeminiSettings;
//!
//! # #[tokio::main]
//! # async fn main() -> sitechat_common::Result<()> {
//! let client = sitechat_llm::build_gemini_client(GeminiSettings::new("key", "gemini-2.5-flash"))?;
//! let answers = AnswerGenerator::new(client);
//! let answer = answers.generate_answer("What is for sale?", "Sauce Labs Backpack", 256).await;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```
pub mod answer;
pub mod gemini;
pub mod safety;
pub mod traits;

use gemini::{GeminiClient, GeminiSettings};
use std::sync::Arc;
use traits::LlmClient;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Build the shared Gemini client from immutable settings.
pub fn build_gemini_client(settings: GeminiSettings) -> sitechat_common::Result<Arc<dyn LlmClient>> {
    tracing::info!(model = %settings.model, endpoint = %settings.endpoint, "llm.gemini.init");
    let client = GeminiClient::new(settings)?;
    Ok(Arc::new(client))
}
