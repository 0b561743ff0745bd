//! Smoke test against the real Gemini service.
//!
//! Run with `GOOGLE_API_KEY=... cargo test -p sitechat-llm --test gemini_live -- --ignored`.

mod common;

use sitechat_llm::answer::{AnswerGenerator, ERROR_PREFIX};
use sitechat_llm::gemini::GeminiSettings;
use sitechat_llm::DEFAULT_GEMINI_MODEL;

#[tokio::test]
#[ignore = "requires GOOGLE_API_KEY and network access"]
async fn live_answer_over_small_context() {
    common::init_test_tracing();
    let Ok(key) = std::env::var("GOOGLE_API_KEY") else {
        eprintln!("GOOGLE_API_KEY not set; skipping");
        return;
    };

    let client = sitechat_llm::build_gemini_client(GeminiSettings::new(key, DEFAULT_GEMINI_MODEL))
        .expect("client builds");
    let answers = AnswerGenerator::new(client);

    let answer = answers
        .generate_answer(
            "Which product is the cheapest?",
            "Sauce Labs Backpack $29.99 Sauce Labs Onesie $7.99 Sauce Labs Bike Light $9.99",
            256,
        )
        .await;

    assert!(!answer.starts_with(ERROR_PREFIX), "{answer}");
    assert!(!answer.trim().is_empty());
}
