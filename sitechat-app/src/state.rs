use anyhow::Context;
use sitechat_config::SitechatConfig;
use sitechat_llm::answer::AnswerGenerator;
use sitechat_llm::gemini::GeminiSettings;
use sitechat_web::{PageFetcher, SiteCrawler};

/// The only site this service crawls.
pub const SEED_URL: &str = "https://www.saucedemo.com/inventory.html";

/// Read-only handles shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub crawler: SiteCrawler,
    pub answers: AnswerGenerator,
    pub seed_url: String,
    pub max_output_tokens: u32,
}

impl AppState {
    pub fn from_config(cfg: &SitechatConfig) -> anyhow::Result<Self> {
        let fetcher = PageFetcher::new(cfg.crawl.fetch_timeout())
            .context("building page fetcher")?;

        let settings = GeminiSettings::new(cfg.llm.api_key.clone(), cfg.llm.model.clone())
            .with_endpoint(cfg.llm.endpoint.clone())
            .with_request_timeout(cfg.llm.request_timeout());
        let client =
            sitechat_llm::build_gemini_client(settings).context("building Gemini client")?;

        Ok(Self {
            crawler: SiteCrawler::new(fetcher),
            answers: AnswerGenerator::new(client),
            seed_url: SEED_URL.to_string(),
            max_output_tokens: cfg.llm.max_output_tokens,
        })
    }
}
