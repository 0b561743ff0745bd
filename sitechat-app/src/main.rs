use anyhow::{Context, Result};
use clap::Parser;
use sitechat_app::args::Args;
use sitechat_app::env_file::EnvFile;
use sitechat_app::server;
use sitechat_app::state::AppState;
use sitechat_common::observability::{LogConfig, init_logging};
use sitechat_config::SitechatConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so GOOGLE_API_KEY can live there
    let env_file = EnvFile::load();
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => SitechatConfigLoader::new().with_file(path),
        None => SitechatConfigLoader::new().with_optional_file("sitechat.yaml"),
    };
    let mut cfg = loader.load().context("loading configuration")?;
    if let Some(bind) = args.bind {
        cfg.server.bind = bind;
    }

    let log_path = init_logging(LogConfig {
        app_name: "sitechat",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.emit_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    })?;
    env_file.log();
    tracing::info!(log = %log_path.display(), model = %cfg.llm.model, "sitechat.start");

    let state = AppState::from_config(&cfg)?;
    let listener = tokio::net::TcpListener::bind(&cfg.server.bind)
        .await
        .with_context(|| format!("binding {}", cfg.server.bind))?;

    server::serve(listener, server::router(state)).await
}
