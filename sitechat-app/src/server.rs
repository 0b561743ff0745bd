use crate::state::AppState;
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

const INDEX_HTML: &str = include_str!("index.html");

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub website_text: String,
}

/// Absent and `null` fields both read as empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PredictRequest {
    pub message: Option<String>,
    pub website_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub answer: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/scrape_website", get(scrape_website))
        .route("/predict", post(predict))
        .with_state(Arc::new(state))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn scrape_website(State(state): State<Arc<AppState>>) -> Json<ScrapeResponse> {
    let website_text = state.crawler.crawl_site(&state.seed_url).await;
    tracing::info!(chars = website_text.chars().count(), "scrape.done");
    Json(ScrapeResponse { website_text })
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictRequest>,
) -> Json<PredictResponse> {
    let message = req.message.unwrap_or_default();
    let website_text = req.website_text.unwrap_or_default();
    let answer = state
        .answers
        .generate_answer(message.trim(), &website_text, state.max_output_tokens)
        .await;
    Json(PredictResponse { answer })
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    tracing::info!(addr = ?listener.local_addr().ok(), "server.listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server.stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "server.signal_handler_failed");
        std::future::pending::<()>().await;
    }
    tracing::info!("server.shutdown_requested");
}
