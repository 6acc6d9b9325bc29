use axum::{
    routing::post,
    Router,
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_http::cors::{CorsLayer, Any};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::error::{Result, AppError};
use crate::api::models::{SummarizeRequest, SummarizeResponse};
use crate::scraper::{build_prompt, clean_text, scrape_article, word_count};
use crate::AppState;

const HANDLER_TIMEOUT: Duration = Duration::from_secs(90);
// Scraped text needs this many words to be summarized as an article.
const MIN_ARTICLE_WORDS: usize = 200;
// Supplied content at or under this many words is returned as-is.
const FALLBACK_WORDS: usize = 30;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/summarize", post(summarize_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn summarize_handler(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Response {
    let start_time = Instant::now();
    let url = req.url.clone().unwrap_or_default();
    info!(url = %url, "Processing summarize request");

    // Set an overall timeout for the entire handler
    let result = tokio::time::timeout(HANDLER_TIMEOUT, process_summarize_request(&state, &req)).await;
    debug!(elapsed = ?start_time.elapsed(), url = %url, "Summarize request finished");

    match result {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(err)) => {
            error!(url = %url, error = %err, "Summarize request failed");
            err.into_response()
        }
        Err(_) => {
            error!(url = %url, "Summarize request timed out");
            (
                StatusCode::REQUEST_TIMEOUT,
                Json(serde_json::json!({ "error": "Request processing timed out" })),
            )
                .into_response()
        }
    }
}

async fn process_summarize_request(state: &AppState, req: &SummarizeRequest) -> Result<SummarizeResponse> {
    let url = req.url.as_deref().unwrap_or_default().trim();
    let content = req.content.as_deref().unwrap_or_default().trim();
    let cache_key = format!("{}{}", url, content);

    {
        let cache = state.cache.read().await;
        if let Some(cached) = cache.get_fresh(&cache_key) {
            debug!(url = %url, "Cache hit");
            return Ok(cached.clone());
        }
    }

    if url.is_empty() {
        return Err(AppError::FetchError("No URL provided".to_string()));
    }

    match scrape_article(url).await {
        Ok(article) => {
            let words = article.word_count();
            debug!(url = %url, words, "Scraped article");
            if words >= MIN_ARTICLE_WORDS {
                match state.summarizer.complete(&build_prompt(&article.text, 90, 150)).await {
                    Ok(summary) => {
                        let response = SummarizeResponse::from_article(article.title, summary);
                        return Ok(store(state, cache_key, response).await);
                    }
                    Err(err) => warn!(url = %url, error = %err, "Article summarization failed"),
                }
            }
        }
        Err(err) => warn!(url = %url, error = %err, "Scraping failed"),
    }

    // Fall back to the content the news API supplied.
    let fallback_text = clean_text(content);
    let words = word_count(&fallback_text);
    debug!(url = %url, words, "Using fallback content");

    if !fallback_text.is_empty() && words >= FALLBACK_WORDS {
        match state.summarizer.complete(&build_prompt(&fallback_text, 20, 40)).await {
            Ok(summary) => {
                let response = SummarizeResponse::fallback_summary(summary);
                return Ok(store(state, cache_key, response).await);
            }
            Err(err) => warn!(url = %url, error = %err, "Fallback summarization failed"),
        }
    }

    if !fallback_text.is_empty() && words <= FALLBACK_WORDS {
        let response = SummarizeResponse::fallback_raw(fallback_text);
        return Ok(store(state, cache_key, response).await);
    }

    Err(AppError::InsufficientData("No sufficient data to summarize".to_string()))
}

async fn store(state: &AppState, key: String, response: SummarizeResponse) -> SummarizeResponse {
    state.cache.write().await.put(key, response.clone());
    response
}
