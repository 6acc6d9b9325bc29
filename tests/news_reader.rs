//! End-to-end tests for the reader against mocked news and summary services.
//!
//! The news API is played by wiremock. Summaries go either to a wiremock stub
//! or to the real `/summarize` router bound on a local port.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use news_digest::api::routes::create_router;
use news_digest::config::{Config, ReaderConfig};
use news_digest::llm::TextSummarizer;
use news_digest::{
    AppState, FeedError, FeedState, FilterKey, LoggingSpeech, NewsClient, NewsReader,
    SessionCache, SummaryClient, SummaryResult, SummaryState,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn article_json(i: usize) -> serde_json::Value {
    json!({
        "title": format!("Headline {i}"),
        "description": format!("Description {i}"),
        "content": format!("Content {i}"),
        "url": format!("https://news.example.com/{i}"),
        "image": format!("https://news.example.com/{i}.jpg"),
        "publishedAt": "2024-05-01T08:30:00Z",
        "source": {"name": "Example", "url": "https://news.example.com"}
    })
}

async fn news_server(articles: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "articles": articles })))
        .mount(&server)
        .await;
    server
}

fn reader(news: &MockServer, summary_url: String) -> NewsReader {
    NewsReader::new(
        Arc::new(NewsClient::new(news.uri(), Some("test-key".to_string()))),
        Arc::new(SummaryClient::new(summary_url)),
        Arc::new(LoggingSpeech),
        Arc::new(SessionCache::new()),
        6,
    )
}

async fn wait_for_feed(reader: &NewsReader) -> FeedState {
    let mut rx = reader.feed().subscribe();
    rx.wait_for(|state| !state.loading).await.unwrap().clone()
}

async fn wait_for_summary(reader: &NewsReader) -> SummaryState {
    let mut rx = reader.summary().subscribe();
    rx.wait_for(|state| !matches!(state, SummaryState::Pending { .. }))
        .await
        .unwrap()
        .clone()
}

#[tokio::test]
async fn test_empty_articles_yield_empty_page() {
    let news = news_server(json!([])).await;
    let mut reader = reader(&news, "http://127.0.0.1:9".to_string());

    let state = wait_for_feed(&reader).await;
    assert_eq!(state.articles, Vec::new());
    assert!(!state.loading);
    assert_eq!(state.error, None);

    assert_eq!(reader.total_pages(), 0);
    assert!(reader.visible_articles().is_empty());
    assert!(!reader.has_next());
}

#[tokio::test]
async fn test_thirteen_articles_page_six_six_one() {
    let articles: Vec<_> = (1..=13).map(article_json).collect();
    let news = news_server(json!(articles)).await;
    let mut reader = reader(&news, "http://127.0.0.1:9".to_string());
    wait_for_feed(&reader).await;

    assert_eq!(reader.total_pages(), 3);
    assert_eq!(reader.visible_articles().len(), 6);
    reader.next_page().unwrap();
    assert_eq!(reader.visible_articles().len(), 6);
    reader.next_page().unwrap();
    assert_eq!(reader.visible_articles().len(), 1);
    assert!(reader.go_to_page(4).is_err());
    assert!(reader.go_to_page(0).is_err());
}

#[tokio::test]
async fn test_reader_from_config_uses_configured_page_size() {
    let articles: Vec<_> = (1..=10).map(article_json).collect();
    let news = news_server(json!(articles)).await;
    let news_url = news.uri();
    let config = ReaderConfig::from_lookup(|key| match key {
        "NEWS_API_KEY" => Some("test-key".to_string()),
        "NEWS_API_URL" => Some(news_url.clone()),
        "SUMMARY_API_URL" => Some("http://127.0.0.1:9".to_string()),
        "PAGE_SIZE" => Some("4".to_string()),
        _ => None,
    })
    .unwrap();

    let mut reader = NewsReader::from_config(
        &config,
        Arc::new(LoggingSpeech),
        Arc::new(SessionCache::new()),
    );
    let state = wait_for_feed(&reader).await;
    assert_eq!(state.error, None);

    assert_eq!(reader.total_pages(), 3);
    assert_eq!(reader.visible_articles().len(), 4);
    reader.go_to_page(3).unwrap();
    assert_eq!(reader.visible_articles().len(), 2);
}

#[tokio::test]
async fn test_repeated_filter_is_served_from_cache() {
    let news = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("topic", "sports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"articles": [article_json(1)]})))
        .expect(1)
        .mount(&news)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"articles": []})))
        .mount(&news)
        .await;

    let mut reader = reader(&news, "http://127.0.0.1:9".to_string());
    wait_for_feed(&reader).await;

    reader.select_category("sports");
    wait_for_feed(&reader).await;
    reader.search("weather");
    wait_for_feed(&reader).await;
    reader.select_category("sports");
    let state = wait_for_feed(&reader).await;

    assert_eq!(state.articles.len(), 1);
    // `expect(1)` is verified when the mock server drops.
}

#[tokio::test]
async fn test_news_api_error_is_surfaced() {
    let news = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&news)
        .await;

    let reader = reader(&news, "http://127.0.0.1:9".to_string());
    let state = wait_for_feed(&reader).await;

    assert!(state.articles.is_empty());
    assert_eq!(state.error, Some(FeedError::status(429)));
    assert_eq!(state.error.unwrap().to_string(), "Error: 429");
}

#[tokio::test]
async fn test_missing_news_key_is_surfaced() {
    let news = news_server(json!([article_json(1)])).await;
    let reader = NewsReader::new(
        Arc::new(NewsClient::new(news.uri(), None)),
        Arc::new(SummaryClient::new("http://127.0.0.1:9")),
        Arc::new(LoggingSpeech),
        Arc::new(SessionCache::new()),
        6,
    );

    let state = wait_for_feed(&reader).await;
    assert_eq!(state.error, Some(FeedError::MissingCredential));
}

#[tokio::test]
async fn test_summary_uses_article_title_and_image() {
    let news = news_server(json!([article_json(1)])).await;
    let summary = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "x"})))
        .mount(&summary)
        .await;

    let mut reader = reader(&news, summary.uri());
    wait_for_feed(&reader).await;
    assert!(reader.summarize_visible(0));

    assert_eq!(
        wait_for_summary(&reader).await,
        SummaryState::Success(SummaryResult {
            title: "Headline 1".to_string(),
            image: "https://news.example.com/1.jpg".to_string(),
            summary: "x".to_string(),
        })
    );
    assert!(reader.speak_summary());

    reader.close_summary();
    assert_eq!(reader.summary_state(), SummaryState::Idle);
}

#[tokio::test]
async fn test_summary_service_unreachable() {
    let news = news_server(json!([article_json(1)])).await;
    let mut reader = reader(&news, "http://127.0.0.1:9".to_string());
    wait_for_feed(&reader).await;

    reader.summarize_visible(0);
    match wait_for_summary(&reader).await {
        SummaryState::Failed(message) => assert!(message.starts_with("Server error")),
        other => panic!("unexpected state: {:?}", other),
    }
}

struct FixedSummarizer;

#[async_trait]
impl TextSummarizer for FixedSummarizer {
    async fn complete(&self, _prompt: &str) -> news_digest::error::Result<String> {
        Ok("generated".to_string())
    }
}

#[tokio::test]
async fn test_reader_against_local_summarization_service() {
    let config = Config {
        server_addr: "127.0.0.1:0".parse().unwrap(),
        openrouter_api_key: "sk-test".to_string(),
        model_name: "test-model".to_string(),
        cache_timeout: Duration::from_secs(300),
    };
    let app = create_router(AppState::new(config, Arc::new(FixedSummarizer)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // The article URL is unreachable, so the service falls back to the
    // supplied content, which is short enough to be returned raw.
    let news = news_server(json!([{
        "title": "Local",
        "url": "http://127.0.0.1:9/local",
        "content": "Council approves new park. Read more [300 chars]",
        "image": "https://img.example.com/park.jpg"
    }]))
    .await;

    let mut reader = reader(&news, format!("http://{}", addr));
    wait_for_feed(&reader).await;
    assert_eq!(reader.filter(), &FilterKey::default());
    reader.summarize_visible(0);

    assert_eq!(
        wait_for_summary(&reader).await,
        SummaryState::Success(SummaryResult {
            title: "Local".to_string(),
            image: "https://img.example.com/park.jpg".to_string(),
            summary: "Council approves new park.".to_string(),
        })
    );

    server.abort();
}
