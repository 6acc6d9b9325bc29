use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use news_digest::{
    config::Config,
    api::routes::create_router,
    llm::OpenRouter,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!(model = %config.model_name, cache_timeout = ?config.cache_timeout, "Configuration loaded");

    let summarizer = Arc::new(OpenRouter::new(
        config.openrouter_api_key.clone(),
        config.model_name.clone(),
    ));
    let app_state = AppState::new(config, summarizer);

    let app = create_router(app_state);
    let listener = TcpListener::bind(server_addr).await?;

    info!(addr = %server_addr, "Summarization service listening");
    axum::serve(listener, app).await?;

    Ok(())
}
