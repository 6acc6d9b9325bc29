pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod llm;
pub mod news;
pub mod pagination;
pub mod reader;
pub mod scraper;
pub mod summary;

use std::sync::Arc;
use tokio::sync::RwLock;

use api::models::SummarizeResponse;
use cache::TimedCache;
use config::Config;
use llm::TextSummarizer;

pub use cache::{SessionCache, NEWS_CACHE_TTL};
pub use error::FeedError;
pub use feed::{BreakingNewsFeed, BreakingSettings, FeedState, FilteredNewsFeed};
pub use news::{Article, FilterKey, NewsClient, NewsQuery, NewsSource, CATEGORIES};
pub use pagination::{PageError, Pagination};
pub use reader::NewsReader;
pub use summary::{
    LoggingSpeech, SpeechSynthesizer, SummaryClient, SummaryController, SummaryResult,
    SummaryState, Summarizer,
};

/// Application state shared across the summarization service's handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub summarizer: Arc<dyn TextSummarizer>,
    pub cache: Arc<RwLock<TimedCache<String, SummarizeResponse>>>,
}

impl AppState {
    pub fn new(config: Config, summarizer: Arc<dyn TextSummarizer>) -> Self {
        let cache = TimedCache::new(config.cache_timeout);
        Self {
            config: Arc::new(config),
            summarizer,
            cache: Arc::new(RwLock::new(cache)),
        }
    }
}
