use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::cache::SessionCache;
use crate::config::ReaderConfig;
use crate::news::{Article, NewsQuery, NewsSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakingSettings {
    pub country: String,
    pub max: u32,
    pub interval: Duration,
}

impl Default for BreakingSettings {
    fn default() -> Self {
        Self {
            country: "in".to_string(),
            max: 5,
            interval: Duration::from_secs(120),
        }
    }
}

impl BreakingSettings {
    pub fn from_config(config: &ReaderConfig) -> Self {
        Self {
            country: config.breaking_country.clone(),
            ..Self::default()
        }
    }
}

/// Periodically refreshed top headlines for the ticker.
///
/// The poll task lives as long as this value; dropping it (or calling
/// [`BreakingNewsFeed::deactivate`]) stops all further network calls.
/// An empty headline list means the first fetch has not landed yet.
pub struct BreakingNewsFeed {
    headlines: watch::Receiver<Vec<Article>>,
    task: JoinHandle<()>,
}

impl BreakingNewsFeed {
    pub fn activate(
        source: Arc<dyn NewsSource>,
        cache: Arc<SessionCache>,
        settings: BreakingSettings,
    ) -> Self {
        let (tx, headlines) = watch::channel(Vec::new());
        let query = NewsQuery::breaking(&settings.country, settings.max);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(settings.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if let Some(articles) = refresh(source.as_ref(), &cache, &query).await {
                    tx.send_replace(articles);
                }
            }
        });

        Self { headlines, task }
    }

    pub fn headlines(&self) -> Vec<Article> {
        self.headlines.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.headlines.borrow().is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Article>> {
        self.headlines.clone()
    }

    pub fn deactivate(self) {
        // Drop aborts the poll task.
    }
}

impl Drop for BreakingNewsFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// Returns the list to publish, or None to keep the previous one.
async fn refresh(
    source: &dyn NewsSource,
    cache: &SessionCache,
    query: &NewsQuery,
) -> Option<Vec<Article>> {
    if let Some(cached) = cache.fresh_breaking().await {
        debug!("Cache hit for breaking news");
        return Some(cached);
    }

    match source.headlines(query).await {
        Ok(articles) => {
            cache.store_breaking(articles.clone()).await;
            Some(articles)
        }
        Err(err) => {
            warn!(error = %err, "Error fetching breaking news");
            None
        }
    }
}
