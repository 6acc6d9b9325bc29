use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SessionCache;
use crate::error::FeedError;
use crate::news::{Article, FilterKey, NewsQuery, NewsSource};

/// What the filtered feed currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    pub filter: FilterKey,
    pub articles: Vec<Article>,
    pub loading: bool,
    pub error: Option<FeedError>,
}

/// Headlines for one (category, search term) filter at a time.
///
/// Every filter change starts a new fetch cycle tagged with a generation.
/// A completion only lands if its generation is still the latest one, so a
/// slow response for an old filter never overwrites a newer result. The
/// previous in-flight task is also aborted.
pub struct FilteredNewsFeed {
    source: Arc<dyn NewsSource>,
    cache: Arc<SessionCache>,
    state: Arc<watch::Sender<FeedState>>,
    generation: Arc<AtomicU64>,
    in_flight: Option<JoinHandle<()>>,
}

impl FilteredNewsFeed {
    pub fn new(source: Arc<dyn NewsSource>, cache: Arc<SessionCache>) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self {
            source,
            cache,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: None,
        }
    }

    pub fn set_filter(&mut self, filter: FilterKey) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }

        let mut current = 0;
        self.state.send_modify(|state| {
            current = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = FeedState {
                filter: filter.clone(),
                articles: Vec::new(),
                loading: true,
                error: None,
            };
        });

        let source = self.source.clone();
        let cache = self.cache.clone();
        let state = self.state.clone();
        let generation = self.generation.clone();

        self.in_flight = Some(tokio::spawn(async move {
            let outcome = load(source.as_ref(), &cache, &filter).await;

            state.send_if_modified(|state| {
                if generation.load(Ordering::SeqCst) != current {
                    debug!(filter = ?filter, "Discarding result for superseded filter");
                    return false;
                }
                state.loading = false;
                match outcome {
                    Ok(articles) => {
                        state.articles = articles;
                        state.error = None;
                    }
                    Err(err) => {
                        state.articles = Vec::new();
                        state.error = Some(err);
                    }
                }
                true
            });
        }));
    }

    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }
}

impl Drop for FilteredNewsFeed {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}

async fn load(
    source: &dyn NewsSource,
    cache: &SessionCache,
    filter: &FilterKey,
) -> Result<Vec<Article>, FeedError> {
    let key = filter.cache_key();

    if let Some(cached) = cache.fresh_filtered(&key).await {
        debug!(key = %key, "Cache hit for filtered news");
        return Ok(cached);
    }

    info!(key = %key, "Fetching filtered news");
    let articles = source.headlines(&NewsQuery::filtered(filter)).await?;
    cache.store_filtered(key, articles.clone()).await;
    Ok(articles)
}
