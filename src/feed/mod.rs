//! Feeds publish fetched headlines plus their loading and error state
//! through `tokio::sync::watch` channels.

pub mod breaking;
pub mod filtered;

pub use breaking::{BreakingNewsFeed, BreakingSettings};
pub use filtered::{FeedState, FilteredNewsFeed};

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::error::FeedError;
    use crate::news::{Article, NewsQuery, NewsSource};

    pub fn article(url: &str, title: &str) -> Article {
        Article {
            url: url.to_string(),
            title: title.to_string(),
            image: format!("{url}/image.png"),
            ..Article::default()
        }
    }

    /// In-memory news source with per-query delays and scripted failures.
    #[derive(Default)]
    pub struct FakeSource {
        calls: AtomicUsize,
        responses: Mutex<HashMap<Option<String>, Result<Vec<Article>, FeedError>>>,
        delays: Mutex<HashMap<Option<String>, Duration>>,
    }

    impl FakeSource {
        // Responses are keyed by the query's topic, or by `q` when no topic is set.
        pub fn respond(&self, key: Option<&str>, result: Result<Vec<Article>, FeedError>) {
            self.responses
                .lock()
                .unwrap()
                .insert(key.map(str::to_string), result);
        }

        pub fn delay(&self, key: Option<&str>, delay: Duration) {
            self.delays
                .lock()
                .unwrap()
                .insert(key.map(str::to_string), delay);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NewsSource for FakeSource {
        async fn headlines(&self, query: &NewsQuery) -> Result<Vec<Article>, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let key = query.topic.clone().or_else(|| query.q.clone());

            let delay = self.delays.lock().unwrap().get(&key).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            self.responses
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }
}
