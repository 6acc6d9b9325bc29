use std::sync::Arc;

use tracing::debug;

use crate::cache::SessionCache;
use crate::config::ReaderConfig;
use crate::feed::{FeedState, FilteredNewsFeed};
use crate::news::{Article, FilterKey, NewsClient, NewsSource};
use crate::pagination::{PageError, Pagination};
use crate::summary::{
    SpeechSynthesizer, SummaryClient, SummaryController, SummaryState, Summarizer,
};

/// The headline list screen: filter selection, paging and the summary view.
///
/// Category and search are mutually exclusive here. Picking one clears the
/// other, jumps back to page 1 and closes any open summary.
pub struct NewsReader {
    filter: FilterKey,
    feed: FilteredNewsFeed,
    pagination: Pagination,
    summary: SummaryController,
}

impl NewsReader {
    pub fn new(
        source: Arc<dyn NewsSource>,
        summarizer: Arc<dyn Summarizer>,
        speech: Arc<dyn SpeechSynthesizer>,
        cache: Arc<SessionCache>,
        page_size: usize,
    ) -> Self {
        let mut reader = Self {
            filter: FilterKey::default(),
            feed: FilteredNewsFeed::new(source, cache),
            pagination: Pagination::new(page_size),
            summary: SummaryController::new(summarizer, speech),
        };
        reader.feed.set_filter(reader.filter.clone());
        reader
    }

    /// Builds a reader on the HTTP news and summary clients described by `config`.
    pub fn from_config(
        config: &ReaderConfig,
        speech: Arc<dyn SpeechSynthesizer>,
        cache: Arc<SessionCache>,
    ) -> Self {
        Self::new(
            Arc::new(NewsClient::from_config(config)),
            Arc::new(SummaryClient::from_config(config)),
            speech,
            cache,
            config.page_size,
        )
    }

    pub fn select_category(&mut self, category: &str) {
        self.apply_filter(FilterKey::category(category));
    }

    pub fn search(&mut self, term: &str) {
        self.apply_filter(FilterKey::search(term));
    }

    fn apply_filter(&mut self, filter: FilterKey) {
        debug!(filter = ?filter, "Filter changed");
        self.summary.close();
        self.pagination.reset();
        self.filter = filter.clone();
        self.feed.set_filter(filter);
    }

    pub fn filter(&self) -> &FilterKey {
        &self.filter
    }

    pub fn feed_state(&self) -> FeedState {
        self.feed.state()
    }

    pub fn feed(&self) -> &FilteredNewsFeed {
        &self.feed
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages(self.feed.state().articles.len())
    }

    pub fn current_page(&mut self) -> usize {
        let total = self.total_pages();
        self.pagination.clamp(total);
        self.pagination.current_page()
    }

    pub fn has_prev(&self) -> bool {
        self.pagination.has_prev()
    }

    pub fn has_next(&self) -> bool {
        self.pagination.has_next(self.total_pages())
    }

    pub fn next_page(&mut self) -> Result<(), PageError> {
        let total = self.total_pages();
        self.pagination.clamp(total);
        self.pagination.next(total)
    }

    pub fn prev_page(&mut self) -> Result<(), PageError> {
        let total = self.total_pages();
        self.pagination.clamp(total);
        self.pagination.prev()
    }

    pub fn go_to_page(&mut self, page: usize) -> Result<(), PageError> {
        let total = self.total_pages();
        self.pagination.go_to(page, total)
    }

    pub fn page_numbers(&self) -> std::ops::RangeInclusive<usize> {
        self.pagination.page_numbers(self.total_pages())
    }

    pub fn visible_articles(&mut self) -> Vec<Article> {
        let state = self.feed.state();
        let total = self.pagination.total_pages(state.articles.len());
        self.pagination.clamp(total);
        self.pagination.slice(&state.articles).to_vec()
    }

    /// Summarizes the `index`-th article of the visible page. Returns false
    /// when there is no such article.
    pub fn summarize_visible(&mut self, index: usize) -> bool {
        match self.visible_articles().get(index) {
            Some(article) => {
                self.summary.summarize(article);
                true
            }
            None => false,
        }
    }

    pub fn summarize(&mut self, article: &Article) {
        self.summary.summarize(article);
    }

    pub fn summary(&self) -> &SummaryController {
        &self.summary
    }

    pub fn summary_state(&self) -> SummaryState {
        self.summary.state()
    }

    pub fn speak_summary(&self) -> bool {
        self.summary.speak()
    }

    pub fn close_summary(&mut self) {
        self.summary.close();
    }
}
