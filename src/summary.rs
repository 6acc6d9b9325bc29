use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ReaderConfig;
use crate::error::FeedError;
use crate::news::Article;

const GENERIC_FAILURE: &str = "Could not summarize";
const UNREACHABLE: &str = "Server error: summarization service unreachable";

/// Body sent to the summarization service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryInput {
    pub url: String,
    pub content: String,
    pub description: String,
}

impl From<&Article> for SummaryInput {
    fn from(article: &Article) -> Self {
        Self {
            url: article.url.clone(),
            content: article.content.clone(),
            description: article.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReply {
    pub summary: String,
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryBody {
    summary: Option<String>,
    title: Option<String>,
    error: Option<String>,
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, input: &SummaryInput) -> Result<SummaryReply, FeedError>;
}

/// HTTP client for the `/summarize` endpoint.
#[derive(Clone)]
pub struct SummaryClient {
    client: Client,
    base_url: String,
}

impl SummaryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        // Summaries may wait on a scrape plus an LLM call.
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(config.summary_api_url.clone())
    }
}

#[async_trait]
impl Summarizer for SummaryClient {
    async fn summarize(&self, input: &SummaryInput) -> Result<SummaryReply, FeedError> {
        let url = format!("{}/summarize", self.base_url);
        info!(article = %input.url, "Requesting summary");

        let response = self.client.post(&url).json(input).send().await?;
        let status = response.status();

        // The service reports failures in the body, so it is read whatever the status.
        let body = response.bytes().await?;
        let parsed: SummaryBody = serde_json::from_slice(&body).unwrap_or_default();

        match parsed.summary.filter(|summary| !summary.is_empty()) {
            Some(summary) => Ok(SummaryReply {
                summary,
                title: parsed.title.filter(|title| !title.is_empty()),
            }),
            None => Err(FeedError::Remote {
                status: (!status.is_success()).then(|| status.as_u16()),
                message: parsed.error,
            }),
        }
    }
}

/// Text-to-speech capability used to read a summary aloud.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str);
    fn stop(&self);
}

/// Speech stand-in for headless hosts; it only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSpeech;

impl SpeechSynthesizer for LoggingSpeech {
    fn speak(&self, text: &str) {
        info!(chars = text.len(), "Speaking summary");
    }

    fn stop(&self) {
        debug!("Speech stopped");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub title: String,
    pub image: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SummaryState {
    #[default]
    Idle,
    Pending { url: String },
    Success(SummaryResult),
    Failed(String),
}

/// Drives the summary view for one reader.
///
/// Only one request is ever pending. Summarizing a second article while the
/// first is still out replaces it: the earlier task is aborted and, should its
/// response still arrive, it is discarded. The last request wins.
pub struct SummaryController {
    summarizer: Arc<dyn Summarizer>,
    speech: Arc<dyn SpeechSynthesizer>,
    state: Arc<watch::Sender<SummaryState>>,
    generation: Arc<AtomicU64>,
    in_flight: Option<JoinHandle<()>>,
}

impl SummaryController {
    pub fn new(summarizer: Arc<dyn Summarizer>, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        let (state, _) = watch::channel(SummaryState::Idle);
        Self {
            summarizer,
            speech,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: None,
        }
    }

    pub fn summarize(&mut self, article: &Article) {
        let current = self.replace_state(SummaryState::Pending {
            url: article.url.clone(),
        });

        let summarizer = self.summarizer.clone();
        let state = self.state.clone();
        let generation = self.generation.clone();
        let input = SummaryInput::from(article);
        let fallback_title = article.title.clone();
        let image = article.image.clone();

        self.in_flight = Some(tokio::spawn(async move {
            let next = match summarizer.summarize(&input).await {
                Ok(reply) => SummaryState::Success(SummaryResult {
                    title: reply.title.unwrap_or(fallback_title),
                    image,
                    summary: reply.summary,
                }),
                Err(err) => {
                    warn!(article = %input.url, error = %err, "Summary request failed");
                    SummaryState::Failed(failure_message(&err))
                }
            };

            state.send_if_modified(|state| {
                if generation.load(Ordering::SeqCst) != current {
                    debug!(article = %input.url, "Discarding superseded summary");
                    return false;
                }
                *state = next;
                true
            });
        }));
    }

    /// Hands the current summary to the speech capability. Returns false when
    /// there is nothing to read.
    pub fn speak(&self) -> bool {
        match &*self.state.borrow() {
            SummaryState::Success(result) => {
                self.speech.speak(&result.summary);
                true
            }
            _ => false,
        }
    }

    /// Stops speech and returns to Idle, dropping any pending request.
    pub fn close(&mut self) {
        self.speech.stop();
        self.replace_state(SummaryState::Idle);
    }

    pub fn state(&self) -> SummaryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SummaryState> {
        self.state.subscribe()
    }

    pub fn pending_url(&self) -> Option<String> {
        match &*self.state.borrow() {
            SummaryState::Pending { url } => Some(url.clone()),
            _ => None,
        }
    }

    fn replace_state(&mut self, next: SummaryState) -> u64 {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        let mut current = 0;
        self.state.send_modify(|state| {
            current = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = next;
        });
        current
    }
}

impl Drop for SummaryController {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}

fn failure_message(err: &FeedError) -> String {
    match err {
        FeedError::Transport(_) => UNREACHABLE.to_string(),
        FeedError::Remote {
            message: Some(message),
            ..
        } => format!("Error: {}", message),
        _ => format!("Error: {}", GENERIC_FAILURE),
    }
}
