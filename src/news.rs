use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ReaderConfig;
use crate::error::FeedError;

/// Categories offered by the navigation menu.
pub const CATEGORIES: [&str; 5] = ["world", "business", "technology", "sports", "entertainment"];

const NONE_SENTINEL: &str = "none";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// A headline as returned by the news API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Article {
    #[serde(deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub image: String,
    pub source: Option<Source>,
    pub published_at: Option<String>,
}

impl Article {
    /// Parses `publishedAt` when it is RFC 3339; the raw value stays untouched.
    pub fn published(&self) -> Option<DateTime<FixedOffset>> {
        self.published_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
    }
}

// The API sends `null` for missing images and descriptions.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
struct HeadlinesResponse {
    #[serde(default)]
    articles: Option<Vec<Article>>,
}

/// The (category, search term) pair that partitions the filtered cache.
///
/// An empty string means "no filter" for either field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterKey {
    pub category: String,
    pub search_term: String,
}

impl FilterKey {
    pub fn new(category: impl Into<String>, search_term: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            search_term: search_term.into(),
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self::new(category, "")
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self::new("", term)
    }

    // Empty values collapse to the sentinel, so "" and "none" share an entry.
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}",
            or_sentinel(&self.category),
            or_sentinel(&self.search_term)
        )
    }
}

fn or_sentinel(value: &str) -> &str {
    if value.is_empty() { NONE_SENTINEL } else { value }
}

/// Query parameters for the top-headlines endpoint, minus the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub lang: String,
    pub topic: Option<String>,
    pub q: Option<String>,
    pub max: Option<u32>,
    pub country: Option<String>,
}

impl NewsQuery {
    pub fn breaking(country: &str, max: u32) -> Self {
        Self {
            lang: "en".to_string(),
            topic: None,
            q: None,
            max: Some(max),
            country: Some(country.to_string()),
        }
    }

    pub fn filtered(filter: &FilterKey) -> Self {
        let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());
        Self {
            lang: "en".to_string(),
            topic: non_empty(&filter.category),
            q: non_empty(&filter.search_term),
            max: None,
            country: None,
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("lang", self.lang.clone())];
        if let Some(topic) = &self.topic {
            params.push(("topic", topic.clone()));
        }
        if let Some(q) = &self.q {
            params.push(("q", q.clone()));
        }
        if let Some(max) = self.max {
            params.push(("max", max.to_string()));
        }
        if let Some(country) = &self.country {
            params.push(("country", country.clone()));
        }
        params
    }
}

/// Anything that can answer a headlines query.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn headlines(&self, query: &NewsQuery) -> Result<Vec<Article>, FeedError>;
}

/// HTTP client for the news aggregation API.
#[derive(Clone)]
pub struct NewsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(config.news_api_url.clone(), config.news_api_key.clone())
    }
}

#[async_trait]
impl NewsSource for NewsClient {
    async fn headlines(&self, query: &NewsQuery) -> Result<Vec<Article>, FeedError> {
        let api_key = self.api_key.as_deref().ok_or(FeedError::MissingCredential)?;

        let url = format!("{}/top-headlines", self.base_url);
        info!(topic = ?query.topic, q = ?query.q, "Fetching headlines");

        let response = self
            .client
            .get(&url)
            .query(&[("token", api_key)])
            .query(&query.params())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::status(status.as_u16()));
        }

        let body: HeadlinesResponse = response.json().await?;
        let articles = body.articles.unwrap_or_default();
        debug!(count = articles.len(), "Headlines received");
        Ok(articles)
    }
}
