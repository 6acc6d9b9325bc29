use reqwest::{Client, ClientBuilder};
use scraper::{Html, Selector};
use std::time::Duration;
use once_cell::sync::Lazy;
use crate::error::{AppError, Result};

// Create a static client to reuse connections
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build HTTP client")
});

// Create static selectors to avoid recompiling them each time
static OG_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="og:title"]"#).expect("Failed to parse og:title selector")
});

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title").expect("Failed to parse title selector")
});

static ARTICLE_PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("article p").expect("Failed to parse article selector")
});

static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p").expect("Failed to parse paragraph selector")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedArticle {
    pub title: String,
    pub text: String,
}

impl ScrapedArticle {
    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }
}

pub async fn fetch_html(url: &str) -> Result<String> {
    let response = CLIENT.get(url).send().await?;
    if !response.status().is_success() {
        return Err(AppError::FetchError(format!("Article returned status {}", response.status())));
    }
    let html = response.text().await?;
    Ok(html)
}

pub async fn scrape_article(url: &str) -> Result<ScrapedArticle> {
    let html = fetch_html(url).await?;
    Ok(extract_article(&html))
}

pub fn extract_article(html: &str) -> ScrapedArticle {
    let document = Html::parse_document(html);

    let title = document
        .select(&OG_TITLE_SELECTOR)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(str::to_string)
        .or_else(|| {
            document
                .select(&TITLE_SELECTOR)
                .next()
                .map(|element| element.text().collect::<String>())
        })
        .map(|title| clean_text(&title))
        .unwrap_or_default();

    // Prefer paragraphs inside <article>, then any paragraph on the page.
    let mut paragraphs: Vec<String> = document
        .select(&ARTICLE_PARAGRAPH_SELECTOR)
        .map(|p| p.text().collect::<String>())
        .collect();
    if paragraphs.is_empty() {
        paragraphs = document
            .select(&PARAGRAPH_SELECTOR)
            .map(|p| p.text().collect::<String>())
            .collect();
    }

    ScrapedArticle {
        title,
        text: clean_text(&paragraphs.join(" ")),
    }
}

/// Normalizes article or API-supplied text before summarizing.
///
/// Collapses whitespace, cuts everything from "Read more" on, drops
/// `[1234 chars]` truncation markers and turns ellipses into full stops.
pub fn clean_text(text: &str) -> String {
    let text = text.replace('\u{2026}', ".");
    let text = strip_char_markers(&text);
    let text = match find_ignore_ascii_case(&text, "read more") {
        Some(idx) => &text[..idx],
        None => text.as_str(),
    };
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// Removes "[<digits> chars]" markers as appended by the news API.
fn strip_char_markers(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        result.push_str(&rest[..open]);
        let candidate = &rest[open..];
        match char_marker_len(candidate) {
            Some(len) => rest = &candidate[len..],
            None => {
                result.push('[');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

fn char_marker_len(candidate: &str) -> Option<usize> {
    let close = candidate.find(']')?;
    // Whitespace is allowed between the digits and "chars", nowhere else.
    let digits = candidate[1..close].strip_suffix("chars")?.trim_end();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(close + 1)
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}

pub fn build_prompt(content: &str, min_words: usize, max_words: usize) -> String {
    let mut result = String::with_capacity(content.len() + 160);
    result.push_str(&format!(
        "Summarize the following news article in plain prose between {} and {} words. \
         Do not add headings, lists or commentary:\n\n",
        min_words, max_words
    ));
    result.push_str(content);
    result
}
