use serde::{Deserialize, Serialize};

/// Body of `POST /summarize`. Every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummarySource {
    Article,
    FallbackSummary,
    FallbackRaw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub summary: String,
    pub source: SummarySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SummarizeResponse {
    pub fn from_article(title: String, summary: String) -> Self {
        Self {
            title: (!title.is_empty()).then_some(title),
            summary,
            source: SummarySource::Article,
            note: None,
        }
    }

    pub fn fallback_summary(summary: String) -> Self {
        Self {
            title: None,
            summary,
            source: SummarySource::FallbackSummary,
            note: None,
        }
    }

    pub fn fallback_raw(text: String) -> Self {
        Self {
            title: None,
            summary: text,
            source: SummarySource::FallbackRaw,
            note: Some("Original content shown (not summarized)".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_wire_shape() {
        let json = serde_json::to_value(SummarizeResponse::fallback_raw("Short text".into())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "summary": "Short text",
                "source": "fallback-raw",
                "note": "Original content shown (not summarized)"
            })
        );

        let json = serde_json::to_value(SummarizeResponse::from_article(String::new(), "s".into())).unwrap();
        assert_eq!(json, serde_json::json!({"summary": "s", "source": "article"}));
    }

    #[test]
    fn test_request_accepts_missing_fields() {
        let req: SummarizeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.url.is_none());
        assert!(req.content.is_none());
    }
}
