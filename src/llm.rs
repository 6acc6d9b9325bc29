use async_trait::async_trait;
use serde::Serialize;
use reqwest::Client;
use tracing::debug;
use crate::error::{Result, AppError};

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

/// Turns a prompt into generated text.
#[async_trait]
pub trait TextSummarizer: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub struct OpenRouter {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenRouter {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, model, OPENROUTER_URL)
    }

    pub fn with_endpoint(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TextSummarizer for OpenRouter {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "user".into(),
                    content: prompt.into(),
                }
            ],
        };

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LlmError(e.to_string()))?;

        if !res.status().is_success() {
            return Err(AppError::LlmError(format!("LLM returned status {}", res.status())));
        }

        let json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| AppError::LlmError(e.to_string()))?;
        let reply = json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::trim)
            .filter(|reply| !reply.is_empty())
            .ok_or_else(|| AppError::LlmError("Invalid response format from LLM".to_string()))?
            .to_string();

        debug!(chars = reply.len(), "LLM reply received");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_reads_first_choice() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "  A summary.  "}}]
            })))
            .mount(&mock_server)
            .await;

        let llm = OpenRouter::with_endpoint("sk-test", "test-model", mock_server.uri());
        assert_eq!(llm.complete("prompt").await.unwrap(), "A summary.");
    }

    #[tokio::test]
    async fn test_complete_rejects_unexpected_shape() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&mock_server)
            .await;

        let llm = OpenRouter::with_endpoint("sk-test", "test-model", mock_server.uri());
        assert!(matches!(llm.complete("prompt").await, Err(AppError::LlmError(_))));
    }

    #[tokio::test]
    async fn test_complete_rejects_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let llm = OpenRouter::with_endpoint("bad", "test-model", mock_server.uri());
        assert!(llm.complete("prompt").await.is_err());
    }
}
