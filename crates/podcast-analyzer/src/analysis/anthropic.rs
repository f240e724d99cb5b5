//! Live text generator calling the Anthropic Messages API.
//!
//! One request per analysis, no retries. The configured timeout is the only
//! bound on how long a request waits for the backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::generator::{GenerationRequest, TextGenerator};
use crate::config::Config;
use crate::error::{AnalyzerError, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

pub struct AnthropicGenerator {
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    http_client: reqwest::Client,
}

impl AnthropicGenerator {
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .anthropic_api_key
            .clone()
            .ok_or_else(|| AnalyzerError::Backend("ANTHROPIC_API_KEY is not set".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.llm_timeout_seconds))
            .build()?;

        info!("Anthropic generator initialized with backend: {}", config.anthropic_base_url);
        Ok(Self {
            api_key,
            base_url: config.anthropic_base_url.clone(),
            model: config.llm_model.clone(),
            max_tokens: config.llm_max_tokens,
            temperature: config.llm_temperature,
            http_client,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        debug!(
            "Requesting analysis of {} from {} ({} prompt chars)",
            request.transcript.id,
            self.model,
            request.prompt.len()
        );

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt,
            }],
        };

        let response = self
            .http_client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalyzerError::Backend(format!("LLM backend request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("LLM backend returned {} for {}", status, request.transcript.id);
            return Err(AnalyzerError::Backend(format!("LLM backend returned {}: {}", status, body)));
        }

        let completion: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::parse(format!("Failed to decode LLM response envelope: {}", e)))?;

        if completion.stop_reason.as_deref() == Some("max_tokens") {
            warn!("Analysis of {} hit the max token limit, JSON may be truncated", request.transcript.id);
        }

        let text: String = completion
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            return Err(AnalyzerError::parse("LLM response contained no text"));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Preferences, Transcript, TranscriptMetadata};
    use std::path::Path;

    fn transcript() -> Transcript {
        Transcript {
            id: "ep1".into(),
            text: "Host: hello".into(),
            metadata: TranscriptMetadata::default(),
        }
    }

    fn generator_for(url: &str) -> AnthropicGenerator {
        let mut config = Config::for_data_dir(Path::new("/tmp"));
        config.anthropic_api_key = Some("sk-test".into());
        config.anthropic_base_url = url.to_string();
        config.llm_model = "test-model".into();
        AnthropicGenerator::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_generate_sends_prompt_and_joins_text_blocks() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-test")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "test-model",
                "messages": [{"role": "user", "content": "score this"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content": [{"type": "text", "text": "{\"a\": "}, {"type": "text", "text": "1}"}], "stop_reason": "end_turn"}"#)
            .create_async()
            .await;

        let generator = generator_for(&server.url());
        let transcript = transcript();
        let prefs = Preferences::default();
        let text = generator
            .generate(&GenerationRequest {
                prompt: "score this",
                transcript: &transcript,
                preferences: &prefs,
            })
            .await
            .unwrap();

        assert_eq!(text, "{\"a\": 1}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_backend_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(529)
            .with_body("overloaded")
            .create_async()
            .await;

        let generator = generator_for(&server.url());
        let transcript = transcript();
        let prefs = Preferences::default();
        let err = generator
            .generate(&GenerationRequest {
                prompt: "p",
                transcript: &transcript,
                preferences: &prefs,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzerError::Backend(ref msg) if msg.contains("overloaded")));
    }

    #[tokio::test]
    async fn test_empty_completion_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content": []}"#)
            .create_async()
            .await;

        let generator = generator_for(&server.url());
        let transcript = transcript();
        let prefs = Preferences::default();
        let err = generator
            .generate(&GenerationRequest {
                prompt: "p",
                transcript: &transcript,
                preferences: &prefs,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzerError::Parse(_)));
    }

    #[test]
    fn test_missing_key_rejected() {
        let config = Config::for_data_dir(Path::new("/tmp"));
        assert!(AnthropicGenerator::from_config(&config).is_err());
    }
}
