use super::client::{create_http_client, send_with_retry, RetryPolicy};
use super::{GenerationSettings, Provider};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-sonnet-4-6";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";
const ANTHROPIC_DEFAULT_MAX_TOKENS: u32 = 16384;

/// Anthropic Messages API adapter.
pub struct AnthropicProvider {
    api_key: String,
    api_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            api_url: ANTHROPIC_API_URL.to_string(),
            client: create_http_client(timeout)?,
            retry: RetryPolicy::default(),
        })
    }

    /// Point at a different endpoint, e.g. a local test server.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, prompt: &str, settings: &GenerationSettings) -> Result<String> {
        let model = settings
            .model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(ANTHROPIC_DEFAULT_MODEL);
        let max_tokens = if settings.max_tokens == 0 {
            ANTHROPIC_DEFAULT_MAX_TOKENS
        } else {
            settings.max_tokens
        };

        let body = MessagesRequest {
            model,
            max_tokens,
            temperature: settings.temperature,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let text = send_with_retry(self.name(), &self.retry, || {
            self.client
                .post(&self.api_url)
                .header("content-type", "application/json")
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_API_VERSION)
                .json(&body)
        })
        .await?;

        let response: MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("anthropic: parse response: {}", e))?;

        if response.stop_reason.as_deref() == Some("max_tokens") {
            bail!(
                "anthropic: response truncated at max_tokens ({}); raise --max-tokens",
                max_tokens
            );
        }

        response
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .map(|block| block.text)
            .ok_or_else(|| anyhow!("anthropic: no text content in response"))
    }
}
