use super::client::{create_http_client, send_with_retry, RetryPolicy};
use super::{GenerationSettings, Provider};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";
const OPENAI_DEFAULT_MAX_TOKENS: u32 = 4096;

/// OpenAI Chat Completions adapter. Requests JSON-object output.
pub struct OpenAiProvider {
    api_key: String,
    api_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    messages: [ChatMessage<'a>; 1],
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            api_url: OPENAI_API_URL.to_string(),
            client: create_http_client(timeout)?,
            retry: RetryPolicy::default(),
        })
    }

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
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str, settings: &GenerationSettings) -> Result<String> {
        let model = settings
            .model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(OPENAI_DEFAULT_MODEL);
        let max_tokens = if settings.max_tokens == 0 {
            OPENAI_DEFAULT_MAX_TOKENS
        } else {
            settings.max_tokens
        };

        let body = ChatRequest {
            model,
            max_tokens,
            temperature: settings.temperature,
            seed: settings.seed,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let text = send_with_retry(self.name(), &self.retry, || {
            self.client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&body)
        })
        .await?;

        let response: ChatResponse =
            serde_json::from_str(&text).map_err(|e| anyhow!("openai: parse response: {}", e))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("openai: no choices in response"))?;

        if choice.finish_reason.as_deref() == Some("length") {
            bail!(
                "openai: response truncated at max_tokens ({}); raise --max-tokens",
                max_tokens
            );
        }
        if let Some(refusal) = choice.message.refusal.filter(|r| !r.is_empty()) {
            bail!("openai: model refused: {}", refusal);
        }

        Ok(choice.message.content.unwrap_or_default())
    }
}
