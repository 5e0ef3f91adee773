//! Provider capability: turns a prompt into response text.
//!
//! The pipeline treats providers as unreliable text generators and never
//! assumes the returned text is valid JSON.

pub mod anthropic;
pub mod client;
pub mod mock;
pub mod openai;
pub mod parse;
pub mod resolve;

pub use anthropic::AnthropicProvider;
pub use client::RetryPolicy;
pub use mock::MockProvider;
pub use openai::OpenAiProvider;
pub use parse::{extract_json, parse_review};
pub use resolve::{resolve_provider, select_provider, ProviderKeys, ProviderKind, ProviderSelection};

use anyhow::Result;
use async_trait::async_trait;

/// Per-request sampling settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationSettings {
    /// `None` uses the provider's default model.
    pub model: Option<String>,
    pub temperature: f64,
    /// Zero uses the provider's default limit.
    pub max_tokens: u32,
    pub seed: Option<i64>,
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Short identifier used in logs and in the review's `meta.model`.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, settings: &GenerationSettings) -> Result<String>;
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(&self, prompt: &str, settings: &GenerationSettings) -> Result<String> {
        (**self).generate(prompt, settings).await
    }
}
