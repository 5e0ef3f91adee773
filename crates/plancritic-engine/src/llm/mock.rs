use super::{GenerationSettings, Provider};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Scripted provider for tests and offline runs.
///
/// Replies are served in order; every prompt and its settings are recorded.
pub struct MockProvider {
    name: String,
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<(String, GenerationSettings)>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        lock(&self.replies).push_back(Ok(text.into()));
        self
    }

    pub fn with_error(self, message: impl Into<String>) -> Self {
        lock(&self.replies).push_back(Err(message.into()));
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn settings(&self) -> Vec<GenerationSettings> {
        lock(&self.calls).iter().map(|(_, s)| s.clone()).collect()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str, settings: &GenerationSettings) -> Result<String> {
        lock(&self.calls).push((prompt.to_string(), settings.clone()));
        let reply = lock(&self.replies).pop_front();
        match reply {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow!("{}: {}", self.name, message)),
            None => Err(anyhow!("{}: no scripted response left", self.name)),
        }
    }
}
