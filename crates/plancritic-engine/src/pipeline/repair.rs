//! Parse, validate and, at most once, repair a provider response.

use super::ReviewError;
use crate::llm::{parse_review, GenerationSettings, Provider};
use crate::prompt::build_repair_prompt;
use plancritic_core::{validate, Review, ValidationError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Hard cap on provider calls per review: the original plus one repair.
pub const MAX_ATTEMPTS: u8 = 2;

/// Path used for the single entry listed when the first response did not
/// parse at all.
pub const PARSE_ERROR_PATH: &str = "$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairPolicy {
    /// Send an unparseable first response through the repair round-trip
    /// instead of failing immediately.
    pub repair_unparseable: bool,
}

impl Default for RepairPolicy {
    fn default() -> Self {
        Self {
            repair_unparseable: true,
        }
    }
}

/// A schema-valid review and how it was obtained.
#[derive(Debug, Clone)]
pub struct Validated {
    pub review: Review,
    /// Provider calls made, 1 or 2.
    pub attempts: u8,
}

impl Validated {
    pub fn repaired(&self) -> bool {
        self.attempts > 1
    }
}

enum RepairState {
    Pending { attempt: u8, raw: String },
    Validated(Validated),
    Failed(ReviewError),
}

pub struct RepairOrchestrator<'a, P: Provider + ?Sized> {
    provider: &'a P,
    settings: &'a GenerationSettings,
    plan_line_count: usize,
    policy: RepairPolicy,
    timeout: Option<Duration>,
}

impl<'a, P: Provider + ?Sized> RepairOrchestrator<'a, P> {
    pub fn new(provider: &'a P, settings: &'a GenerationSettings, plan_line_count: usize) -> Self {
        Self {
            provider,
            settings,
            plan_line_count,
            policy: RepairPolicy::default(),
            timeout: None,
        }
    }

    pub fn with_policy(mut self, policy: RepairPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound each provider call. Exceeding it is a provider error.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn run(&self, prompt: &str) -> Result<Validated, ReviewError> {
        let mut state = match self.call(1, prompt).await {
            Ok(raw) => RepairState::Pending { attempt: 1, raw },
            Err(err) => RepairState::Failed(err),
        };

        loop {
            state = match state {
                RepairState::Pending { attempt, raw } => self.step(attempt, raw).await,
                RepairState::Validated(validated) => return Ok(validated),
                RepairState::Failed(err) => return Err(err),
            };
        }
    }

    async fn step(&self, attempt: u8, raw: String) -> RepairState {
        let errors = match parse_review(&raw) {
            Ok(review) => {
                let errors = validate(&review, self.plan_line_count);
                if errors.is_empty() {
                    debug!(attempt, "response passed validation");
                    return RepairState::Validated(Validated {
                        review,
                        attempts: attempt,
                    });
                }
                errors
            }
            Err(err) => {
                let message = err.to_string();
                if attempt >= MAX_ATTEMPTS || !self.policy.repair_unparseable {
                    return RepairState::Failed(ReviewError::Parse { attempt, message });
                }
                vec![ValidationError::new(PARSE_ERROR_PATH, message)]
            }
        };

        if attempt >= MAX_ATTEMPTS {
            return RepairState::Failed(ReviewError::Schema { errors });
        }

        warn!(
            attempt,
            errors = errors.len(),
            "response failed validation, requesting repair"
        );
        for err in &errors {
            debug!(path = %err.path, message = %err.message, "validation error");
        }

        let repair_prompt = build_repair_prompt(&raw, &errors);
        match self.call(attempt + 1, &repair_prompt).await {
            Ok(next) => RepairState::Pending {
                attempt: attempt + 1,
                raw: next,
            },
            Err(err) => RepairState::Failed(err),
        }
    }

    async fn call(&self, attempt: u8, prompt: &str) -> Result<String, ReviewError> {
        info!(provider = self.provider.name(), attempt, "calling provider");
        let call = self.provider.generate(prompt, self.settings);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!(
                    "{}: request timed out after {}s",
                    self.provider.name(),
                    limit.as_secs()
                )),
            },
            None => call.await,
        };
        let raw = result.map_err(|source| ReviewError::Provider { attempt, source })?;
        debug!(attempt, bytes = raw.len(), "provider responded");
        Ok(raw)
    }
}
