//! End-to-end review run: prompt, provider, repair, post-processing.

mod repair;

pub use repair::{RepairOrchestrator, RepairPolicy, Validated, MAX_ATTEMPTS, PARSE_ERROR_PATH};

use crate::llm::{GenerationSettings, Provider};
use crate::prompt::{build_prompt, PromptOptions};
use plancritic_adapters::{infer_step_ids, Profile, SourceFile, StepPatterns};
use plancritic_core::{
    post_process, ContextFile, GroundingRules, GroundingViolation, PostProcessOptions, Review,
    ValidationError,
};
use std::time::Duration;
use tracing::{info, warn};

/// Value written to `review.tool`.
pub const TOOL_NAME: &str = "plancritic";

/// Label used in `meta.model` when no model was requested explicitly.
pub const DEFAULT_MODEL_LABEL: &str = "(default)";

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// The provider call itself failed or timed out.
    #[error("provider error on attempt {attempt}: {source:#}")]
    Provider {
        attempt: u8,
        #[source]
        source: anyhow::Error,
    },
    #[error("attempt {attempt}: response is not valid review JSON: {message}")]
    Parse { attempt: u8, message: String },
    /// Still invalid after the repair attempt. Holds the second attempt's errors.
    #[error("review failed schema validation after repair ({} errors)", errors.len())]
    Schema { errors: Vec<ValidationError> },
}

/// Everything needed for one review run.
#[derive(Debug, Clone)]
pub struct ReviewRequest<'a> {
    pub plan: &'a SourceFile,
    pub step_patterns: &'a StepPatterns,
    pub contexts: &'a [SourceFile],
    pub profile: Option<&'a Profile>,
    pub settings: GenerationSettings,
    /// `strict` here also selects the strict prompt section.
    pub options: PostProcessOptions,
    pub repair: RepairPolicy,
    pub timeout: Option<Duration>,
}

impl<'a> ReviewRequest<'a> {
    pub fn new(plan: &'a SourceFile, step_patterns: &'a StepPatterns) -> Self {
        Self {
            plan,
            step_patterns,
            contexts: &[],
            profile: None,
            settings: GenerationSettings::default(),
            options: PostProcessOptions::default(),
            repair: RepairPolicy::default(),
            timeout: None,
        }
    }

    /// The prompt sent on the first attempt.
    pub fn prompt(&self) -> String {
        let steps = infer_step_ids(self.plan, self.step_patterns);
        build_prompt(&PromptOptions {
            plan: self.plan,
            contexts: self.contexts,
            profile: self.profile,
            strict: self.options.strict,
            steps: &steps,
            max_issues: self.options.max_issues,
            max_questions: self.options.max_questions,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub review: Review,
    pub attempts: u8,
    pub grounding_violations: Vec<GroundingViolation>,
}

impl ReviewOutcome {
    pub fn repaired(&self) -> bool {
        self.attempts > 1
    }
}

pub async fn run_review<P: Provider + ?Sized>(
    provider: &P,
    request: &ReviewRequest<'_>,
    rules: &GroundingRules,
) -> Result<ReviewOutcome, ReviewError> {
    let prompt = request.prompt();

    let validated = RepairOrchestrator::new(provider, &request.settings, request.plan.line_count())
        .with_policy(request.repair)
        .with_timeout(request.timeout)
        .run(&prompt)
        .await?;
    if validated.repaired() {
        info!("review repaired on second attempt");
    }

    let review = stamp_metadata(validated.review, provider.name(), request);
    let processed = post_process(review, &request.options, rules);

    for violation in &processed.grounding_violations {
        warn!(
            id = %violation.id,
            field = violation.field,
            phrase = %violation.phrase,
            "ungrounded claim"
        );
    }

    info!(
        verdict = processed.review.summary.verdict.as_str(),
        score = processed.review.summary.score,
        issues = processed.review.issues.len(),
        questions = processed.review.questions.len(),
        "review complete"
    );

    Ok(ReviewOutcome {
        review: processed.review,
        attempts: validated.attempts,
        grounding_violations: processed.grounding_violations,
    })
}

/// Overwrite whatever the model claimed about its inputs and identity.
fn stamp_metadata(mut review: Review, provider: &str, request: &ReviewRequest<'_>) -> Review {
    review.tool = TOOL_NAME.to_string();
    review.version = env!("CARGO_PKG_VERSION").to_string();

    review.input.plan_file = request.plan.file_name();
    review.input.plan_hash = request.plan.hash.clone();
    review.input.context_files = request
        .contexts
        .iter()
        .map(|c| ContextFile {
            path: c.file_name(),
            hash: c.hash.clone(),
        })
        .collect();
    review.input.profile = request
        .profile
        .map(|p| p.name.clone())
        .unwrap_or_default();
    review.input.strict = request.options.strict;

    let model = request
        .settings
        .model
        .as_deref()
        .unwrap_or(DEFAULT_MODEL_LABEL);
    review.meta.model = format!("{}/{}", provider, model);
    review.meta.temperature = request.settings.temperature;

    review
}
