//! Prompt assembly, provider access and the review pipeline for PlanCritic.

pub mod llm;
pub mod pipeline;
pub mod prompt;

pub use llm::{GenerationSettings, MockProvider, Provider, RetryPolicy};
pub use pipeline::{run_review, RepairPolicy, ReviewError, ReviewOutcome, ReviewRequest};
pub use prompt::{build_prompt, build_repair_prompt, PromptOptions};
