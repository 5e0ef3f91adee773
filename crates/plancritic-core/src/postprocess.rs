//! The deterministic chain applied to every validated review before output.

use crate::filter::SeverityThreshold;
use crate::review::{
    apply_grounding_downgrades, check_grounding, compute_summary, sort_issues, sort_questions,
    truncate, GroundingRules, GroundingViolation, Review, DEFAULT_MAX_ISSUES,
    DEFAULT_MAX_QUESTIONS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostProcessOptions {
    pub max_issues: usize,
    pub max_questions: usize,
    /// Run the grounding check and downgrade offending issues.
    pub strict: bool,
    pub severity_threshold: SeverityThreshold,
}

impl Default for PostProcessOptions {
    fn default() -> Self {
        Self {
            max_issues: DEFAULT_MAX_ISSUES,
            max_questions: DEFAULT_MAX_QUESTIONS,
            strict: false,
            severity_threshold: SeverityThreshold::Info,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostProcessed {
    pub review: Review,
    /// Empty unless `strict` was set.
    pub grounding_violations: Vec<GroundingViolation>,
}

/// Sort, truncate, optionally ground, filter, then recompute the summary.
///
/// The summary is always derived last so nothing the model claimed about its
/// own verdict or score survives.
pub fn post_process(
    mut review: Review,
    options: &PostProcessOptions,
    rules: &GroundingRules,
) -> PostProcessed {
    sort_issues(&mut review.issues);
    sort_questions(&mut review.questions);

    review = truncate(review, options.max_issues, options.max_questions);

    let mut grounding_violations = Vec::new();
    if options.strict {
        grounding_violations = check_grounding(&review, rules);
        if !grounding_violations.is_empty() {
            review = apply_grounding_downgrades(review, &grounding_violations);
            sort_issues(&mut review.issues);
        }
    }

    let threshold = options.severity_threshold;
    review.issues = threshold.filter_issues(std::mem::take(&mut review.issues));
    review.questions = threshold.filter_questions(std::mem::take(&mut review.questions));

    review.summary = compute_summary(&review.issues);

    PostProcessed {
        review,
        grounding_violations,
    }
}
