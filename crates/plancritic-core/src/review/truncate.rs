use super::{Category, Evidence, Issue, Review, Severity};

pub const DEFAULT_MAX_ISSUES: usize = 50;
pub const DEFAULT_MAX_QUESTIONS: usize = 20;

/// Reserved ID of the synthetic notice appended when output is cut.
pub const TRUNCATION_ISSUE_ID: &str = "ISSUE-TRUNC";

/// Cap issues and questions, appending one synthetic WARN notice when either
/// list was cut. Zero limits fall back to the defaults.
///
/// Keeps a prefix, so callers sort first: the survivors are then the highest
/// priority entries. One issue slot is reserved for the notice.
pub fn truncate(mut review: Review, max_issues: usize, max_questions: usize) -> Review {
    let max_issues = if max_issues == 0 {
        DEFAULT_MAX_ISSUES
    } else {
        max_issues
    };
    let max_questions = if max_questions == 0 {
        DEFAULT_MAX_QUESTIONS
    } else {
        max_questions
    };

    let mut truncated = false;

    if review.issues.len() > max_issues {
        review.issues.truncate(max_issues - 1);
        truncated = true;
    }

    if review.questions.len() > max_questions {
        review.questions.truncate(max_questions);
        truncated = true;
    }

    if truncated {
        review.issues.push(truncation_notice());
    }

    review
}

fn truncation_notice() -> Issue {
    Issue {
        id: TRUNCATION_ISSUE_ID.to_string(),
        severity: Severity::Warn,
        category: Category::Ambiguity,
        title: "Output truncated".to_string(),
        description: "The number of issues or questions exceeded the configured limits. \
                      Increase limits to see all results."
            .to_string(),
        evidence: vec![Evidence::plan("plan", 1, 1, "(truncation notice)")],
        impact: String::new(),
        recommendation: "Re-run with higher limits.".to_string(),
        blocking: false,
        tags: Vec::new(),
    }
}
