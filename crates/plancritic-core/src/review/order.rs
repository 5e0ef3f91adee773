use super::{Evidence, Issue, Question};

/// Stable sort by severity rank (CRITICAL, WARN, INFO, unrecognized), then by
/// the first evidence line. Ties keep their input order.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by_key(|issue| (issue.severity.rank(), first_line(&issue.evidence)));
}

/// Same ordering as [`sort_issues`].
pub fn sort_questions(questions: &mut [Question]) {
    questions.sort_by_key(|question| (question.severity.rank(), first_line(&question.evidence)));
}

fn first_line(evidence: &[Evidence]) -> i64 {
    evidence.first().map(|ev| ev.line_start).unwrap_or(0)
}
