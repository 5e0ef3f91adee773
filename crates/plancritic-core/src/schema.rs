//! Structural and semantic validation of a parsed review.
//!
//! Every rule is checked independently and all violations are collected, so a
//! single repair round-trip can address everything at once.

use crate::review::{
    compute_score, Evidence, EvidenceSource, Issue, Patch, Question, Review, SeverityCounts,
};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// One violation, located by a dotted/bracketed path such as
/// `issues[2].evidence[0].line_start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

const REQUIRED: &str = "required";
const EVIDENCE_REQUIRED: &str = "at least one evidence entry required";

/// Validate `review` against the schema. `plan_line_count == 0` disables the
/// plan line-range check. An empty result means the review is valid.
pub fn validate(review: &Review, plan_line_count: usize) -> Vec<ValidationError> {
    let mut errs = Vec::new();

    if review.tool.is_empty() {
        errs.push(ValidationError::new("tool", REQUIRED));
    }
    if review.version.is_empty() {
        errs.push(ValidationError::new("version", REQUIRED));
    }

    validate_summary(review, &mut errs);

    let mut issue_ids = HashSet::new();
    for (i, issue) in review.issues.iter().enumerate() {
        validate_issue(&format!("issues[{}]", i), issue, &mut issue_ids, plan_line_count, &mut errs);
    }

    let mut question_ids = HashSet::new();
    for (i, question) in review.questions.iter().enumerate() {
        validate_question(
            &format!("questions[{}]", i),
            question,
            &mut question_ids,
            plan_line_count,
            &mut errs,
        );
    }

    for (i, patch) in review.patches.iter().enumerate() {
        validate_patch(&format!("patches[{}]", i), patch, &mut errs);
    }

    for (i, checklist) in review.checklists.iter().enumerate() {
        for (j, item) in checklist.checks.iter().enumerate() {
            if !item.status.is_valid() {
                errs.push(ValidationError::new(
                    format!("checklists[{}].checks[{}].status", i, j),
                    format!("invalid: {:?}", item.status.as_str()),
                ));
            }
        }
    }

    errs
}

fn validate_summary(review: &Review, errs: &mut Vec<ValidationError>) {
    let summary = &review.summary;
    if !summary.verdict.is_valid() {
        errs.push(ValidationError::new(
            "summary.verdict",
            format!("invalid verdict: {:?}", summary.verdict.as_str()),
        ));
    }

    let expected = compute_score(&review.issues);
    if summary.score != expected {
        errs.push(ValidationError::new(
            "summary.score",
            format!(
                "score {} does not match computed {}",
                summary.score, expected
            ),
        ));
    }

    let counts = SeverityCounts::tally(&review.issues);
    for (field, expected, actual) in [
        ("critical_count", counts.critical, summary.critical_count),
        ("warn_count", counts.warn, summary.warn_count),
        ("info_count", counts.info, summary.info_count),
    ] {
        if expected != actual {
            errs.push(ValidationError::new(
                format!("summary.{}", field),
                format!("expected {}, got {}", expected, actual),
            ));
        }
    }
}

fn validate_issue(
    prefix: &str,
    issue: &Issue,
    seen: &mut HashSet<String>,
    plan_line_count: usize,
    errs: &mut Vec<ValidationError>,
) {
    check_id(prefix, &issue.id, seen, errs);
    if !issue.severity.is_valid() {
        errs.push(ValidationError::new(
            format!("{}.severity", prefix),
            format!("invalid: {:?}", issue.severity.as_str()),
        ));
    }
    if !issue.category.is_valid() {
        errs.push(ValidationError::new(
            format!("{}.category", prefix),
            format!("invalid: {:?}", issue.category.as_str()),
        ));
    }
    require_text(prefix, "title", &issue.title, errs);
    require_text(prefix, "description", &issue.description, errs);
    validate_evidence_list(prefix, &issue.evidence, plan_line_count, errs);
}

fn validate_question(
    prefix: &str,
    question: &Question,
    seen: &mut HashSet<String>,
    plan_line_count: usize,
    errs: &mut Vec<ValidationError>,
) {
    check_id(prefix, &question.id, seen, errs);
    if !question.severity.is_valid() {
        errs.push(ValidationError::new(
            format!("{}.severity", prefix),
            format!("invalid: {:?}", question.severity.as_str()),
        ));
    }
    require_text(prefix, "question", &question.question, errs);
    require_text(prefix, "why_needed", &question.why_needed, errs);
    validate_evidence_list(prefix, &question.evidence, plan_line_count, errs);
}

fn validate_patch(prefix: &str, patch: &Patch, errs: &mut Vec<ValidationError>) {
    require_text(prefix, "id", &patch.id, errs);
    if !patch.patch_type.is_valid() {
        errs.push(ValidationError::new(
            format!("{}.type", prefix),
            format!("invalid: {:?}", patch.patch_type.as_str()),
        ));
    }
    require_text(prefix, "title", &patch.title, errs);
    require_text(prefix, "diff_unified", &patch.diff_unified, errs);
}

/// IDs must be present and unique; a duplicate is reported on the later entry.
fn check_id(prefix: &str, id: &str, seen: &mut HashSet<String>, errs: &mut Vec<ValidationError>) {
    if is_blank_id(id) {
        errs.push(ValidationError::new(format!("{}.id", prefix), REQUIRED));
    } else if !seen.insert(id.to_string()) {
        errs.push(ValidationError::new(
            format!("{}.id", prefix),
            format!("duplicate ID: {:?}", id),
        ));
    }
}

fn validate_evidence_list(
    prefix: &str,
    evidence: &[Evidence],
    plan_line_count: usize,
    errs: &mut Vec<ValidationError>,
) {
    if evidence.is_empty() {
        errs.push(ValidationError::new(
            format!("{}.evidence", prefix),
            EVIDENCE_REQUIRED,
        ));
    }
    for (j, ev) in evidence.iter().enumerate() {
        validate_evidence(&format!("{}.evidence[{}]", prefix, j), ev, plan_line_count, errs);
    }
}

fn validate_evidence(
    prefix: &str,
    ev: &Evidence,
    plan_line_count: usize,
    errs: &mut Vec<ValidationError>,
) {
    if !ev.source.is_valid() {
        errs.push(ValidationError::new(
            format!("{}.source", prefix),
            format!("must be 'plan' or 'context', got {:?}", ev.source.as_str()),
        ));
    }
    require_text(prefix, "path", &ev.path, errs);
    if ev.line_start < 1 {
        errs.push(ValidationError::new(
            format!("{}.line_start", prefix),
            "must be >= 1",
        ));
    }
    if ev.line_end < ev.line_start {
        errs.push(ValidationError::new(
            format!("{}.line_end", prefix),
            "must be >= line_start",
        ));
    }
    if plan_line_count > 0
        && ev.source == EvidenceSource::Plan
        && ev.line_end > plan_line_count as i64
    {
        errs.push(ValidationError::new(
            format!("{}.line_end", prefix),
            format!("exceeds plan line count ({})", plan_line_count),
        ));
    }
    require_text(prefix, "quote", &ev.quote, errs);
}

fn require_text(prefix: &str, field: &str, value: &str, errs: &mut Vec<ValidationError>) {
    if value.is_empty() {
        errs.push(ValidationError::new(
            format!("{}.{}", prefix, field),
            REQUIRED,
        ));
    }
}

/// Whitespace-only IDs count as missing.
fn is_blank_id(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests;
