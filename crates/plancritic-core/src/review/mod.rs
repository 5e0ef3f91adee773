//! The review document returned by the model and emitted by the CLI.
//!
//! Field order here is the wire order: serializing a review twice yields the
//! same bytes, which the golden tests rely on.

mod enums;
pub mod grounding;
pub mod order;
pub mod score;
pub mod summary;
pub mod truncate;

pub use enums::{Category, CheckStatus, EvidenceSource, PatchType, Severity, Verdict};
pub use grounding::{
    apply_grounding_downgrades, check_grounding, GroundingRules, GroundingSubject,
    GroundingViolation, UNVERIFIED_TAG,
};
pub use order::{sort_issues, sort_questions};
pub use score::compute_score;
pub use summary::{compute_summary, SeverityCounts};
pub use truncate::{truncate, DEFAULT_MAX_ISSUES, DEFAULT_MAX_QUESTIONS, TRUNCATION_ISSUE_ID};

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit JSON `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level review document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub tool: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub input: Input,
    #[serde(default)]
    pub summary: Summary,
    #[serde(default, deserialize_with = "nullable")]
    pub questions: Vec<Question>,
    #[serde(default, deserialize_with = "nullable")]
    pub issues: Vec<Issue>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub patches: Vec<Patch>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub checklists: Vec<Checklist>,
    #[serde(default)]
    pub meta: Meta,
}

/// Files and settings the review was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Input {
    #[serde(default)]
    pub plan_file: String,
    #[serde(default)]
    pub plan_hash: String,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub context_files: Vec<ContextFile>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub profile: String,
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextFile {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub hash: String,
}

/// Verdict, score and severity tallies. Always derived from the issue list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub verdict: Verdict,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub critical_count: i64,
    #[serde(default)]
    pub warn_count: i64,
    #[serde(default)]
    pub info_count: i64,
}

/// A problem detected in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub blocking: bool,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
}

impl Issue {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// An ambiguity that must be resolved before the plan can be executed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub why_needed: String,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub blocks: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub evidence: Vec<Evidence>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub suggested_answers: Vec<String>,
}

/// Suggested edit to the plan text, as a unified diff.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Patch {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub patch_type: PatchType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub diff_unified: String,
}

/// Result of evaluating one profile checklist.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Checklist {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub checks: Vec<CheckItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckItem {
    #[serde(default)]
    pub check: String,
    #[serde(default)]
    pub status: CheckStatus,
}

/// A citation into the plan or a context file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default)]
    pub source: EvidenceSource,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub line_start: i64,
    #[serde(default)]
    pub line_end: i64,
    #[serde(default)]
    pub quote: String,
}

impl Evidence {
    /// Evidence pointing into the plan file.
    pub fn plan(
        path: impl Into<String>,
        line_start: i64,
        line_end: i64,
        quote: impl Into<String>,
    ) -> Self {
        Self {
            source: EvidenceSource::Plan,
            path: path.into(),
            line_start,
            line_end,
            quote: quote.into(),
        }
    }

    /// Evidence pointing into a context file.
    pub fn context(
        path: impl Into<String>,
        line_start: i64,
        line_end: i64,
        quote: impl Into<String>,
    ) -> Self {
        Self {
            source: EvidenceSource::Context,
            ..Self::plan(path, line_start, line_end, quote)
        }
    }
}

/// Model and sampling settings the review was generated with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub temperature: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let review: Review = serde_json::from_str(r#"{"issues":[{"id":"ISSUE-0001"}]}"#).unwrap();
        assert_eq!(review.issues.len(), 1);
        assert!(review.issues[0].evidence.is_empty());
        assert!(!review.issues[0].severity.is_valid());
        assert!(!review.summary.verdict.is_valid());
    }

    #[test]
    fn test_null_lists_are_accepted() {
        let review: Review =
            serde_json::from_str(r#"{"questions":null,"issues":null,"patches":null}"#).unwrap();
        assert!(review.questions.is_empty());
        assert!(review.issues.is_empty());
        assert!(review.patches.is_empty());
    }

    #[test]
    fn test_empty_optional_lists_are_omitted() {
        let review = Review {
            tool: "plancritic".to_string(),
            ..Review::default()
        };
        let value = serde_json::to_value(&review).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("issues"));
        assert!(obj.contains_key("questions"));
        assert!(!obj.contains_key("patches"));
        assert!(!obj.contains_key("checklists"));
        assert!(!obj["input"].as_object().unwrap().contains_key("profile"));
    }

    #[test]
    fn test_patch_type_uses_type_key() {
        let patch: Patch = serde_json::from_str(
            r#"{"id":"PATCH-0001","type":"PLAN_TEXT_EDIT","title":"t","diff_unified":"d"}"#,
        )
        .unwrap();
        assert_eq!(patch.patch_type, PatchType::PlanTextEdit);
        let encoded = serde_json::to_string(&patch).unwrap();
        assert!(encoded.contains(r#""type":"PLAN_TEXT_EDIT""#));
    }

    #[test]
    fn test_evidence_constructors() {
        let ev = Evidence::context("notes.md", 2, 3, "quote");
        assert_eq!(ev.source, EvidenceSource::Context);
        assert_eq!(ev.path, "notes.md");
        assert_eq!((ev.line_start, ev.line_end), (2, 3));
    }
}
