//! Heuristic detection of claims the model could not have grounded in the
//! supplied plan or context, and the severity downgrade applied to them.

use super::{Issue, Review, Severity};
use std::collections::HashSet;

/// Tag added to issues whose text reads like invented repository knowledge.
pub const UNVERIFIED_TAG: &str = "UNVERIFIED";

/// Phrases suggesting the model described a codebase it never saw.
pub const DEFAULT_FABRICATION_PHRASES: &[&str] = &[
    "the codebase uses",
    "the repository contains",
    "the existing implementation",
    "currently the system",
    "as seen in the source",
    "the project's",
    "the current codebase",
    "looking at the code",
    "in the source code",
    "the existing code",
];

/// Immutable phrase table, built once and passed to [`check_grounding`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingRules {
    phrases: Vec<String>,
}

impl Default for GroundingRules {
    fn default() -> Self {
        Self::new(DEFAULT_FABRICATION_PHRASES.iter().copied())
    }
}

impl GroundingRules {
    /// Phrases are matched case-insensitively; blank entries are ignored.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let phrases = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty() && seen.insert(p.clone()))
            .collect();
        Self { phrases }
    }

    /// The default table plus `extra` phrases.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extra: Vec<String> = extra.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::new(
            DEFAULT_FABRICATION_PHRASES
                .iter()
                .map(|p| p.to_string())
                .chain(extra),
        )
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    fn matches<'a>(&'a self, text: &str) -> impl Iterator<Item = &'a String> + 'a {
        let lower = text.to_lowercase();
        self.phrases
            .iter()
            .filter(move |phrase| lower.contains(phrase.as_str()))
    }
}

/// Whether a violation was found in an issue or a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroundingSubject {
    Issue,
    Question,
}

/// One matched phrase in one field of one issue or question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingViolation {
    pub subject: GroundingSubject,
    pub id: String,
    pub field: &'static str,
    pub phrase: String,
}

/// Scan issue descriptions, impacts and recommendations, and question texts
/// and rationales, for fabrication phrases.
pub fn check_grounding(review: &Review, rules: &GroundingRules) -> Vec<GroundingViolation> {
    let mut violations = Vec::new();

    for issue in &review.issues {
        let fields = [
            ("description", &issue.description),
            ("impact", &issue.impact),
            ("recommendation", &issue.recommendation),
        ];
        collect(&mut violations, rules, GroundingSubject::Issue, &issue.id, &fields);
    }

    for question in &review.questions {
        let fields = [
            ("question", &question.question),
            ("why_needed", &question.why_needed),
        ];
        collect(
            &mut violations,
            rules,
            GroundingSubject::Question,
            &question.id,
            &fields,
        );
    }

    violations
}

fn collect(
    out: &mut Vec<GroundingViolation>,
    rules: &GroundingRules,
    subject: GroundingSubject,
    id: &str,
    fields: &[(&'static str, &String)],
) {
    for &(field, text) in fields {
        for phrase in rules.matches(text) {
            out.push(GroundingViolation {
                subject,
                id: id.to_string(),
                field,
                phrase: phrase.clone(),
            });
        }
    }
}

/// Tag each violated issue `UNVERIFIED` and cap its severity at WARN.
///
/// Questions are reported by [`check_grounding`] but left untouched here.
/// Applying the same violations twice changes nothing further.
pub fn apply_grounding_downgrades(mut review: Review, violations: &[GroundingViolation]) -> Review {
    let flagged: HashSet<&str> = violations
        .iter()
        .filter(|v| v.subject == GroundingSubject::Issue)
        .map(|v| v.id.as_str())
        .collect();

    let mut handled = HashSet::new();
    for issue in review.issues.iter_mut() {
        if flagged.contains(issue.id.as_str()) && handled.insert(issue.id.clone()) {
            downgrade(issue);
        }
    }

    review
}

fn downgrade(issue: &mut Issue) {
    if !issue.has_tag(UNVERIFIED_TAG) {
        issue.tags.push(UNVERIFIED_TAG.to_string());
    }
    if issue.severity == Severity::Critical {
        issue.severity = Severity::Warn;
    }
}
