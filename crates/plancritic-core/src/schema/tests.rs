use super::*;
use crate::review::{
    compute_summary, Category, CheckItem, CheckStatus, Checklist, PatchType, Severity, Summary,
    Verdict,
};

fn valid_review() -> Review {
    let issues = vec![
        Issue {
            id: "ISSUE-0001".to_string(),
            severity: Severity::Critical,
            category: Category::MissingPrerequisite,
            title: "No rollback path".to_string(),
            description: "Step 3 migrates the schema without a rollback.".to_string(),
            evidence: vec![Evidence::plan("plan.md", 3, 4, "Run the migration")],
            blocking: true,
            ..Issue::default()
        },
        Issue {
            id: "ISSUE-0002".to_string(),
            severity: Severity::Info,
            category: Category::TestGap,
            title: "Thin test coverage".to_string(),
            description: "No integration test is listed.".to_string(),
            evidence: vec![Evidence::context("notes.md", 40, 41, "tests live in ci/")],
            ..Issue::default()
        },
    ];
    Review {
        tool: "plancritic".to_string(),
        version: "0.3.0".to_string(),
        summary: compute_summary(&issues),
        issues,
        questions: vec![Question {
            id: "Q-0001".to_string(),
            severity: Severity::Warn,
            question: "Which database version is targeted?".to_string(),
            why_needed: "Migration syntax differs across versions.".to_string(),
            evidence: vec![Evidence::plan("plan.md", 1, 1, "Upgrade the database")],
            ..Question::default()
        }],
        patches: vec![Patch {
            id: "PATCH-0001".to_string(),
            patch_type: PatchType::PlanTextEdit,
            title: "Add rollback step".to_string(),
            diff_unified: "--- a/plan.md\n+++ b/plan.md\n".to_string(),
        }],
        checklists: vec![Checklist {
            id: "CL-1".to_string(),
            title: "Backend".to_string(),
            checks: vec![CheckItem {
                check: "Has rollback".to_string(),
                status: CheckStatus::Fail,
            }],
        }],
        ..Review::default()
    }
}

fn paths(errs: &[ValidationError]) -> Vec<&str> {
    errs.iter().map(|e| e.path.as_str()).collect()
}

#[test]
fn test_valid_review_has_no_errors() {
    assert!(validate(&valid_review(), 10).is_empty());
    assert!(validate(&valid_review(), 0).is_empty());
}

#[test]
fn test_missing_tool_and_version() {
    let mut review = valid_review();
    review.tool.clear();
    review.version.clear();
    let errs = validate(&review, 10);
    assert_eq!(paths(&errs), vec!["tool", "version"]);
    assert!(errs.iter().all(|e| e.message == "required"));
}

#[test]
fn test_whitespace_only_id_is_missing_but_text_is_kept() {
    let mut review = valid_review();
    review.issues[1].id = "   ".to_string();
    review.issues[1].title = " ".to_string();
    let errs = validate(&review, 10);
    assert_eq!(paths(&errs), vec!["issues[1].id"]);
}

#[test]
fn test_negative_numbers_are_schema_errors() {
    let mut value = serde_json::to_value(valid_review()).unwrap();
    value["summary"]["score"] = serde_json::json!(-5);
    value["issues"][0]["evidence"][0]["line_start"] = serde_json::json!(-1);
    let review: Review = serde_json::from_value(value).unwrap();

    let errs = validate(&review, 10);
    assert_eq!(
        paths(&errs),
        vec!["summary.score", "issues[0].evidence[0].line_start"]
    );
    assert_eq!(errs[0].message, "score -5 does not match computed 78");
    assert_eq!(errs[1].message, "must be >= 1");
}

#[test]
fn test_invalid_verdict() {
    let mut review = valid_review();
    review.summary.verdict = Verdict::from("MAYBE");
    let errs = validate(&review, 10);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].to_string(), r#"summary.verdict: invalid verdict: "MAYBE""#);
}

#[test]
fn test_score_mismatch() {
    let mut review = valid_review();
    review.summary.score = 100;
    let errs = validate(&review, 10);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].path, "summary.score");
    assert_eq!(errs[0].message, "score 100 does not match computed 78");
}

#[test]
fn test_count_mismatch() {
    let mut review = valid_review();
    review.summary = Summary {
        warn_count: 3,
        ..review.summary.clone()
    };
    let errs = validate(&review, 10);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].path, "summary.warn_count");
    assert_eq!(errs[0].message, "expected 0, got 3");
}

#[test]
fn test_duplicate_issue_id_reported_on_later_entry() {
    let mut review = valid_review();
    review.issues[1].id = "ISSUE-0001".to_string();
    let errs = validate(&review, 10);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].path, "issues[1].id");
    assert_eq!(errs[0].message, r#"duplicate ID: "ISSUE-0001""#);
}

#[test]
fn test_issue_and_question_id_spaces_are_separate() {
    let mut review = valid_review();
    review.questions[0].id = "ISSUE-0001".to_string();
    assert!(validate(&review, 10).is_empty());
}

#[test]
fn test_invalid_category() {
    let mut review = valid_review();
    review.issues[0].category = Category::from("VIBES");
    let errs = validate(&review, 10);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].to_string(), r#"issues[0].category: invalid: "VIBES""#);
}

#[test]
fn test_missing_issue_text_fields() {
    let mut review = valid_review();
    review.issues[1].title.clear();
    review.issues[1].description.clear();
    let errs = validate(&review, 10);
    assert_eq!(paths(&errs), vec!["issues[1].title", "issues[1].description"]);
}

#[test]
fn test_missing_evidence() {
    let mut review = valid_review();
    review.questions[0].evidence.clear();
    let errs = validate(&review, 10);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].path, "questions[0].evidence");
    assert_eq!(errs[0].message, "at least one evidence entry required");
}

#[test]
fn test_evidence_source_must_be_plan_or_context() {
    let mut review = valid_review();
    review.issues[0].evidence[0].source = EvidenceSource::from("web");
    let errs = validate(&review, 10);
    assert_eq!(errs.len(), 1);
    assert_eq!(
        errs[0].to_string(),
        r#"issues[0].evidence[0].source: must be 'plan' or 'context', got "web""#
    );
}

#[test]
fn test_evidence_line_bounds() {
    let mut review = valid_review();
    review.issues[0].evidence[0].line_start = 0;
    review.issues[0].evidence[0].line_end = 0;
    let errs = validate(&review, 10);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].path, "issues[0].evidence[0].line_start");
    assert_eq!(errs[0].message, "must be >= 1");

    let mut review = valid_review();
    review.issues[0].evidence[0].line_end = 2;
    let errs = validate(&review, 10);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].path, "issues[0].evidence[0].line_end");
    assert_eq!(errs[0].message, "must be >= line_start");
}

#[test]
fn test_plan_line_count_applies_only_to_plan_evidence() {
    let review = valid_review();
    // Context evidence cites line 41, plan evidence tops out at line 4.
    assert!(validate(&review, 4).is_empty());

    let errs = validate(&review, 3);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].path, "issues[0].evidence[0].line_end");
    assert_eq!(errs[0].message, "exceeds plan line count (3)");
}

#[test]
fn test_missing_quote_and_path() {
    let mut review = valid_review();
    review.issues[1].evidence[0].quote.clear();
    review.issues[1].evidence[0].path.clear();
    let errs = validate(&review, 10);
    assert_eq!(
        paths(&errs),
        vec!["issues[1].evidence[0].path", "issues[1].evidence[0].quote"]
    );
}

#[test]
fn test_question_required_fields() {
    let mut review = valid_review();
    review.questions[0].question.clear();
    review.questions[0].why_needed.clear();
    review.questions[0].severity = Severity::from("LOW");
    let errs = validate(&review, 10);
    assert_eq!(
        paths(&errs),
        vec![
            "questions[0].severity",
            "questions[0].question",
            "questions[0].why_needed"
        ]
    );
}

#[test]
fn test_patch_fields() {
    let mut review = valid_review();
    review.patches[0].patch_type = PatchType::from("REWRITE");
    review.patches[0].diff_unified.clear();
    let errs = validate(&review, 10);
    assert_eq!(paths(&errs), vec!["patches[0].type", "patches[0].diff_unified"]);
}

#[test]
fn test_checklist_status() {
    let mut review = valid_review();
    review.checklists[0].checks[0].status = CheckStatus::from("SKIPPED");
    let errs = validate(&review, 10);
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].path, "checklists[0].checks[0].status");
}

#[test]
fn test_all_errors_are_collected() {
    let mut review = valid_review();
    review.tool.clear();
    review.issues[0].title.clear();
    review.questions[0].evidence[0].quote.clear();
    review.patches[0].title.clear();
    assert_eq!(validate(&review, 10).len(), 4);
}
