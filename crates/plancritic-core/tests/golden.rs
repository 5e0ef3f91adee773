use plancritic_core::{
    post_process, validate, GroundingRules, Issue, PostProcessOptions, Review, Severity, Verdict,
};
use std::path::{Path, PathBuf};

fn testdata(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join(rel)
}

fn read(rel: &str) -> String {
    std::fs::read_to_string(testdata(rel)).unwrap()
}

fn plan_line_count(text: &str) -> usize {
    text.split('\n').count()
}

fn pretty(review: &Review) -> String {
    let mut out = serde_json::to_string_pretty(review).unwrap();
    out.push('\n');
    out
}

#[test]
fn golden_review_is_valid_and_consistent() {
    let golden = read("golden/simple-review.json");
    let review: Review = serde_json::from_str(&golden).unwrap();
    let lines = plan_line_count(&read("plans/simple.md"));
    assert!(!read("contexts/constraints.md").is_empty());

    let errs = validate(&review, lines);
    assert!(errs.is_empty(), "unexpected validation errors: {:?}", errs);

    let ids: Vec<&str> = review.issues.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["ISSUE-0001", "ISSUE-0002", "ISSUE-0003"]);
    assert_eq!(review.summary.verdict, Verdict::NotExecutable);

    let ranks: Vec<u8> = review.issues.iter().map(|i| i.severity.rank()).collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn golden_review_survives_post_processing_unchanged() {
    let golden = read("golden/simple-review.json");
    let review: Review = serde_json::from_str(&golden).unwrap();

    let out = post_process(
        review.clone(),
        &PostProcessOptions::default(),
        &GroundingRules::default(),
    );
    assert_eq!(out.review, review);
    assert_eq!(pretty(&out.review), golden);
}

#[test]
fn post_processed_review_round_trips_byte_for_byte() {
    let golden = read("golden/simple-review.json");
    let review: Review = serde_json::from_str(&golden).unwrap();
    let out = post_process(
        review,
        &PostProcessOptions {
            strict: true,
            ..PostProcessOptions::default()
        },
        &GroundingRules::default(),
    );

    let first = pretty(&out.review);
    let reparsed: Review = serde_json::from_str(&first).unwrap();
    assert_eq!(pretty(&reparsed), first);
}

#[test]
fn unrecognized_enum_values_round_trip_verbatim() {
    let raw = r#"{"issues":[{"id":"ISSUE-0001","severity":"SEVERE","category":"VIBES"}]}"#;
    let review: Review = serde_json::from_str(raw).unwrap();
    let encoded = serde_json::to_string(&review).unwrap();
    assert!(encoded.contains(r#""severity":"SEVERE""#));
    assert!(encoded.contains(r#""category":"VIBES""#));
}

#[test]
fn fabricated_blocking_critical_is_downgraded_before_verdict() {
    let review = Review {
        issues: vec![Issue {
            id: "ISSUE-0001".to_string(),
            severity: Severity::Critical,
            blocking: true,
            title: "Cache invalidation".to_string(),
            description: "The codebase uses Redis for caching.".to_string(),
            ..Issue::default()
        }],
        ..Review::default()
    };

    let out = post_process(
        review,
        &PostProcessOptions {
            strict: true,
            ..PostProcessOptions::default()
        },
        &GroundingRules::default(),
    );

    let issue = &out.review.issues[0];
    assert_eq!(issue.severity, Severity::Warn);
    assert!(issue.has_tag("UNVERIFIED"));
    assert_ne!(out.review.summary.verdict, Verdict::NotExecutable);
    assert_eq!(out.review.summary.verdict, Verdict::ExecutableWithClarifications);
    assert_eq!(out.grounding_violations.len(), 1);
}
