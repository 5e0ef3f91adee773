use super::{Issue, Severity};

const BASE_SCORE: i64 = 100;
const CRITICAL_PENALTY: i64 = 20;
const WARN_PENALTY: i64 = 7;
const INFO_PENALTY: i64 = 2;

/// Deterministic 0-100 score: start at 100, subtract 20 per CRITICAL,
/// 7 per WARN and 2 per INFO, then clamp.
pub fn compute_score(issues: &[Issue]) -> i64 {
    let penalty: i64 = issues
        .iter()
        .map(|issue| match issue.severity {
            Severity::Critical => CRITICAL_PENALTY,
            Severity::Warn => WARN_PENALTY,
            Severity::Info => INFO_PENALTY,
            Severity::Unrecognized(_) => 0,
        })
        .sum();
    (BASE_SCORE - penalty).clamp(0, 100)
}
