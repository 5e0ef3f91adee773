use super::{compute_score, Issue, Severity, Summary, Verdict};

/// Number of issues per recognized severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeverityCounts {
    pub critical: i64,
    pub warn: i64,
    pub info: i64,
}

impl SeverityCounts {
    pub fn tally(issues: &[Issue]) -> Self {
        let mut counts = Self::default();
        for issue in issues {
            match issue.severity {
                Severity::Critical => counts.critical += 1,
                Severity::Warn => counts.warn += 1,
                Severity::Info => counts.info += 1,
                Severity::Unrecognized(_) => {}
            }
        }
        counts
    }
}

/// Derive the verdict, score and counts from the issue list.
///
/// A blocking CRITICAL makes the plan not executable; any other CRITICAL or
/// WARN requires clarification; otherwise it is executable as is.
pub fn compute_summary(issues: &[Issue]) -> Summary {
    let counts = SeverityCounts::tally(issues);
    let has_blocking_critical = issues
        .iter()
        .any(|issue| issue.severity == Severity::Critical && issue.blocking);

    let verdict = if has_blocking_critical {
        Verdict::NotExecutable
    } else if counts.critical > 0 || counts.warn > 0 {
        Verdict::ExecutableWithClarifications
    } else {
        Verdict::ExecutableAsIs
    };

    Summary {
        verdict,
        score: compute_score(issues),
        critical_count: counts.critical,
        warn_count: counts.warn,
        info_count: counts.info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(severity: Severity, blocking: bool) -> Issue {
        Issue {
            severity,
            blocking,
            ..Issue::default()
        }
    }

    #[test]
    fn test_verdict_policy() {
        assert_eq!(compute_summary(&[]).verdict, Verdict::ExecutableAsIs);
        assert_eq!(
            compute_summary(&[issue(Severity::Info, true)]).verdict,
            Verdict::ExecutableAsIs
        );
        assert_eq!(
            compute_summary(&[issue(Severity::Warn, false)]).verdict,
            Verdict::ExecutableWithClarifications
        );
        assert_eq!(
            compute_summary(&[issue(Severity::Critical, false)]).verdict,
            Verdict::ExecutableWithClarifications
        );
        assert_eq!(
            compute_summary(&[issue(Severity::Critical, true)]).verdict,
            Verdict::NotExecutable
        );
    }

    #[test]
    fn test_blocking_critical_wins_regardless_of_others() {
        let issues = vec![
            issue(Severity::Info, false),
            issue(Severity::Warn, true),
            issue(Severity::Critical, true),
            issue(Severity::Critical, false),
        ];
        let summary = compute_summary(&issues);
        assert_eq!(summary.verdict, Verdict::NotExecutable);
        assert_eq!(summary.critical_count, 2);
        assert_eq!(summary.warn_count, 1);
        assert_eq!(summary.info_count, 1);
        assert_eq!(summary.score, compute_score(&issues));
    }

    #[test]
    fn test_unrecognized_severity_is_not_counted() {
        let counts = SeverityCounts::tally(&[issue(Severity::from("HIGH"), true)]);
        assert_eq!(counts, SeverityCounts::default());
    }
}
