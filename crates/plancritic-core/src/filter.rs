//! Severity threshold filtering and the `--fail-on` verdict policy.

use crate::review::{Issue, Question, Severity, Verdict};
use std::fmt;
use std::str::FromStr;

/// Lowest severity still reported. `Info` keeps everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeverityThreshold {
    Critical,
    Warn,
    #[default]
    Info,
}

impl SeverityThreshold {
    fn rank(self) -> u8 {
        match self {
            SeverityThreshold::Critical => 0,
            SeverityThreshold::Warn => 1,
            SeverityThreshold::Info => 2,
        }
    }

    /// True when `severity` is a known value at or above this threshold.
    pub fn admits(self, severity: &Severity) -> bool {
        severity.is_valid() && severity.rank() <= self.rank()
    }

    pub fn filter_issues(self, issues: Vec<Issue>) -> Vec<Issue> {
        issues
            .into_iter()
            .filter(|issue| self.admits(&issue.severity))
            .collect()
    }

    pub fn filter_questions(self, questions: Vec<Question>) -> Vec<Question> {
        questions
            .into_iter()
            .filter(|q| self.admits(&q.severity))
            .collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeverityThreshold::Critical => "critical",
            SeverityThreshold::Warn => "warn",
            SeverityThreshold::Info => "info",
        }
    }
}

impl FromStr for SeverityThreshold {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(SeverityThreshold::Critical),
            "warn" => Ok(SeverityThreshold::Warn),
            "info" => Ok(SeverityThreshold::Info),
            other => Err(format!(
                "unknown severity threshold '{}' (expected info, warn or critical)",
                other
            )),
        }
    }
}

impl fmt::Display for SeverityThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict level at which the CLI exits non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Executable,
    Clarifications,
    NotExecutable,
}

impl FailOn {
    fn level(self) -> u8 {
        match self {
            FailOn::Executable => 0,
            FailOn::Clarifications => 1,
            FailOn::NotExecutable => 2,
        }
    }

    /// Unrecognized verdicts never meet a threshold.
    pub fn is_met_by(self, verdict: &Verdict) -> bool {
        verdict.level().is_some_and(|level| level >= self.level())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailOn::Executable => "executable",
            FailOn::Clarifications => "clarifications",
            FailOn::NotExecutable => "not_executable",
        }
    }
}

impl fmt::Display for FailOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailOn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "executable" => Ok(FailOn::Executable),
            "clarifications" => Ok(FailOn::Clarifications),
            "not_executable" | "not-executable" | "critical" => Ok(FailOn::NotExecutable),
            other => Err(format!(
                "unknown fail-on level '{}' (expected executable, clarifications or not_executable)",
                other
            )),
        }
    }
}
