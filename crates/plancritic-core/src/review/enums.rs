//! Closed vocabularies used by the review document.
//!
//! Each enum keeps values outside its set in an `Unrecognized` variant rather
//! than failing deserialization, so the schema validator can report them by
//! path and a serialized review round-trips byte for byte.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! closed_set {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value outside the closed set, kept verbatim.
            Unrecognized(String),
        }

        impl $name {
            /// Every member of the closed set, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $text,)+
                    $name::Unrecognized(raw) => raw,
                }
            }

            /// True for members of the closed set.
            pub fn is_valid(&self) -> bool {
                !matches!(self, $name::Unrecognized(_))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::Unrecognized(String::new())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $($text => $name::$variant,)+
                    _ => $name::Unrecognized(raw),
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                $name::from(raw.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Unrecognized(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_set! {
    /// Overall executability of the reviewed plan.
    Verdict {
        ExecutableAsIs => "EXECUTABLE_AS_IS",
        ExecutableWithClarifications => "EXECUTABLE_WITH_CLARIFICATIONS",
        NotExecutable => "NOT_EXECUTABLE",
    }
}

closed_set! {
    /// Importance of an issue or question.
    Severity {
        Info => "INFO",
        Warn => "WARN",
        Critical => "CRITICAL",
    }
}

closed_set! {
    /// Kind of problem an issue describes.
    Category {
        Contradiction => "CONTRADICTION",
        Ambiguity => "AMBIGUITY",
        MissingPrerequisite => "MISSING_PREREQUISITE",
        MissingAcceptanceCriteria => "MISSING_ACCEPTANCE_CRITERIA",
        RiskSecurity => "RISK_SECURITY",
        RiskData => "RISK_DATA",
        RiskOperations => "RISK_OPERATIONS",
        TestGap => "TEST_GAP",
        ScopeCreepRisk => "SCOPE_CREEP_RISK",
        UnrealisticStep => "UNREALISTIC_STEP",
        OrderingDependency => "ORDERING_DEPENDENCY",
        UnspecifiedInterface => "UNSPECIFIED_INTERFACE",
        NonDeterminism => "NON_DETERMINISM",
    }
}

closed_set! {
    PatchType {
        PlanTextEdit => "PLAN_TEXT_EDIT",
    }
}

closed_set! {
    /// Outcome of a single profile checklist item.
    CheckStatus {
        Pass => "PASS",
        Fail => "FAIL",
        NotApplicable => "N/A",
    }
}

closed_set! {
    /// Which input an evidence citation points into.
    EvidenceSource {
        Plan => "plan",
        Context => "context",
    }
}

impl Severity {
    /// Sort key: lower sorts first. Unrecognized values sort last.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::Warn => 1,
            Severity::Info => 2,
            Severity::Unrecognized(_) => 3,
        }
    }
}

impl Verdict {
    /// Escalation level used by `--fail-on`; `None` for unrecognized values.
    pub fn level(&self) -> Option<u8> {
        match self {
            Verdict::ExecutableAsIs => Some(0),
            Verdict::ExecutableWithClarifications => Some(1),
            Verdict::NotExecutable => Some(2),
            Verdict::Unrecognized(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_validity() {
        for verdict in Verdict::ALL {
            assert!(verdict.is_valid(), "{} should be valid", verdict);
        }
        assert!(!Verdict::from("INVALID").is_valid());
    }

    #[test]
    fn test_severity_validity() {
        for severity in Severity::ALL {
            assert!(severity.is_valid());
        }
        assert!(!Severity::from("HIGH").is_valid());
        // Matching is exact; the model must use the upper-case spelling.
        assert!(!Severity::from("warn").is_valid());
    }

    #[test]
    fn test_category_has_thirteen_members() {
        assert_eq!(Category::ALL.len(), 13);
        for category in Category::ALL {
            assert!(category.is_valid());
            assert_eq!(Category::from(category.as_str()), *category);
        }
        assert!(!Category::from("UNKNOWN").is_valid());
    }

    #[test]
    fn test_patch_type_and_check_status() {
        assert!(PatchType::PlanTextEdit.is_valid());
        assert!(!PatchType::from("OTHER").is_valid());
        for status in CheckStatus::ALL {
            assert!(status.is_valid());
        }
        assert_eq!(CheckStatus::from("N/A"), CheckStatus::NotApplicable);
        assert!(!CheckStatus::from("MAYBE").is_valid());
    }

    #[test]
    fn test_default_is_empty_and_invalid() {
        assert_eq!(Severity::default().as_str(), "");
        assert!(!Severity::default().is_valid());
        assert!(!EvidenceSource::default().is_valid());
    }

    #[test]
    fn test_unrecognized_values_serialize_verbatim() {
        let parsed: Severity = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(parsed, Severity::Unrecognized("HIGH".to_string()));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"HIGH\"");

        let known: Category = serde_json::from_str("\"TEST_GAP\"").unwrap();
        assert_eq!(known, Category::TestGap);
        assert_eq!(serde_json::to_string(&known).unwrap(), "\"TEST_GAP\"");
    }

    #[test]
    fn test_severity_rank_order() {
        assert!(Severity::Critical.rank() < Severity::Warn.rank());
        assert!(Severity::Warn.rank() < Severity::Info.rank());
        assert!(Severity::Info.rank() < Severity::from("BOGUS").rank());
    }

    #[test]
    fn test_verdict_levels() {
        assert_eq!(Verdict::ExecutableAsIs.level(), Some(0));
        assert_eq!(Verdict::NotExecutable.level(), Some(2));
        assert_eq!(Verdict::from("MAYBE").level(), None);
    }
}
