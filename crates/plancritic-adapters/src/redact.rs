//! Secret scrubbing applied to plan and context text before it is sent to a
//! provider.

use regex::Regex;
use tracing::warn;

pub const REDACTED: &str = "[REDACTED]";

/// Built-in secret patterns, applied in order.
pub const DEFAULT_PATTERNS: &[&str] = &[
    // AWS access key IDs
    r"AKIA[0-9A-Z]{16}",
    // AWS secret access keys
    r"(?i)(aws_secret_access_key|aws_secret)\s*[:=]\s*[A-Za-z0-9/+=]{40}",
    // Private key blocks
    r"-----BEGIN [A-Z ]+PRIVATE KEY-----[\s\S]*?-----END [A-Z ]+PRIVATE KEY-----",
    // Bearer tokens
    r"Bearer\s+[A-Za-z0-9\-._~+/]+=*",
    // Generic key/secret/token/password assignments
    r"(?i)(api[_-]?key|api[_-]?secret|secret[_-]?key|token|password|passwd|credentials)\s*[:=]\s*\S+",
];

/// Compiled pattern set. Build once and share by reference.
#[derive(Debug, Clone)]
pub struct Redactor {
    patterns: Vec<Regex>,
}

impl Redactor {
    pub fn new() -> Self {
        let mut patterns = Vec::with_capacity(DEFAULT_PATTERNS.len());
        for raw in DEFAULT_PATTERNS {
            match Regex::new(raw) {
                Ok(re) => patterns.push(re),
                Err(err) => warn!(pattern = raw, error = %err, "skipping redaction pattern"),
            }
        }
        Self { patterns }
    }

    /// Compile a custom pattern list. Fails on the first invalid pattern.
    pub fn with_patterns<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn redact(&self, text: &str) -> String {
        let mut out = text.to_string();
        for re in &self.patterns {
            if re.is_match(&out) {
                out = re.replace_all(&out, REDACTED).into_owned();
            }
        }
        out
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}
