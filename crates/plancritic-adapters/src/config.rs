//! Configuration management for plancritic
//!
//! Stores defaults in ~/.config/plancritic/config.json. The `PLANCRITIC_CONFIG`
//! environment variable points at an alternative file. API keys are never
//! stored here; they come from the environment only.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const CONFIG_ENV: &str = "PLANCRITIC_CONFIG";
pub const ANTHROPIC_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_TEMPERATURE: f64 = 0.2;
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_MAX_ISSUES: usize = 50;
const DEFAULT_MAX_QUESTIONS: usize = 20;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model flag used when `--model` is not given, e.g. `anthropic:claude-sonnet-4-6`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub profile: String,
    pub strict: bool,
    pub redact: bool,
    pub max_issues: usize,
    pub max_questions: usize,
    pub request_timeout_secs: u64,
    pub severity_threshold: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            profile: "general".to_string(),
            strict: false,
            redact: true,
            max_issues: DEFAULT_MAX_ISSUES,
            max_questions: DEFAULT_MAX_QUESTIONS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            severity_threshold: "info".to_string(),
        }
    }
}

impl Config {
    /// Pull out-of-range values back to something usable.
    pub fn sanitize(&mut self) {
        if !self.temperature.is_finite() {
            self.temperature = DEFAULT_TEMPERATURE;
        }
        self.temperature = self.temperature.clamp(0.0, 2.0);
        if self.max_tokens == 0 {
            self.max_tokens = DEFAULT_MAX_TOKENS;
        }
        if self.max_issues == 0 {
            self.max_issues = DEFAULT_MAX_ISSUES;
        }
        if self.max_questions == 0 {
            self.max_questions = DEFAULT_MAX_QUESTIONS;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
        if self.profile.trim().is_empty() {
            self.profile = "general".to_string();
        }
        if self.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            self.model = None;
        }
    }

    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("plancritic"))
    }

    /// Resolved config file path: `$PLANCRITIC_CONFIG`, else the user config dir.
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(path));
        }
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from disk, or return default
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Never fails: a missing file yields defaults, and a corrupt one is moved
    /// aside to `config.json.corrupt` before defaults are used.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str::<Config>(&content) {
            Ok(mut config) => {
                config.sanitize();
                config
            }
            Err(err) => {
                preserve_corrupt_config(path, &content);
                warn!(
                    path = %path.display(),
                    error = %err,
                    "config file was corrupted; a backup was saved and defaults were loaded"
                );
                Self::default()
            }
        }
    }

    /// Save config to disk
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path().context("could not determine config directory")?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let mut sanitized = self.clone();
        sanitized.sanitize();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create config directory {}", dir.display()))?;
        }

        let content =
            serde_json::to_string_pretty(&sanitized).context("failed to serialize config")?;
        write_config_atomic(path, &content)
            .with_context(|| format!("failed to write config {}", path.display()))
    }

    /// Get the config file location for display
    pub fn config_location() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.config/plancritic/config.json".to_string())
    }
}

/// Read a non-empty API key from the environment.
pub fn api_key_from_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

fn preserve_corrupt_config(path: &Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}

fn write_config_atomic(path: &Path, content: &str) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io::Write;

    let tmp_path = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
            warn!(error = %e, "failed to set temp config file permissions");
        }
    }

    file.write_all(content.as_bytes())?;
    drop(file);

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }
    Ok(())
}
