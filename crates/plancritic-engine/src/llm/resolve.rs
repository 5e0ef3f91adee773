//! Provider selection from the `--model` flag and the available API keys.

use super::{AnthropicProvider, OpenAiProvider, Provider};
use anyhow::{anyhow, Result};
use plancritic_adapters::config::{api_key_from_env, ANTHROPIC_KEY_ENV, OPENAI_KEY_ENV};
use std::time::Duration;

/// API keys available to this process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderKeys {
    pub anthropic: Option<String>,
    pub openai: Option<String>,
}

impl ProviderKeys {
    pub fn from_env() -> Self {
        Self {
            anthropic: api_key_from_env(ANTHROPIC_KEY_ENV),
            openai: api_key_from_env(OPENAI_KEY_ENV),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
}

/// Which provider to build, its key, and the model to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSelection {
    pub kind: ProviderKind,
    pub api_key: String,
    /// `None` means the provider's default model.
    pub model: Option<String>,
}

/// Pick a provider.
///
/// `anthropic:<m>` and `claude*` select Anthropic, `openai:<m>` and `gpt*`
/// select OpenAI (the `provider:` prefix is stripped). Anything else falls
/// back to whichever key is present, Anthropic first, passing the flag
/// through as the model name.
pub fn select_provider(model_flag: Option<&str>, keys: &ProviderKeys) -> Result<ProviderSelection> {
    let flag = model_flag.map(str::trim).filter(|m| !m.is_empty());

    if let Some(flag) = flag {
        let lower = flag.to_ascii_lowercase();
        let explicit = if lower.starts_with("anthropic:") {
            Some((ProviderKind::Anthropic, &flag["anthropic:".len()..]))
        } else if lower.starts_with("claude") {
            Some((ProviderKind::Anthropic, flag))
        } else if lower.starts_with("openai:") {
            Some((ProviderKind::OpenAi, &flag["openai:".len()..]))
        } else if lower.starts_with("gpt") {
            Some((ProviderKind::OpenAi, flag))
        } else {
            None
        };

        if let Some((kind, model)) = explicit {
            let api_key = key_for(kind, keys)?;
            return Ok(ProviderSelection {
                kind,
                api_key,
                model: Some(model.to_string()).filter(|m| !m.is_empty()),
            });
        }
    }

    let model = flag.map(str::to_string);
    if let Some(key) = &keys.anthropic {
        return Ok(ProviderSelection {
            kind: ProviderKind::Anthropic,
            api_key: key.clone(),
            model,
        });
    }
    if let Some(key) = &keys.openai {
        return Ok(ProviderSelection {
            kind: ProviderKind::OpenAi,
            api_key: key.clone(),
            model,
        });
    }

    Err(anyhow!(
        "no LLM provider configured: set {} or {}",
        ANTHROPIC_KEY_ENV,
        OPENAI_KEY_ENV
    ))
}

fn key_for(kind: ProviderKind, keys: &ProviderKeys) -> Result<String> {
    let (key, var) = match kind {
        ProviderKind::Anthropic => (&keys.anthropic, ANTHROPIC_KEY_ENV),
        ProviderKind::OpenAi => (&keys.openai, OPENAI_KEY_ENV),
    };
    key.clone()
        .ok_or_else(|| anyhow!("{} environment variable not set", var))
}

/// Build the selected provider with a per-request HTTP timeout.
pub fn resolve_provider(
    model_flag: Option<&str>,
    keys: &ProviderKeys,
    timeout: Duration,
) -> Result<(Box<dyn Provider>, Option<String>)> {
    let selection = select_provider(model_flag, keys)?;
    let provider: Box<dyn Provider> = match selection.kind {
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(selection.api_key, timeout)?),
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new(selection.api_key, timeout)?),
    };
    Ok((provider, selection.model))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both() -> ProviderKeys {
        ProviderKeys {
            anthropic: Some("ak".to_string()),
            openai: Some("ok".to_string()),
        }
    }

    #[test]
    fn test_anthropic_prefix_is_stripped() {
        let sel = select_provider(Some("anthropic:claude-opus-4"), &both()).unwrap();
        assert_eq!(sel.kind, ProviderKind::Anthropic);
        assert_eq!(sel.model.as_deref(), Some("claude-opus-4"));
        assert_eq!(sel.api_key, "ak");
    }

    #[test]
    fn test_claude_prefix_keeps_name() {
        let sel = select_provider(Some("claude-sonnet-4-6"), &both()).unwrap();
        assert_eq!(sel.kind, ProviderKind::Anthropic);
        assert_eq!(sel.model.as_deref(), Some("claude-sonnet-4-6"));
    }

    #[test]
    fn test_openai_prefixes() {
        let sel = select_provider(Some("openai:o3"), &both()).unwrap();
        assert_eq!(sel.kind, ProviderKind::OpenAi);
        assert_eq!(sel.model.as_deref(), Some("o3"));

        let sel = select_provider(Some("GPT-4o"), &both()).unwrap();
        assert_eq!(sel.kind, ProviderKind::OpenAi);
        assert_eq!(sel.model.as_deref(), Some("GPT-4o"));
    }

    #[test]
    fn test_explicit_provider_without_key_fails() {
        let keys = ProviderKeys {
            anthropic: None,
            openai: Some("ok".to_string()),
        };
        let err = select_provider(Some("claude-x"), &keys).unwrap_err();
        assert_eq!(err.to_string(), "ANTHROPIC_API_KEY environment variable not set");
    }

    #[test]
    fn test_auto_detect_prefers_anthropic() {
        let sel = select_provider(None, &both()).unwrap();
        assert_eq!(sel.kind, ProviderKind::Anthropic);
        assert_eq!(sel.model, None);

        let only_openai = ProviderKeys {
            anthropic: None,
            openai: Some("ok".to_string()),
        };
        let sel = select_provider(Some("  "), &only_openai).unwrap();
        assert_eq!(sel.kind, ProviderKind::OpenAi);
        assert_eq!(sel.model, None);
    }

    #[test]
    fn test_unknown_model_passes_through() {
        let sel = select_provider(Some("mistral-large"), &both()).unwrap();
        assert_eq!(sel.kind, ProviderKind::Anthropic);
        assert_eq!(sel.model.as_deref(), Some("mistral-large"));
    }

    #[test]
    fn test_no_keys() {
        let err = select_provider(None, &ProviderKeys::default()).unwrap_err();
        assert!(err.to_string().starts_with("no LLM provider configured"));
    }

    #[test]
    fn test_resolve_builds_named_provider() {
        let (provider, model) =
            resolve_provider(Some("gpt-4o-mini"), &both(), Duration::from_secs(1)).unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(model.as_deref(), Some("gpt-4o-mini"));
    }
}
