//! Built-in review profiles: constraints, checklists and heuristics that are
//! rendered into the prompt.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

const BUILTIN: &[(&str, &str)] = &[
    ("backend-service", include_str!("profiles/backend-service.yaml")),
    ("frontend-app", include_str!("profiles/frontend-app.yaml")),
    ("general", include_str!("profiles/general.yaml")),
];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub version: u32,
    pub description: String,
    pub constraints: BTreeMap<String, Value>,
    pub checklists: Vec<ProfileChecklist>,
    pub heuristics: Heuristics,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProfileChecklist {
    pub id: String,
    pub title: String,
    pub checks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    pub contradictions: Vec<Contradiction>,
    pub ambiguity_triggers: Vec<String>,
}

/// Two phrases that, appearing together, suggest the plan contradicts itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Contradiction {
    pub trigger_a: String,
    pub trigger_b: String,
    pub severity: String,
    pub note: String,
}

/// Names of the embedded profiles, sorted.
pub fn list_builtin() -> Vec<&'static str> {
    let mut names: Vec<&str> = BUILTIN.iter().map(|(name, _)| *name).collect();
    names.sort_unstable();
    names
}

pub fn load_builtin(name: &str) -> Result<Profile> {
    let (_, source) = BUILTIN
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .ok_or_else(|| {
            anyhow!(
                "unknown profile '{}' (available: {})",
                name,
                list_builtin().join(", ")
            )
        })?;
    parse_profile(source).with_context(|| format!("failed to parse profile '{}'", name))
}

pub fn parse_profile(source: &str) -> Result<Profile> {
    Ok(serde_yaml::from_str(source)?)
}

impl Profile {
    /// Render the profile as a prompt section.
    pub fn format_for_prompt(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("## Profile: {}\n\n", self.name));
        let description = self.description.trim();
        if !description.is_empty() {
            out.push_str(&format!("{}\n\n", description));
        }

        if !self.constraints.is_empty() {
            out.push_str("### Constraints\n\n");
            for (key, value) in &self.constraints {
                render_constraint(&mut out, key, value, "");
            }
            out.push('\n');
        }

        if !self.checklists.is_empty() {
            out.push_str("### Checklists\n\n");
            for checklist in &self.checklists {
                out.push_str(&format!("**{}** ({})\n", checklist.title, checklist.id));
                for check in &checklist.checks {
                    out.push_str(&format!("- {}\n", check));
                }
                out.push('\n');
            }
        }

        let h = &self.heuristics;
        if !h.contradictions.is_empty() || !h.ambiguity_triggers.is_empty() {
            out.push_str("### Heuristics\n\n");
            if !h.contradictions.is_empty() {
                out.push_str("Watch for these contradiction pairs:\n");
                for c in &h.contradictions {
                    out.push_str(&format!(
                        "- {:?} vs {:?} -> {} ({})\n",
                        c.trigger_a, c.trigger_b, c.severity, c.note
                    ));
                }
                out.push('\n');
            }
            if !h.ambiguity_triggers.is_empty() {
                out.push_str("Flag these vague phrases as ambiguity:\n");
                for trigger in &h.ambiguity_triggers {
                    out.push_str(&format!("- {:?}\n", trigger));
                }
                out.push('\n');
            }
        }

        out
    }
}

fn render_constraint(out: &mut String, key: &str, value: &Value, indent: &str) {
    match value {
        Value::Mapping(map) => {
            out.push_str(&format!("{}- {}:\n", indent, key));
            let mut entries: Vec<(String, &Value)> =
                map.iter().map(|(k, v)| (scalar_text(k), v)).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let nested = format!("{}  ", indent);
            for (k, v) in entries {
                render_constraint(out, &k, v, &nested);
            }
        }
        Value::Sequence(items) => {
            out.push_str(&format!("{}- {}:\n", indent, key));
            for item in items {
                out.push_str(&format!("{}  - {}\n", indent, scalar_text(item)));
            }
        }
        other => out.push_str(&format!("{}- {}: {}\n", indent, key, scalar_text(other))),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        nested => serde_yaml::to_string(nested)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
