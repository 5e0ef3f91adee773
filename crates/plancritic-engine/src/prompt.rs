use plancritic_adapters::{Profile, SourceFile, StepId};
use plancritic_core::{ValidationError, DEFAULT_MAX_ISSUES, DEFAULT_MAX_QUESTIONS};

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED BUILDING BLOCKS
// ═══════════════════════════════════════════════════════════════════════════════

const PREAMBLE: &str = r#"You are a plan critic. Your task is to review a software implementation plan and produce a structured critique.

You MUST output ONLY valid JSON matching the schema below. No markdown, no prose outside JSON.

"#;

const SCHEMA_DEFINITION: &str = r#"## Output JSON Schema

{
  "tool": "plancritic",
  "version": "1.0",
  "input": {
    "plan_file": string,
    "plan_hash": "sha256:...",
    "context_files": [{"path": string, "hash": "sha256:..."}],
    "profile": string,
    "strict": boolean
  },
  "summary": {
    "verdict": "EXECUTABLE_AS_IS" | "EXECUTABLE_WITH_CLARIFICATIONS" | "NOT_EXECUTABLE",
    "score": integer (0-100),
    "critical_count": integer,
    "warn_count": integer,
    "info_count": integer
  },
  "questions": [{
    "id": "Q-NNNN",
    "severity": "INFO" | "WARN" | "CRITICAL",
    "question": string,
    "why_needed": string,
    "blocks": [string],
    "evidence": [{"source": "plan"|"context", "path": string, "line_start": int, "line_end": int, "quote": string}],
    "suggested_answers": [string]
  }],
  "issues": [{
    "id": "ISSUE-NNNN",
    "severity": "INFO" | "WARN" | "CRITICAL",
    "category": "CONTRADICTION"|"AMBIGUITY"|"MISSING_PREREQUISITE"|"MISSING_ACCEPTANCE_CRITERIA"|"RISK_SECURITY"|"RISK_DATA"|"RISK_OPERATIONS"|"TEST_GAP"|"SCOPE_CREEP_RISK"|"UNREALISTIC_STEP"|"ORDERING_DEPENDENCY"|"UNSPECIFIED_INTERFACE"|"NON_DETERMINISM",
    "title": string,
    "description": string,
    "evidence": [{...}],
    "impact": string,
    "recommendation": string,
    "blocking": boolean,
    "tags": [string]
  }],
  "patches": [{
    "id": "PATCH-NNNN",
    "type": "PLAN_TEXT_EDIT",
    "title": string,
    "diff_unified": string
  }],
  "checklists": [{
    "id": string,
    "title": string,
    "checks": [{"check": string, "status": "PASS"|"FAIL"|"N/A"}]
  }],
  "meta": {
    "model": string,
    "temperature": float
  }
}"#;

const GROUNDING_RULES: &str = r#"## Rules

1. Cite evidence for every issue and question using exact line numbers and quotes from the plan or context.
2. Do NOT invent facts about the repository, codebase, or environment that are not present in the plan or context files.
3. Keep the number of questions minimal. Only ask what is needed to unblock execution.
4. Order issues by severity (CRITICAL first, then WARN, then INFO), then by line number of first evidence.
5. The verdict must be one of: EXECUTABLE_AS_IS, EXECUTABLE_WITH_CLARIFICATIONS, NOT_EXECUTABLE.
6. Compute the score starting at 100, subtracting 20 per CRITICAL, 7 per WARN, 2 per INFO, clamped at 0.

"#;

const STRICT_MODE: &str = r#"## Strict Grounding Mode (ENABLED)

- Treat everything NOT present in the plan or context files as UNKNOWN.
- Do NOT claim "the repo uses X" unless X appears in the provided context.
- Recommendations may be generic but MUST be labeled as such ("If applicable...").
- Any uncertain inference MUST be tagged with "assumption" and severity capped at WARN.

"#;

const REPAIR_HEADER: &str = "The JSON output you returned has validation errors. \
Fix ONLY the errors listed below and return the corrected JSON.\n\n";

// ═══════════════════════════════════════════════════════════════════════════════
// PROMPTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Inputs for [`build_prompt`].
#[derive(Debug, Clone, Copy)]
pub struct PromptOptions<'a> {
    pub plan: &'a SourceFile,
    pub contexts: &'a [SourceFile],
    pub profile: Option<&'a Profile>,
    pub strict: bool,
    pub steps: &'a [StepId],
    pub max_issues: usize,
    pub max_questions: usize,
}

/// Assemble the review prompt. Files are cited by basename only so local
/// paths never reach the provider.
pub fn build_prompt(opts: &PromptOptions<'_>) -> String {
    let mut prompt = String::with_capacity(SCHEMA_DEFINITION.len() + opts.plan.raw.len() * 2);
    prompt.push_str(PREAMBLE);
    prompt.push_str(SCHEMA_DEFINITION);
    prompt.push_str("\n\n");
    prompt.push_str(GROUNDING_RULES);

    if opts.strict {
        prompt.push_str(STRICT_MODE);
    }

    if let Some(profile) = opts.profile {
        prompt.push_str(&profile.format_for_prompt());
        prompt.push('\n');
    }

    prompt.push_str(&format!(
        "<plan path={:?}>\n{}</plan>\n\n",
        opts.plan.file_name(),
        opts.plan.line_numbered()
    ));

    for context in opts.contexts {
        prompt.push_str(&format!(
            "<context path={:?}>\n{}</context>\n\n",
            context.file_name(),
            context.line_numbered()
        ));
    }

    if !opts.steps.is_empty() {
        prompt.push_str("## Inferred Plan Steps\n\n");
        for step in opts.steps {
            prompt.push_str(&format!(
                "- {} (L{}): {}\n",
                step.id, step.line_start, step.text
            ));
        }
        prompt.push('\n');
    }

    let max_issues = if opts.max_issues == 0 {
        DEFAULT_MAX_ISSUES
    } else {
        opts.max_issues
    };
    let max_questions = if opts.max_questions == 0 {
        DEFAULT_MAX_QUESTIONS
    } else {
        opts.max_questions
    };
    prompt.push_str(&format!(
        "Return at most {} issues and {} questions.\n",
        max_issues, max_questions
    ));

    prompt
}

/// Follow-up prompt asking the provider to fix its previous output.
pub fn build_repair_prompt(original_output: &str, errors: &[ValidationError]) -> String {
    let mut prompt = String::from(REPAIR_HEADER);
    prompt.push_str("## Validation Errors\n\n");
    for err in errors {
        prompt.push_str(&format!("- {}: {}\n", err.path, err.message));
    }
    prompt.push_str("\n## Original Output\n\n```json\n");
    prompt.push_str(original_output);
    prompt.push_str("\n```\n\nReturn ONLY the corrected JSON. No prose.\n");
    prompt
}
