//! The `check` subcommand: load inputs, run the review, emit the result.

use crate::exit::{ExitError, EXIT_FAIL_ON, EXIT_INPUT, EXIT_INVALID_OUTPUT, EXIT_PROVIDER};
use anyhow::{Context, Result};
use clap::Args;
use plancritic_adapters::config::Config;
use plancritic_adapters::patch::write_patch_file;
use plancritic_adapters::{load_builtin, Profile, Redactor, SourceFile, StepPatterns};
use plancritic_core::{
    render_markdown, FailOn, GroundingRules, PostProcessOptions, SeverityThreshold,
};
use plancritic_engine::llm::{resolve_provider, ProviderKeys};
use plancritic_engine::{
    run_review, GenerationSettings, Provider, RepairPolicy, ReviewError, ReviewRequest,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Written to the working directory when `--debug` is set.
pub const DEBUG_PROMPT_FILE: &str = "plancritic-debug-prompt.txt";

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Plan file to review
    pub plan: PathBuf,

    /// Output format: json or md
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Output file path (default: stdout)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Context file (may be repeated)
    #[arg(long = "context", value_name = "PATH")]
    pub contexts: Vec<PathBuf>,

    /// Built-in profile name
    #[arg(long)]
    pub profile: Option<String>,

    /// Enable strict grounding mode
    #[arg(long)]
    pub strict: bool,

    /// Model ID, optionally prefixed with `anthropic:` or `openai:`
    #[arg(long)]
    pub model: Option<String>,

    /// Max response tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Model temperature
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Random seed (if the provider supports it)
    #[arg(long)]
    pub seed: Option<i64>,

    /// Minimum severity to report: info, warn, or critical
    #[arg(long)]
    pub severity_threshold: Option<String>,

    /// Write suggested patches as a unified diff
    #[arg(long)]
    pub patch_out: Option<PathBuf>,

    /// Exit with code 2 if the verdict meets this level
    #[arg(long)]
    pub fail_on: Option<String>,

    /// Send plan and context text without redacting secrets
    #[arg(long)]
    pub no_redact: bool,

    /// Fail if no model provider is configured
    #[arg(long)]
    pub offline: bool,

    /// Log processing steps to stderr
    #[arg(long)]
    pub verbose: bool,

    /// Debug logging, and save the prompt to plancritic-debug-prompt.txt
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "md" | "markdown" => Ok(Self::Markdown),
            other => Err(format!("unknown format: {}", other)),
        }
    }
}

/// Flags merged over the config file: flag, then file, then default.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub format: OutputFormat,
    pub out: Option<PathBuf>,
    pub contexts: Vec<PathBuf>,
    pub profile: String,
    pub model: Option<String>,
    pub settings: GenerationSettings,
    pub post: PostProcessOptions,
    pub patch_out: Option<PathBuf>,
    pub fail_on: Option<FailOn>,
    pub redact: bool,
    pub offline: bool,
    pub request_timeout: Duration,
    pub debug_prompt: Option<PathBuf>,
}

impl CheckOptions {
    pub fn resolve(args: &CheckArgs, config: &Config) -> Result<Self> {
        let format = OutputFormat::from_str(&args.format).map_err(input_error)?;

        let threshold = args
            .severity_threshold
            .as_deref()
            .unwrap_or(&config.severity_threshold);
        let severity_threshold = SeverityThreshold::from_str(threshold).map_err(input_error)?;

        let fail_on = args
            .fail_on
            .as_deref()
            .map(FailOn::from_str)
            .transpose()
            .map_err(input_error)?;

        let model = args.model.clone().or_else(|| config.model.clone());
        let temperature = args.temperature.unwrap_or(config.temperature);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(input_error(format!(
                "temperature must be between 0 and 2, got {}",
                temperature
            )));
        }

        let strict = args.strict || config.strict;

        Ok(Self {
            format,
            out: args.out.clone(),
            contexts: args.contexts.clone(),
            profile: args.profile.clone().unwrap_or_else(|| config.profile.clone()),
            settings: GenerationSettings {
                model: model.clone(),
                temperature,
                max_tokens: args.max_tokens.unwrap_or(config.max_tokens),
                seed: args.seed,
            },
            model,
            post: PostProcessOptions {
                max_issues: config.max_issues,
                max_questions: config.max_questions,
                strict,
                severity_threshold,
            },
            patch_out: args.patch_out.clone(),
            fail_on,
            redact: config.redact && !args.no_redact,
            offline: args.offline,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            debug_prompt: args.debug.then(|| PathBuf::from(DEBUG_PROMPT_FILE)),
        })
    }
}

/// Plan, contexts and profile, redacted and ready for prompting.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub plan: SourceFile,
    pub contexts: Vec<SourceFile>,
    pub profile: Profile,
    pub step_patterns: StepPatterns,
}

pub fn load_inputs(plan_path: &Path, options: &CheckOptions) -> Result<Inputs> {
    info!(path = %plan_path.display(), "loading plan");
    let mut plan = SourceFile::load(plan_path)
        .map_err(|e| input_error(format!("failed to load plan: {:#}", e)))?;

    let mut contexts = Vec::with_capacity(options.contexts.len());
    for path in &options.contexts {
        debug!(path = %path.display(), "loading context");
        let context = SourceFile::load(path).map_err(|e| {
            input_error(format!("failed to load context {}: {:#}", path.display(), e))
        })?;
        contexts.push(context);
    }

    if options.redact {
        debug!("redacting secrets");
        let redactor = Redactor::new();
        plan.redact(&redactor);
        for context in &mut contexts {
            context.redact(&redactor);
        }
    }

    let profile = load_builtin(&options.profile)
        .map_err(|e| input_error(format!("failed to load profile: {:#}", e)))?;

    Ok(Inputs {
        plan,
        contexts,
        profile,
        step_patterns: StepPatterns::new(),
    })
}

/// Resolve a provider from the environment and run the whole check.
pub async fn run(args: &CheckArgs, config: &Config) -> Result<()> {
    let options = CheckOptions::resolve(args, config)?;
    let inputs = load_inputs(&args.plan, &options)?;

    let (provider, model) = resolve_provider(
        options.model.as_deref(),
        &ProviderKeys::from_env(),
        options.request_timeout,
    )
    .map_err(|e| {
        if options.offline {
            ExitError::new(
                EXIT_PROVIDER,
                format!("no model provider configured (--offline): {:#}", e),
            )
        } else {
            ExitError::new(EXIT_PROVIDER, format!("model provider error: {:#}", e))
        }
    })?;
    info!(provider = provider.name(), "using provider");

    let mut options = options;
    options.settings.model = model;
    check_with_provider(&inputs, &options, provider.as_ref()).await
}

/// Everything after provider resolution. Split out so tests can script the
/// provider.
pub async fn check_with_provider<P: Provider + ?Sized>(
    inputs: &Inputs,
    options: &CheckOptions,
    provider: &P,
) -> Result<()> {
    let mut request = ReviewRequest::new(&inputs.plan, &inputs.step_patterns);
    request.contexts = &inputs.contexts;
    request.profile = Some(&inputs.profile);
    request.settings = options.settings.clone();
    request.options = options.post;
    request.repair = RepairPolicy::default();

    if let Some(path) = &options.debug_prompt {
        if let Err(e) = fs::write(path, request.prompt()) {
            warn!(path = %path.display(), error = %e, "failed to write debug prompt");
        } else {
            info!(path = %path.display(), "wrote debug prompt");
        }
    }

    let outcome = match run_review(provider, &request, &GroundingRules::default()).await {
        Ok(outcome) => outcome,
        Err(err) => return Err(review_failure(err).into()),
    };
    let review = outcome.review;

    let output = match options.format {
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(&review).context("failed to serialize review")?;
            json.push('\n');
            json
        }
        OutputFormat::Markdown => render_markdown(&review),
    };

    match &options.out {
        Some(path) => {
            info!(path = %path.display(), "writing output");
            fs::write(path, &output)
                .with_context(|| format!("failed to write output {}", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .context("failed to write output")?;
            stdout.flush().context("failed to write output")?;
        }
    }

    if let Some(path) = &options.patch_out {
        if write_patch_file(&review.patches, path)? {
            info!(path = %path.display(), "wrote patches");
        } else {
            info!("no patches to write");
        }
    }

    if let Some(fail_on) = options.fail_on {
        if fail_on.is_met_by(&review.summary.verdict) {
            return Err(ExitError::new(
                EXIT_FAIL_ON,
                format!(
                    "verdict {} meets fail threshold {}",
                    review.summary.verdict.as_str(),
                    fail_on
                ),
            )
            .into());
        }
    }

    Ok(())
}

fn review_failure(err: ReviewError) -> ExitError {
    match err {
        ReviewError::Provider { .. } => {
            ExitError::new(EXIT_PROVIDER, format!("LLM call failed: {}", err))
        }
        ReviewError::Parse { .. } => ExitError::new(EXIT_INVALID_OUTPUT, err.to_string()),
        ReviewError::Schema { errors } => {
            let mut message = String::from("LLM output failed schema validation after repair:");
            for e in &errors {
                message.push_str(&format!("\n  {}", e));
            }
            ExitError::new(EXIT_INVALID_OUTPUT, message)
        }
    }
}

fn input_error(message: impl std::fmt::Display) -> anyhow::Error {
    ExitError::new(EXIT_INPUT, message.to_string()).into()
}
