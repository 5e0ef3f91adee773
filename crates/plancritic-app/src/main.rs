//! plancritic - review implementation plans for contradictions, ambiguities
//! and risks before anyone starts building.

mod check;
mod exit;

use anyhow::{Context, Result};
use check::CheckArgs;
use clap::{Parser, Subcommand};
use exit::{exit_code, EXIT_OK};
use plancritic_adapters::config::Config;
use plancritic_adapters::{list_builtin, load_builtin};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "plancritic",
    about = "Review software implementation plans for contradictions, ambiguities, and risks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a plan and produce a review
    Check(CheckArgs),
    /// List built-in profiles
    Profiles,
    /// Show the config file location and effective settings
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (verbose, debug) = match &cli.command {
        Command::Check(args) => (args.verbose, args.debug),
        _ => (false, false),
    };
    init_logging(verbose, debug);

    let code = match run(cli).await {
        Ok(()) => EXIT_OK,
        Err(err) => {
            eprintln!("plancritic: {:#}", err);
            exit_code(&err)
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Check(args) => {
            let config = Config::load();
            check::run(&args, &config).await
        }
        Command::Profiles => list_profiles(),
        Command::Config { init } => show_config(init),
    }
}

/// Logs go to stderr so stdout carries only the review. `RUST_LOG` wins over
/// the flags.
fn init_logging(verbose: bool, debug: bool) {
    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let default_filter = format!(
        "warn,plancritic={level},plancritic_core={level},plancritic_adapters={level},plancritic_engine={level}"
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn list_profiles() -> Result<()> {
    for name in list_builtin() {
        let profile = load_builtin(name)?;
        println!("{:<18} {}", profile.name, profile.description.trim());
    }
    Ok(())
}

fn show_config(init: bool) -> Result<()> {
    let location = Config::config_location();

    if init {
        match Config::config_path() {
            Some(path) if path.exists() => {
                println!("Config already exists at {}", path.display());
            }
            _ => {
                let path = Config::default().save()?;
                println!("Wrote default config to {}", path.display());
            }
        }
        return Ok(());
    }

    let config = Config::load();
    let json = serde_json::to_string_pretty(&config).context("failed to serialize config")?;
    println!("# {}", location);
    println!("{}", json);
    Ok(())
}
