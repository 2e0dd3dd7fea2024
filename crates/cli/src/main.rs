//! apiprobe CLI - Main Entry Point
//!
//! Runs the endpoint tests described in a fixture file against a backend API.
//!
//! ```text
//! apiprobe                              # run every group
//! apiprobe --endpoint authentication    # run one group
//! apiprobe --list                       # show available groups
//! ```

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use apiprobe_runner::{ApiRunner, Flow, FlowOutcome, RunnerConfig};

/// Automated endpoint testing for a backend API
#[derive(Parser, Debug)]
#[command(name = "apiprobe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the API server [default: http://localhost:8000]
    #[arg(long, env = "APIPROBE_BASE_URL")]
    base_url: Option<String>,

    /// Test a single endpoint group (e.g. authentication, onboarding)
    #[arg(long)]
    endpoint: Option<String>,

    /// Show request and response bodies
    #[arg(short, long)]
    verbose: bool,

    /// List available endpoint groups
    #[arg(long)]
    list: bool,

    /// Fixture file (.json, .yaml or .yml) [default: sample-requests.json]
    #[arg(short, long, env = "APIPROBE_FIXTURE")]
    fixture: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Exit with status 1 when any test fails or the server is down
    #[arg(long)]
    strict: bool,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,
}

/// Defaults, then the config file, then flags and environment
fn resolve_config(cli: &Cli) -> anyhow::Result<RunnerConfig> {
    let mut config = match &cli.config {
        Some(path) => RunnerConfig::from_file(path)?,
        None => RunnerConfig::default(),
    };

    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(fixture) = &cli.fixture {
        config.fixture = fixture.clone();
    }
    if cli.verbose {
        config.verbose = true;
    }

    config.validate()?;
    Ok(config)
}

fn exit_code(outcome: &FlowOutcome, failed: usize, strict: bool) -> i32 {
    if !strict {
        return 0;
    }
    match outcome {
        FlowOutcome::Listed => 0,
        FlowOutcome::Completed if failed == 0 => 0,
        FlowOutcome::Completed | FlowOutcome::HealthGateClosed(_) => 1,
    }
}

fn apply_color_choice(no_color: bool) {
    if no_color {
        colored::control::set_override(false);
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = resolve_config(&cli)?;
    debug!(?config, "resolved configuration");

    let mut runner = ApiRunner::from_config(config)?;

    let flow = Flow::select(cli.list, cli.endpoint);
    let outcome = runner.execute(flow).await?;

    Ok(exit_code(&outcome, runner.summary().failed(), cli.strict))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    apply_color_choice(cli.no_color);

    // Logs go to stderr so the report on stdout stays readable
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            std::process::exit(2);
        }
    }
}
