mod analyzer;
mod backport;
mod changelog;
mod cli;
mod client;
mod config;
mod error;
mod identity;
mod normalize;
mod output;
mod pagination;
mod pr_input;
mod query;
mod rate_limit;
mod report;
mod responses;
mod timing;
mod types;
mod window;

use std::io;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::generate;

use analyzer::{AnalysisRequest, Analyzer};
use cli::{AnalyzeArgs, Cli, Commands};
use client::JiraClient;
use config::Config;
use window::DateWindow;

const LOG_ENV: &str = "JIRA_CONTRIB_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");

        // Show error chain if verbose flag was passed
        if std::env::args().any(|arg| arg == "--verbose" || arg == "-v") {
            for cause in e.chain().skip(1) {
                eprintln!("Caused by: {cause}");
            }
        }

        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "jira-contrib", &mut io::stdout());
        }
        Commands::ConfigPath => {
            println!("{}", Config::config_path()?.display());
        }
        Commands::Analyze(args) => analyze(args).await?,
    }

    Ok(())
}

async fn analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let window = DateWindow::new(&args.start_date, &args.end_date)?;
    let config = Config::load().context("failed to load configuration")?;

    let jira_url = config.resolve_jira_url(args.jira_url.as_deref());
    let token = config.token();
    if token.is_none() {
        tracing::warn!("no JIRA_API_TOKEN or JIRA_TOKEN set, requests are unauthenticated");
    }

    let client = JiraClient::new(&jira_url, token, config.rate_limit.clone())
        .with_context(|| format!("invalid Jira URL {jira_url}"))?;
    let analyzer = Analyzer::new(client, &config)?;

    let request = AnalysisRequest {
        email: args.email,
        window,
        pull_requests: pr_input::load_or_empty(args.github_prs_json.as_deref()),
        with_comments: args.with_comments,
    };

    tracing::info!(url = %jira_url, "analyzing contributions");
    let report = analyzer
        .run(&request)
        .await
        .context("contribution analysis failed")?;

    output::emit(&report, args.format, args.output.as_deref()).context("failed to write report")?;
    Ok(())
}

/// Diagnostics go to stderr so stdout only carries the report.
fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))?;

    Ok(())
}
