use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Parser)]
#[command(name = "jira-contrib")]
#[command(about = "Analyze a developer's Jira contributions over a date range", version)]
#[command(after_help = "EXAMPLES:
    jira-contrib analyze dev@example.com 2025-07-01 2025-09-30
    jira-contrib analyze dev@example.com 2025-01-01 2025-03-31 --github-prs-json prs.json
    jira-contrib analyze dev@example.com 2025-01-01 2025-03-31 --format table

ENVIRONMENT:
    JIRA_URL            Jira server URL (default: https://issues.redhat.com)
    JIRA_API_TOKEN      Jira API token for authentication
    JIRA_TOKEN          Alternative name for the Jira API token
    JIRA_CONTRIB_LOG    Log filter directive, e.g. jira_contrib=debug")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Only log warnings and errors
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log request details and print error causes
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze contributions of one developer
    #[command(after_help = "EXAMPLES:
    jira-contrib analyze dev@example.com 2025-07-01 2025-09-30 -o report.json
    gh pr list --author octocat --state merged --json title,body,url,number,mergedAt,author > prs.json
    jira-contrib analyze dev@example.com 2025-07-01 2025-09-30 --github-prs-json prs.json")]
    Analyze(AnalyzeArgs),
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    jira-contrib completions bash > ~/.bash_completion.d/jira-contrib
    jira-contrib completions zsh > ~/.zfunc/_jira-contrib")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Print the path of the configuration file
    ConfigPath,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Developer's email address
    pub email: String,

    /// Start date (YYYY-MM-DD)
    pub start_date: String,

    /// End date (YYYY-MM-DD), inclusive
    pub end_date: String,

    /// JSON file with merged PRs, as written by `gh pr list --json`
    #[arg(long, value_name = "PATH")]
    pub github_prs_json: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, short, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Jira server URL (overrides JIRA_URL and the config file)
    #[arg(long, value_name = "URL")]
    pub jira_url: Option<String>,

    /// Also fetch comments and count the developer's own
    #[arg(long)]
    pub with_comments: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_analyze_with_options() {
        let cli = Cli::try_parse_from([
            "jira-contrib",
            "analyze",
            "dev@example.com",
            "2025-01-01",
            "2025-03-31",
            "--github-prs-json",
            "prs.json",
            "--format",
            "table",
            "--with-comments",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.email, "dev@example.com");
        assert_eq!(args.github_prs_json, Some(PathBuf::from("prs.json")));
        assert_eq!(args.format, OutputFormat::Table);
        assert!(args.with_comments);
        assert!(args.output.is_none());
    }

    #[test]
    fn json_is_the_default_format() {
        let cli = Cli::try_parse_from(["jira-contrib", "analyze", "a@b.c", "2025-01-01", "2025-01-02"]).unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["jira-contrib", "-q", "-v", "config-path"]);
        assert!(result.is_err());
    }

    #[test]
    fn analyze_requires_dates() {
        assert!(Cli::try_parse_from(["jira-contrib", "analyze", "a@b.c"]).is_err());
    }
}
