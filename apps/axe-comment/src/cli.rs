//! CLI argument parsing via `clap`.

use crate::resolve::BaselineStrategy;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "axe-comment",
    version,
    about = "Axe accessibility reports for theme preview PRs",
    long_about = "axe-comment — resolve a theme preview URL from a PR body, scan it and its live counterpart with axe, and render the results as a Markdown PR comment.\n\nConfiguration precedence: CLI > environment > axe-comment.toml > defaults.",
    after_help = "Examples:\n  PR_BODY=\"$BODY\" axe-comment scan\n  axe-comment scan --body-file pr.md --strategy origin-path --live-origin https://shop.test\n  axe-comment comment --dir reports",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Args, Debug, Clone, Default)]
/// Options shared by every stage.
pub struct CommonOpts {
    #[arg(long, help = "Directory holding snapshot, side and comment files (default: current dir)")]
    pub dir: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Enable debug logging (also DEBUG=true)")]
    pub debug: bool,
}

#[derive(Args, Debug, Clone, Default)]
/// Where the PR body comes from and how URLs are derived from it.
pub struct ResolveOpts {
    #[arg(long, env = "PR_BODY", hide_env_values = true, help = "Pull request body text")]
    pub body: Option<String>,
    #[arg(long, help = "Read the pull request body from a file (wins over --body)")]
    pub body_file: Option<String>,
    #[arg(long, value_enum, help = "Live URL derivation: strip-param|origin-path")]
    pub strategy: Option<BaselineStrategy>,
    #[arg(long, help = "Live store origin, used by --strategy origin-path")]
    pub live_origin: Option<String>,
}

#[derive(Subcommand)]
/// Supported subcommands for the two pipeline stages.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current axe-comment version.")]
    Version,
    /// Resolve URLs only
    #[command(
        about = "Resolve preview and live URLs",
        long_about = "Extract the preview URL from the PR body and derive the live URL without scanning or writing files.",
        after_help = "Examples:\n  axe-comment resolve --body 'https://shop.test/?preview_theme_id=1'\n  axe-comment resolve --body-file pr.md --output json"
    )]
    Resolve {
        #[command(flatten)]
        common: CommonOpts,
        #[command(flatten)]
        resolve: ResolveOpts,
    },
    /// Run axe against the resolved URLs
    #[command(
        about = "Scan preview and live URLs",
        long_about = "Resolve URLs, record them in attempted-urls.json, check the live URL for password protection, and run axe once per URL. Failed scans leave an error marker snapshot.",
        after_help = "Examples:\n  axe-comment scan\n  axe-comment scan --chromedriver-path /opt/chromedriver --output json"
    )]
    Scan {
        #[command(flatten)]
        common: CommonOpts,
        #[command(flatten)]
        resolve: ResolveOpts,
        #[arg(long, help = "Scanner program (default: axe)")]
        axe: Option<String>,
        #[arg(long, help = "ChromeDriver binary passed to axe")]
        chromedriver_path: Option<String>,
        #[arg(
            long,
            env = "BROWSER_DRIVER_OUTPUT",
            hide_env_values = true,
            help = "browser-driver-manager output containing CHROMEDRIVER_TEST_PATH"
        )]
        browser_driver_output: Option<String>,
    },
    /// Render the Markdown comment
    #[command(
        about = "Render axe-comment.md",
        long_about = "Load axe-report-preview.json and axe-report-default.json, diff them, and write axe-comment.md.",
        after_help = "Examples:\n  axe-comment comment\n  axe-comment comment --dir reports"
    )]
    Comment {
        #[command(flatten)]
        common: CommonOpts,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_flags() {
        let cli = Cli::try_parse_from([
            "axe-comment",
            "scan",
            "--dir",
            "out",
            "--body",
            "https://s.test/?preview_theme_id=1",
            "--strategy",
            "origin-path",
            "--live-origin",
            "https://live.test",
            "--chromedriver-path",
            "/cd",
        ])
        .unwrap();
        match cli.cmd {
            Commands::Scan {
                common,
                resolve,
                chromedriver_path,
                ..
            } => {
                assert_eq!(common.dir.as_deref(), Some("out"));
                assert_eq!(resolve.strategy, Some(BaselineStrategy::OriginPath));
                assert_eq!(resolve.live_origin.as_deref(), Some("https://live.test"));
                assert_eq!(chromedriver_path.as_deref(), Some("/cd"));
            }
            _ => panic!("expected scan"),
        }
    }
}
