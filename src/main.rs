//! logsentry - An access-log analyzer that only reads virus-scanned files.
//!
//! Usage:
//!   logsentry                  Full report (unique IPs, top paths, top IPs)
//!   logsentry unique-ips       Count distinct client IPs
//!   logsentry top-paths        Most visited paths
//!   logsentry top-ips          Most active client IPs
//!   logsentry --help           Show help
//!
//! Set `VIRUSTOTAL_API_KEY` to scan through VirusTotal; without it a
//! simulated scanner is used.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use itertools::Itertools;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use logsentry_analyze::{
    LifecycleSignal, LogSource, RankedGroup, TopActiveIpsHandler, TopActiveIpsQuery,
    TopVisitedPathsHandler, TopVisitedPathsQuery, UniqueIpsHandler,
};
use logsentry_core::AnalysisConfig;
use logsentry_scan::{FileIntegrityGate, FsSource, ScanServiceFactory};

#[derive(Parser)]
#[command(
    name = "logsentry",
    version,
    about = "Access-log analyzer that refuses to read files a virus scan has not cleared",
    long_about = "logsentry reports unique client IPs, the most visited paths and the most \
                  active IPs of a Common/Combined access log.\n\n\
                  The file is virus-scanned before it is parsed. Set VIRUSTOTAL_API_KEY to \
                  use VirusTotal; otherwise a simulated scanner is used."
)]
struct Cli {
    /// Log file to analyze
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Count distinct client IP addresses
    UniqueIps,

    /// Show the most visited paths
    TopPaths {
        /// Number of rank tiers to show
        #[arg(short = 'n', long, default_value = "3")]
        top: usize,
    },

    /// Show the most active client IP addresses
    TopIps {
        /// Number of rank tiers to show
        #[arg(short = 'n', long, default_value = "3")]
        top: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Terminates the process when the log file cannot be used.
struct ProcessLifecycle;

impl LifecycleSignal for ProcessLifecycle {
    fn exit(&self) {
        eprintln!("Exiting program...");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut builder = AnalysisConfig::builder();
    if let Some(file) = cli.file {
        builder.log_path(file);
    }
    if let Some(Command::TopPaths { top } | Command::TopIps { top }) = &cli.command {
        builder.top_n(*top);
    }
    let config = builder.build().context("Invalid configuration")?;
    debug!(log_path = %config.log_path.display(), top_n = config.top_n, "configuration loaded");

    let source = open_source(&config, cli.format)?;

    match cli.command {
        Some(Command::UniqueIps) => run_unique_ips(&source, cli.format).await?,
        Some(Command::TopPaths { .. }) => run_top_paths(&source, config.top_n, cli.format).await?,
        Some(Command::TopIps { .. }) => run_top_ips(&source, config.top_n, cli.format).await?,
        None => {
            run_unique_ips(&source, cli.format).await?;
            run_top_paths(&source, config.top_n, cli.format).await?;
            run_top_ips(&source, config.top_n, cli.format).await?;
        }
    }

    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` applies unless `-v` was given.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Wire the scanner, integrity gate and parser around the configured file.
fn open_source(config: &AnalysisConfig, format: OutputFormat) -> Result<Arc<LogSource>> {
    let path = config.resolved_log_path();

    let scanner = ScanServiceFactory::from_env()
        .create()
        .context("Failed to create virus scan service")?;

    if matches!(format, OutputFormat::Text) {
        match std::fs::metadata(&path) {
            Ok(meta) => eprintln!(
                "Analyzing {} ({}) with {} scanner...",
                path.display(),
                format_size(meta.len()),
                scanner.name()
            ),
            Err(_) => eprintln!("Analyzing {}...", path.display()),
        }
    }

    let gate = Arc::new(FileIntegrityGate::new(Arc::new(FsSource), scanner));
    Ok(Arc::new(LogSource::new(
        gate,
        Arc::new(ProcessLifecycle),
        path,
    )))
}

/// Print the number of distinct client IPs.
async fn run_unique_ips(source: &Arc<LogSource>, format: OutputFormat) -> Result<()> {
    let ips = UniqueIpsHandler::new(source.clone())
        .handle()
        .await
        .context("Unique IP query failed")?;

    match format {
        OutputFormat::Text => {
            println!("There are {} unique IP addresses in the log file", ips.len());
        }
        OutputFormat::Json => {
            let report = serde_json::json!({ "count": ips.len(), "ips": ips });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Print the most visited paths.
async fn run_top_paths(source: &Arc<LogSource>, count: usize, format: OutputFormat) -> Result<()> {
    let groups = TopVisitedPathsHandler::new(source.clone())
        .handle(TopVisitedPathsQuery { count })
        .await
        .context("Top visited paths query failed")?;

    print_groups("Most visited URLs:", &groups, format)
}

/// Print the most active client IPs.
async fn run_top_ips(source: &Arc<LogSource>, count: usize, format: OutputFormat) -> Result<()> {
    let groups = TopActiveIpsHandler::new(source.clone())
        .handle(TopActiveIpsQuery { count })
        .await
        .context("Top active IPs query failed")?;

    print_groups("Most active IP addresses:", &groups, format)
}

fn print_groups(title: &str, groups: &[RankedGroup], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{title}");
            for group in groups {
                println!("  {}", format_group(group));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(groups)?);
        }
    }

    Ok(())
}

/// Render a group as `1st (3 hits): a, b`.
fn format_group(group: &RankedGroup) -> String {
    format!(
        "{} ({} hits): {}",
        ordinal(group.rank),
        group.hit_count,
        group
            .items
            .iter()
            .map(|item| item.as_deref().unwrap_or("-"))
            .join(", ")
    )
}

/// English ordinal for a rank (1st, 2nd, 3rd, 4th, 11th, 21st...).
fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals() {
        let rendered: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 101, 111, 112]
            .into_iter()
            .map(ordinal)
            .collect();
        assert_eq!(
            rendered,
            vec![
                "1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "23rd",
                "101st", "111th", "112th",
            ]
        );
    }

    #[test]
    fn test_format_group() {
        let group = RankedGroup::new(
            2,
            5,
            vec![None, Some("/a".to_string()), Some("/b".to_string())],
        );
        assert_eq!(format_group(&group), "2nd (5 hits): -, /a, /b");
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["logsentry", "top-ips", "-n", "5", "--file", "a.log"])
            .unwrap();
        assert!(matches!(cli.command, Some(Command::TopIps { top: 5 })));
        assert_eq!(cli.file, Some(PathBuf::from("a.log")));

        let cli = Cli::try_parse_from(["logsentry", "--format", "json", "-vv"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
    }
}
