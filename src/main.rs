//! Instant Domains - check domain availability from the command line
//!
//! Warms up one session, searches every term given on the command line
//! concurrently and prints main and suggested results.

use indicatif::{ProgressBar, ProgressStyle};
use instant_domains::{
    search::COMMON_TLDS, ClientConfig, DomainCandidate, InstantDomainsClient, SearchOutcome,
};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

/// Parsed command line
#[derive(Debug, Default)]
struct CliArgs {
    terms: Vec<String>,
    tlds: Vec<String>,
    include_suggestions: bool,
    available_only: bool,
}

enum Command {
    Run(CliArgs),
    Help,
    Version,
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut cli = CliArgs {
        include_suggestions: true,
        ..Default::default()
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "--no-suggestions" => cli.include_suggestions = false,
            "--available-only" => cli.available_only = true,
            "--tlds" => {
                let value = iter.next().ok_or("--tlds needs a comma-separated list")?;
                cli.tlds = value.split(',').map(|t| t.trim().to_string()).collect();
            }
            other if other.starts_with("--tlds=") => {
                cli.tlds = other["--tlds=".len()..]
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .collect();
            }
            other if other.starts_with('-') => return Err(format!("unknown option '{}'", other)),
            term => cli.terms.push(term.to_string()),
        }
    }

    if cli.terms.is_empty() {
        return Err("at least one search term is required".to_string());
    }
    Ok(Command::Run(cli))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = instant_domains::init() {
        eprintln!("❌ Failed to initialize: {}", e);
        process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(Command::Run(cli)) => cli,
        Ok(Command::Help) => {
            print_help();
            return Ok(());
        }
        Ok(Command::Version) => {
            println!("instant-domains {}", instant_domains::VERSION);
            return Ok(());
        }
        Err(message) => {
            eprintln!("❌ {}", message);
            eprintln!("💡 Use --help for usage information");
            process::exit(2);
        }
    };

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.user_message());
            process::exit(1);
        }
    };

    let all_failed = run(config, &cli).await?;
    if all_failed {
        process::exit(1);
    }
    Ok(())
}

/// Returns true when no term could be searched
async fn run(config: ClientConfig, cli: &CliArgs) -> anyhow::Result<bool> {
    let client = InstantDomainsClient::new(config)?;

    println!("🔍 Instant Domains - availability search");
    println!("═════════════════════════════════════════");

    if let Err(e) = client.warmup().await {
        eprintln!("{}", e.user_message());
        client.close();
        return Ok(true);
    }

    let progress = ProgressBar::new(cli.terms.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let outcomes = client
        .searcher()
        .search_many_with_progress(&cli.terms, &cli.tlds, cli.include_suggestions, |outcome| {
            progress.set_message(outcome.term.clone());
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();

    client.close();

    let mut failed = 0;
    for outcome in &outcomes {
        if !display_outcome(outcome, cli.available_only) {
            failed += 1;
        }
    }

    let metrics = client.metrics_snapshot();
    println!();
    println!("📈 Summary:");
    println!("   🔎 Terms searched: {}", outcomes.len());
    if failed > 0 {
        println!("   ⚠️  Failed: {}", failed);
    }
    println!("   🌐 Upstream requests: {}", metrics.upstream_requests);
    if cli.tlds.is_empty() {
        println!("   🏷️  TLDs: {} common TLDs", COMMON_TLDS.len());
    }

    Ok(failed == outcomes.len())
}

/// Print one term's results; returns false if the search failed
fn display_outcome(outcome: &SearchOutcome, available_only: bool) -> bool {
    println!();
    match &outcome.result {
        Ok(result) => {
            println!("Results for '{}':", result.query);
            display_section("Main TLDs", &result.main_results, available_only);
            display_section("Suggested Domains", &result.suggested_results, available_only);
            true
        }
        Err(e) => {
            println!("⚠️  '{}' failed:", outcome.term);
            println!("{}", e.user_message());
            false
        }
    }
}

fn display_section(title: &str, candidates: &[DomainCandidate], available_only: bool) {
    println!();
    println!("--- {} ---", title);
    let mut shown = 0;
    for candidate in candidates {
        if available_only && !candidate.is_available() {
            continue;
        }
        let status = if candidate.is_available() { "✅ Available" } else { "❌ Taken" };
        println!("{}: {}", candidate.domain(), status);
        shown += 1;
    }
    if shown == 0 {
        println!("(none)");
    }
}

/// Print help information
fn print_help() {
    println!("🔍 Instant Domains - availability search");
    println!("═════════════════════════════════════════");
    println!();
    println!("USAGE:");
    println!("    instant-domains [OPTIONS] <TERM>...");
    println!();
    println!("OPTIONS:");
    println!("    --tlds <LIST>       Comma-separated TLDs to check (default: common TLDs)");
    println!("    --no-suggestions    Skip suggested names");
    println!("    --available-only    Only print available domains");
    println!("    -h, --help          Print help");
    println!("    -V, --version       Print version");
    println!();
    println!("EXAMPLES:");
    println!("    instant-domains dealerflow");
    println!("    instant-domains --tlds com,io,ai cargoflow shipsmart");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    INSTANT_DOMAINS_CONCURRENCY          Searches in flight (default: 8)");
    println!("    INSTANT_DOMAINS_TIMEOUT_SECS         Per-request timeout (default: 30)");
    println!("    INSTANT_DOMAINS_SEARCH_TIMEOUT_SECS  Per-search deadline (default: none)");
    println!("    INSTANT_DOMAINS_CITY / _COUNTRY      Locality hint (default: Houston, US)");
    println!("    RUST_LOG                             Log filter (default: warn)");
}
