// main.rs - SubRecon v0.1.0 - Passive Subdomain Reconnaissance
// Purpose: Enumerate subdomains of a domain from VirusTotal and search engine
//          results, resolve them, and report where each one was seen

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use subrecon::config::{select_sources, validate_domain, ScanConfig, USER_AGENT};
use subrecon::fetcher::HttpFetcher;
use subrecon::logger::{RunLog, LOG_FILE};
use subrecon::report::{
    log_rows, parse_formats, render_table, write_reports, OutputFormat, TableTarget,
};
use subrecon::resolver::DnsResolver;
use subrecon::scan::{run_scan, ScanReport};

/// SubRecon - Passive subdomain enumeration
#[derive(Parser, Debug)]
#[command(
    name = "subrecon",
    version = "0.1.0",
    about = "Discover subdomains from VirusTotal and search engine results",
    after_help = r#"
EXAMPLES:

  Basic scan:
    subrecon -d example.org

  Write every report format and a detailed log:
    subrecon -d example.org -f txt,csv,json,html -l 2

  Only ask Google and Bing, abort if either fails:
    subrecon -d example.org --sources google,bing --strict
"#
)]
struct Args {
    // ═══════════════════════════════════════════════════════════════════════════
    // TARGET OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Registrable domain such as 'example.org' (not 'ftp.example.org')
    #[arg(short, long, value_name = "DOMAIN", help_heading = "Target Options")]
    domain: String,

    /// Sources to query (default: all)
    #[arg(long, value_delimiter = ',', value_name = "NAMES", help_heading = "Target Options",
          help = "Comma separated sources: virustotal, google, yahoo, bing (default: all)")]
    sources: Vec<String>,

    // ═══════════════════════════════════════════════════════════════════════════
    // OUTPUT OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Report formats
    #[arg(short, long, value_delimiter = ',', default_value = "txt", value_name = "FORMATS",
          help_heading = "Output",
          help = "Output file format(s), any of txt|csv|json|html. Eg. '-f json,html,csv'")]
    format: Vec<String>,

    /// Directory for reports and run.log
    #[arg(short, long, default_value = ".", value_name = "DIR", help_heading = "Output")]
    output_dir: PathBuf,

    /// Debug log verbosity
    #[arg(short = 'l', long, default_value_t = 0, value_name = "LEVEL", help_heading = "Output",
          value_parser = clap::value_parser!(u8).range(0..=3),
          help = "Write run.log: 1 = milestones, 2 = per-link detail, 3 = raw pages (0 = off)")]
    log_level: u8,

    // ═══════════════════════════════════════════════════════════════════════════
    // NETWORK OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// User agent sent to every source
    #[arg(long, default_value = USER_AGENT, value_name = "UA", help_heading = "Network")]
    user_agent: String,

    /// HTTP timeout per request in seconds
    #[arg(long, default_value = "30", value_name = "SECONDS", help_heading = "Network")]
    timeout: u64,

    /// Concurrent DNS lookups
    #[arg(short, long, default_value = "10", value_name = "NUM", help_heading = "Network")]
    workers: usize,

    /// Abort when any source fails instead of skipping it
    #[arg(long, help_heading = "Network")]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Reject bad input before touching the network
    let domain = match validate_domain(&args.domain) {
        Ok(domain) => domain,
        Err(e) => {
            eprintln!("{}", format!("[ERROR] {}", e).red().bold());
            eprintln!("{}", "Usage:   subrecon -d <domain-name> [-f <format(s)>] [-l 1]".yellow());
            eprintln!("{}", "Example: subrecon -d example.org".yellow());
            eprintln!();
            Args::command().print_help().ok();
            std::process::exit(1);
        }
    };

    print_banner();

    let config = ScanConfig {
        user_agent: args.user_agent.clone(),
        request_timeout: Duration::from_secs(args.timeout),
        workers: args.workers,
        strict: args.strict,
        sources: select_sources(&args.sources).context("Invalid --sources value")?,
        output_dir: args.output_dir.clone(),
        ..ScanConfig::default()
    };

    std::fs::create_dir_all(&config.output_dir).context(format!(
        "Failed to create output directory: {}",
        config.output_dir.display()
    ))?;

    let log_path = config.output_dir.join(LOG_FILE);
    let log = RunLog::open(&log_path, args.log_level)
        .context(format!("Failed to open log file: {}", log_path.display()))?;
    if let Some(path) = log.path() {
        println!(
            "{}",
            format!("[*] Logging to file {} (level {})", path.display(), log.verbosity()).cyan()
        );
    }

    let fetcher = HttpFetcher::new(&config).context("Failed to initialize HTTP client")?;
    let resolver = DnsResolver::new(config.dns_timeout);
    let progress = resolution_progress_bar();

    let report = run_scan(&domain, &config, &fetcher, &resolver, &log, &progress)
        .await
        .context(format!("Scan of {} failed", domain))?;

    // Console table first, then the requested files
    log_rows(&report.registry, &log);
    println!("{}", render_table(&report.registry, TableTarget::Console));

    let (formats, notices) = output_plan(&args.format);
    for notice in &notices {
        if notice.starts_with("[!]") {
            println!("{}", notice.yellow());
        } else {
            println!("{}", notice.cyan());
        }
    }

    let written = write_reports(&config.output_dir, &report, &formats)
        .context("Failed to write reports")?;
    for path in &written {
        println!("{}", format!("[+] Saved {}", path.display()).green());
    }

    print_scan_summary(&report);
    Ok(())
}

/// Formats to write plus the console notices, in the order they should appear
fn output_plan(requested: &[String]) -> (Vec<OutputFormat>, Vec<String>) {
    let mut notices = vec![format!("[*] Outputting to [{}]", requested.join(", "))];
    let (formats, unknown) = parse_formats(requested);
    for name in &unknown {
        notices.push(format!("[!] Ignoring unknown format '{}'", name));
    }
    if unknown.len() == requested.len() {
        notices.push("[!] No known format (-f) specified, saving in txt format...".to_string());
    }
    (formats, notices)
}

fn resolution_progress_bar() -> ProgressBar {
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.cyan} Resolving [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    progress
}

/// Print application banner
fn print_banner() {
    println!("{}", r#"
 __       _          ___                      _           __
/ _\_   _| |__      /   \___  _ __ ___   __ _(_)_ __     /__\ ___  ___ ___  _ __
\ \| | | | '_ \    / /\ / _ \| '_ ` _ \ / _` | | '_ \   / \/// _ \/ __/ _ \| '_ \
_\ \ |_| | |_) |  / /_// (_) | | | | | | (_| | | | | | / _  \  __/ (_| (_) | | | |
\__/\__,_|_.__/  /___,' \___/|_| |_| |_|\__,_|_|_| |_| \/ \_/\___|\___\___/|_| |_|
"#.cyan().bold());
    println!("{}", "  SubRecon v0.1.0 - Passive Subdomain Reconnaissance".white().bold());
    println!("{}", "═══════════════════════════════════════════════════════════════\n".cyan().bold());
}

/// Print final scan summary
fn print_scan_summary(report: &ScanReport) {
    println!("\n{}", "═══════════════════════════════════════════════════════════════".green().bold());
    println!("{}", format!("  SCAN COMPLETED: {}", report.domain).green().bold());
    println!("{}", "═══════════════════════════════════════════════════════════════".green().bold());
    println!("{}", format!("  Subdomains discovered: {}", report.registry.len()).cyan());
    println!("{}", format!("  Resolved: {}", report.resolution.resolved).cyan());
    println!("{}", format!("  Unresolved: {}", report.resolution.unresolved).cyan());

    let failed: Vec<&str> = report
        .sources
        .iter()
        .filter(|s| s.error.is_some())
        .map(|s| s.name.as_str())
        .collect();
    if !failed.is_empty() {
        println!("{}", format!("  Skipped sources: {}", failed.join(", ")).yellow());
    }

    println!("{}", format!("  Scan duration: {:.2}s", report.duration_seconds()).cyan());
    println!("{}", "═══════════════════════════════════════════════════════════════".green().bold());
}
