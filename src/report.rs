// report.rs - Report writers for SubRecon
// Purpose: Render the registry as a console table and persist it as
//          <domain>-subdomains.{txt,csv,json,html}

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ReconResult;
use crate::logger::{LogPayload, RunLog, MILESTONE};
use crate::registry::{Registry, SubdomainRecord};
use crate::scan::{ScanReport, SourceOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Txt,
    Csv,
    Json,
    Html,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" => Ok(OutputFormat::Txt),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// Parse a `-f` list. Unknown names are returned separately; an empty result falls back to txt.
pub fn parse_formats(requested: &[String]) -> (Vec<OutputFormat>, Vec<String>) {
    let mut formats = Vec::new();
    let mut unknown = Vec::new();

    for name in requested {
        match name.parse::<OutputFormat>() {
            Ok(format) if !formats.contains(&format) => formats.push(format),
            Ok(_) => {}
            Err(_) => unknown.push(name.clone()),
        }
    }

    if formats.is_empty() {
        formats.push(OutputFormat::Txt);
    }
    (formats, unknown)
}

pub fn report_path(dir: &Path, domain: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}-subdomains.{}", domain, format.extension()))
}

// ═══════════════════════════════════════════════════════════════════════════
// TABLE ROWS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub index: usize,
    pub subdomain: String,
    pub sources: Vec<String>,
    pub addresses: Vec<String>,
}

impl ReportRow {
    fn new(index: usize, subdomain: &str, record: &SubdomainRecord) -> Self {
        Self {
            index,
            subdomain: subdomain.to_string(),
            sources: record.sources().to_vec(),
            addresses: record.addresses().iter().map(|ip| ip.to_string()).collect(),
        }
    }
}

pub fn rows(registry: &Registry) -> Vec<ReportRow> {
    registry
        .iter()
        .enumerate()
        .map(|(i, (subdomain, record))| ReportRow::new(i + 1, subdomain, record))
        .collect()
}

/// Record the final rows in the run log as one indented mapping
pub fn log_rows(registry: &Registry, log: &RunLog) {
    log.log(LogPayload::mapping(&rows(registry)), MILESTONE);
}

/// Where a table is headed; the console only shows the first two addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableTarget {
    Console,
    File,
}

fn address_cell(addresses: &[String], target: TableTarget) -> String {
    if target == TableTarget::Console && addresses.len() > 2 {
        format!(
            "{}, {} +{} more",
            addresses[0],
            addresses[1],
            addresses.len() - 2
        )
    } else {
        addresses.join(", ")
    }
}

pub fn render_table(registry: &Registry, target: TableTarget) -> String {
    let mut table = format!(
        "\n{:<6}{:<35}{:<30}{:<20}\n",
        "S.No.", "Subdomain", "Source", "IP"
    );
    table.push_str(&"=".repeat(81));
    table.push('\n');

    for row in rows(registry) {
        table.push_str(&format!(
            "{:4}  {:<35}{:<30}{:<20}\n",
            row.index,
            row.subdomain,
            row.sources.join(", "),
            address_cell(&row.addresses, target)
        ));
    }
    table
}

// ═══════════════════════════════════════════════════════════════════════════
// WRITERS
// ═══════════════════════════════════════════════════════════════════════════

pub fn write_txt(dir: &Path, domain: &str, registry: &Registry) -> ReconResult<PathBuf> {
    let path = report_path(dir, domain, OutputFormat::Txt);
    fs::write(&path, render_table(registry, TableTarget::File))?;
    Ok(path)
}

pub fn write_csv(dir: &Path, domain: &str, registry: &Registry) -> ReconResult<PathBuf> {
    let path = report_path(dir, domain, OutputFormat::Csv);
    let mut wtr = csv::Writer::from_path(&path)?;
    wtr.write_record(["index", "subdomain", "sources", "addresses"])?;

    for row in rows(registry) {
        wtr.write_record([
            row.index.to_string().as_str(),
            row.subdomain.as_str(),
            row.sources.join(", ").as_str(),
            row.addresses.join(", ").as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(path)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    target: &'a str,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    duration_seconds: f64,
    total_subdomains: usize,
    total_resolved: usize,
    sources: &'a [SourceOutcome],
    subdomains: Vec<ReportRow>,
}

pub fn write_json(dir: &Path, report: &ScanReport) -> ReconResult<PathBuf> {
    let path = report_path(dir, &report.domain, OutputFormat::Json);
    let json = JsonReport {
        target: &report.domain,
        started_at: report.started_at,
        finished_at: report.finished_at,
        duration_seconds: report.duration_seconds(),
        total_subdomains: report.registry.len(),
        total_resolved: report.registry.resolved_count(),
        sources: &report.sources,
        subdomains: rows(&report.registry),
    };
    fs::write(&path, serde_json::to_string_pretty(&json)?)?;
    Ok(path)
}

pub fn write_html(dir: &Path, report: &ScanReport) -> ReconResult<PathBuf> {
    let path = report_path(dir, &report.domain, OutputFormat::Html);
    fs::write(&path, generate_html_content(report))?;
    Ok(path)
}

/// Write every requested format, returning the files produced
pub fn write_reports(
    dir: &Path,
    report: &ScanReport,
    formats: &[OutputFormat],
) -> ReconResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    formats
        .iter()
        .map(|format| match format {
            OutputFormat::Txt => write_txt(dir, &report.domain, &report.registry),
            OutputFormat::Csv => write_csv(dir, &report.domain, &report.registry),
            OutputFormat::Json => write_json(dir, report),
            OutputFormat::Html => write_html(dir, report),
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// HTML
// ═══════════════════════════════════════════════════════════════════════════

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn generate_sources_cards(sources: &[SourceOutcome]) -> String {
    let mut html = String::new();
    for source in sources {
        let status = match &source.error {
            Some(error) => {
                format!(r#"<span class="failed">skipped: {}</span>"#, escape_html(error))
            }
            None => format!("{} reported, {} new", source.reported, source.added),
        };
        html.push_str(&format!(
            concat!(
                r#"<div class="card"><div class="card-title">{}</div>"#,
                r#"<div class="card-body">{}</div></div>"#
            ),
            escape_html(&source.name),
            status
        ));
    }
    html
}

fn generate_subdomain_rows(registry: &Registry) -> String {
    if registry.is_empty() {
        return concat!(
            r#"<tr><td colspan="4" class="empty-state">"#,
            "No subdomains were discovered during the scan.</td></tr>"
        )
        .to_string();
    }

    let mut html = String::new();
    for row in rows(registry) {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.index,
            escape_html(&row.subdomain),
            escape_html(&row.sources.join(", ")),
            escape_html(&row.addresses.join(", "))
        ));
    }
    html
}

fn generate_html_content(report: &ScanReport) -> String {
    let domain = escape_html(&report.domain);
    let generated = report.finished_at.format("%Y-%m-%d %H:%M:%S UTC");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Subdomains of {domain}</title>
    <style>
        body {{ font-family: sans-serif; margin: 2rem; color: #1f2933; }}
        .stats {{ display: flex; gap: 1rem; margin-bottom: 1.5rem; }}
        .card {{ border: 1px solid #d9e2ec; border-radius: 6px; padding: 0.75rem 1rem; }}
        .card-title {{ font-weight: 600; }}
        .failed {{ color: #c53030; }}
        table {{ border-collapse: collapse; width: 100%; }}
        th, td {{ text-align: left; padding: 0.4rem 0.6rem; border-bottom: 1px solid #e4e7eb; }}
        .empty-state {{ color: #7b8794; text-align: center; }}
    </style>
</head>
<body>
    <h1>Subdomains of {domain}</h1>
    <p>Generated {generated} in {duration:.2}s. {total} subdomains, {resolved} resolved.</p>
    <div class="stats">{sources}</div>
    <table>
        <thead><tr><th>S.No.</th><th>Subdomain</th><th>Source</th><th>IP</th></tr></thead>
        <tbody>{rows}</tbody>
    </table>
</body>
</html>
"#,
        domain = domain,
        generated = generated,
        duration = report.duration_seconds(),
        total = report.registry.len(),
        resolved = report.registry.resolved_count(),
        sources = generate_sources_cards(&report.sources),
        rows = generate_subdomain_rows(&report.registry),
    )
}
