// config.rs - Static source table and per-run scan settings
// Purpose: Describe every fetch source as data (URL template, selection, capture
//          pattern) and hold the tunables a scan runs with

use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ReconError, ReconResult};

// ═══════════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════

/// Browser user agent sent with every source request
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.96 Safari/537.36";

/// Pulls the host out of a result URL (scheme and userinfo optional)
pub const HOST_CAPTURE: &str = r"^(?:https?://)?(?:[^@\n]+@)?([^:/\n]+)";

/// Two labels only: `example.org` is accepted, `ftp.example.org` is not
const DOMAIN_PATTERN: &str = r"^[\w-]+\.[\w-]+$";

// ═══════════════════════════════════════════════════════════════════════════
// SOURCE TABLE
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Single lookup page, fetched once
    ThreatIntel,
    /// `site:` scoped search, fetched in two refinement rounds
    SearchEngine,
}

/// Which nodes to read and where the candidate string lives on each node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// CSS selector for the result nodes
    pub css: &'static str,
    /// Attribute to read instead of the node text
    pub attribute: Option<&'static str>,
}

impl Selection {
    pub const fn text(css: &'static str) -> Self {
        Self { css, attribute: None }
    }

    pub const fn attribute(css: &'static str, attribute: &'static str) -> Self {
        Self {
            css,
            attribute: Some(attribute),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: &'static str,
    pub kind: SourceKind,
    /// `{domain}` is replaced with the target domain
    pub url_template: &'static str,
    pub selection: Selection,
    /// Group 1 is the subdomain; `None` keeps the selected text verbatim
    pub capture: Option<&'static str>,
    /// Nodes whose text mentions a captcha when the source served a challenge page
    pub challenge: Option<&'static str>,
}

pub static SOURCES: &[SourceConfig] = &[
    SourceConfig {
        name: "Virus Total",
        kind: SourceKind::ThreatIntel,
        url_template: "https://virustotal.com/en/domain/{domain}/information/",
        selection: Selection::text("#observed-subdomains > div"),
        capture: None,
        challenge: Some("body > p"),
    },
    SourceConfig {
        name: "Google",
        kind: SourceKind::SearchEngine,
        url_template: "https://www.google.com/search?num=100&q=site:{domain}+-site:www.{domain}",
        selection: Selection::attribute("#rso div h3 > a", "href"),
        capture: Some(HOST_CAPTURE),
        challenge: None,
    },
    SourceConfig {
        name: "Yahoo",
        kind: SourceKind::SearchEngine,
        url_template: "https://search.yahoo.com/search?n=100&q=site:{domain}+-site:www.{domain}",
        selection: Selection::text("#web > ol > li div span"),
        capture: Some(HOST_CAPTURE),
        challenge: None,
    },
    SourceConfig {
        name: "Bing",
        kind: SourceKind::SearchEngine,
        url_template: "https://www.bing.com/search?count=100&q=site:{domain}+-site:www.{domain}",
        selection: Selection::attribute("#b_results > li h2 > a", "href"),
        capture: Some(HOST_CAPTURE),
        challenge: None,
    },
];

/// Resolve `--sources` names against the table ("virustotal" matches "Virus Total")
pub fn select_sources(names: &[String]) -> ReconResult<Vec<SourceConfig>> {
    if names.is_empty() {
        return Ok(SOURCES.to_vec());
    }

    let normalize = |name: &str| -> String {
        name.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    };

    let mut selected = Vec::new();
    for name in names {
        let wanted = normalize(name);
        let source = SOURCES
            .iter()
            .find(|s| normalize(s.name) == wanted)
            .ok_or_else(|| ReconError::UnknownSource(name.clone()))?;
        if !selected.contains(source) {
            selected.push(*source);
        }
    }
    Ok(selected)
}

/// Accept only two-label domains; anything else is rejected before any network use
pub fn validate_domain(input: &str) -> ReconResult<String> {
    let candidate = input.trim();
    let pattern = Regex::new(DOMAIN_PATTERN)?;
    if pattern.is_match(candidate) {
        Ok(candidate.to_string())
    } else {
        Err(ReconError::InvalidDomain(input.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SCAN CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ScanConfig {
    pub user_agent: String,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Per-host DNS timeout
    pub dns_timeout: Duration,
    /// Concurrent DNS lookups
    pub workers: usize,
    /// Abort on the first failing source instead of treating it as empty
    pub strict: bool,
    pub sources: Vec<SourceConfig>,
    /// Where report files land
    pub output_dir: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            dns_timeout: Duration::from_secs(5),
            workers: 10,
            strict: false,
            sources: SOURCES.to_vec(),
            output_dir: PathBuf::from("."),
        }
    }
}
