// scan.rs - Scan orchestration
// Purpose: Run every configured source, merge their findings into one registry
//          and resolve the result

use chrono::{DateTime, Utc};
use colored::*;
use futures::future::join_all;
use indicatif::ProgressBar;
use serde::Serialize;

use crate::config::{validate_domain, ScanConfig};
use crate::error::{ReconError, ReconResult};
use crate::fetcher::PageFetcher;
use crate::logger::{LogPayload, RunLog, MILESTONE};
use crate::registry::{MergeSummary, Registry};
use crate::resolver::{resolve_all, HostResolver, ResolveSummary};
use crate::sources::SourceAdapter;

/// How one source fared during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    pub name: String,
    pub reported: usize,
    pub added: usize,
    /// Set when the source failed and was treated as empty
    pub error: Option<String>,
}

impl SourceOutcome {
    fn merged(summary: MergeSummary) -> Self {
        Self {
            name: summary.source,
            reported: summary.reported,
            added: summary.added,
            error: None,
        }
    }

    fn failed(name: &str, error: &ReconError) -> Self {
        Self {
            name: name.to_string(),
            reported: 0,
            added: 0,
            error: Some(error.to_string()),
        }
    }
}

pub struct ScanReport {
    pub domain: String,
    pub registry: Registry,
    pub sources: Vec<SourceOutcome>,
    pub resolution: ResolveSummary,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Query every configured source for `domain` and merge what they report.
///
/// Sources are fetched concurrently; their results are merged one at a time in
/// configuration order. A source failing on the network side is skipped unless
/// `config.strict` is set. Configuration errors always abort.
pub async fn enumerate<F>(
    domain: &str,
    config: &ScanConfig,
    fetcher: &F,
    log: &RunLog,
) -> ReconResult<(Registry, Vec<SourceOutcome>)>
where
    F: PageFetcher + ?Sized,
{
    let domain = validate_domain(domain)?;

    let adapters = config
        .sources
        .iter()
        .map(|source| SourceAdapter::new(*source))
        .collect::<ReconResult<Vec<_>>>()?;

    let results = join_all(
        adapters
            .iter()
            .map(|adapter| adapter.discover(fetcher, &domain, log)),
    )
    .await;

    let mut registry = Registry::new();
    let mut outcomes = Vec::with_capacity(adapters.len());

    for (adapter, result) in adapters.iter().zip(results) {
        match result {
            Ok(subdomains) => {
                log.log(LogPayload::mapping(&subdomains), MILESTONE);
                let summary = registry.merge(&subdomains, adapter.name());
                log.echo(
                    format!("\t• {:<15}{:4}", adapter.name(), summary.reported),
                    MILESTONE,
                );
                outcomes.push(SourceOutcome::merged(summary));
            }
            Err(e) if !e.is_fatal() && !config.strict => {
                let warning = format!("[!] {} skipped: {}", adapter.name(), e);
                println!("{}", warning.yellow());
                log.log(warning, MILESTONE);
                outcomes.push(SourceOutcome::failed(adapter.name(), &e));
            }
            Err(e) => return Err(e),
        }
    }

    Ok((registry, outcomes))
}

/// Full run: enumerate, then resolve every discovered subdomain
pub async fn run_scan<F, R>(
    domain: &str,
    config: &ScanConfig,
    fetcher: &F,
    resolver: &R,
    log: &RunLog,
    progress: &ProgressBar,
) -> ReconResult<ScanReport>
where
    F: PageFetcher + ?Sized,
    R: HostResolver + ?Sized,
{
    let started_at = Utc::now();
    let domain = validate_domain(domain)?;

    log.echo(format!("Searching subdomains for domain: {} ... ", domain), MILESTONE);
    log.echo("Subdomains discovered via: ", MILESTONE);

    let (mut registry, sources) = enumerate(&domain, config, fetcher, log).await?;
    let resolution = resolve_all(&mut registry, resolver, config.workers, log, progress).await;

    Ok(ScanReport {
        domain,
        registry,
        sources,
        resolution,
        started_at,
        finished_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{select_sources, SOURCES};
    use crate::testing::{google_page, ScriptedFetcher, StaticResolver};

    const VT_URL: &str = "https://virustotal.com/en/domain/example.org/information/";
    const GOOGLE_URL: &str =
        "https://www.google.com/search?num=100&q=site:example.org+-site:www.example.org";

    fn config_for(names: &[&str]) -> ScanConfig {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        ScanConfig {
            sources: select_sources(&names).unwrap(),
            ..ScanConfig::default()
        }
    }

    fn sources_of(registry: &Registry, subdomain: &str) -> Vec<String> {
        registry.get(subdomain).unwrap().sources().to_vec()
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let refined = format!("{}+-site:www.example.org+-site:mail.example.org", GOOGLE_URL);
        let fetcher = ScriptedFetcher::new()
            .page(
                VT_URL,
                r#"<div id="observed-subdomains"><div>ftp.example.org</div></div>"#,
            )
            .page(
                GOOGLE_URL,
                &google_page(&[("www.example.org", 10), ("mail.example.org", 2)]),
            )
            .page(
                &refined,
                &google_page(&[("mail.example.org", 3), ("shop.example.org", 1)]),
            );
        let resolver = StaticResolver::new().host("www.example.org", &["93.184.216.34"]);
        let config = config_for(&["Virus Total", "Google"]);

        let report = run_scan(
            "example.org",
            &config,
            &fetcher,
            &resolver,
            &RunLog::disabled(),
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();

        let registry = &report.registry;
        assert_eq!(registry.len(), 4);
        assert_eq!(sources_of(registry, "ftp.example.org"), vec!["Virus Total"]);
        assert_eq!(sources_of(registry, "www.example.org"), vec!["Google"]);
        assert_eq!(sources_of(registry, "mail.example.org"), vec!["Google"]);
        assert_eq!(sources_of(registry, "shop.example.org"), vec!["Google"]);

        assert_eq!(report.resolution, ResolveSummary { resolved: 1, unresolved: 3 });
        assert!(registry.get("shop.example.org").unwrap().addresses().is_empty());
        assert_eq!(report.sources.len(), 2);
        assert!(report.sources.iter().all(|s| s.error.is_none()));
    }

    #[tokio::test]
    async fn test_invalid_domain_makes_no_requests() {
        let fetcher = ScriptedFetcher::new();
        let result = run_scan(
            "ftp.example.org",
            &ScanConfig::default(),
            &fetcher,
            &StaticResolver::new(),
            &RunLog::disabled(),
            &ProgressBar::hidden(),
        )
        .await;

        assert!(matches!(result, Err(ReconError::InvalidDomain(_))));
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_source_degrades_to_empty() {
        let fetcher = ScriptedFetcher::new()
            .page(
                VT_URL,
                r#"<div id="observed-subdomains"><div>ftp.example.org</div></div>"#,
            )
            .status(GOOGLE_URL, 503);
        let config = config_for(&["Virus Total", "Google"]);

        let (registry, outcomes) = enumerate("example.org", &config, &fetcher, &RunLog::disabled())
            .await
            .unwrap();

        assert_eq!(registry.subdomains(), vec!["ftp.example.org"]);
        assert!(outcomes[0].error.is_none());
        assert!(outcomes[1].error.as_deref().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_strict_mode_aborts_on_failed_source() {
        let fetcher = ScriptedFetcher::new().status(GOOGLE_URL, 503);
        let config = ScanConfig {
            strict: true,
            ..config_for(&["Google"])
        };

        let result = enumerate("example.org", &config, &fetcher, &RunLog::disabled()).await;
        assert!(matches!(result, Err(ReconError::HttpStatus { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_capture_mismatch_aborts_even_when_lenient() {
        let fetcher = ScriptedFetcher::new().page(
            GOOGLE_URL,
            r#"<div id="rso"><div><h3><a href="/url?q=relative">r</a></h3></div></div>"#,
        );
        let config = config_for(&["Google"]);

        let result = enumerate("example.org", &config, &fetcher, &RunLog::disabled()).await;
        assert!(matches!(result, Err(ReconError::CaptureMismatch { .. })));
    }

    #[tokio::test]
    async fn test_all_sources_queried() {
        let fetcher = ScriptedFetcher::new();
        let (registry, outcomes) =
            enumerate("example.org", &ScanConfig::default(), &fetcher, &RunLog::disabled())
                .await
                .unwrap();

        assert!(registry.is_empty());
        assert_eq!(outcomes.len(), SOURCES.len());
        assert_eq!(fetcher.requests().len(), SOURCES.len());
    }
}
