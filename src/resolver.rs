// resolver.rs - Address resolution for discovered subdomains
// Purpose: Look up every registry entry and attach whatever addresses come back;
//          hosts that fail to resolve keep an empty address set

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::time::Duration;
use tokio::time::timeout;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::config::*;

use crate::error::{ReconError, ReconResult};
use crate::logger::{LogPayload, RunLog, DETAIL, MILESTONE};
use crate::registry::Registry;

#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn lookup(&self, host: &str) -> ReconResult<Vec<IpAddr>>;
}

/// Resolver backed by trust-dns with a per-lookup timeout
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl DnsResolver {
    pub fn new(query_timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = query_timeout;
        opts.attempts = 2;

        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
            timeout: query_timeout,
        }
    }
}

#[async_trait]
impl HostResolver for DnsResolver {
    async fn lookup(&self, host: &str) -> ReconResult<Vec<IpAddr>> {
        // Resolver-level retries can exceed one query timeout; bound the whole lookup
        match timeout(self.timeout * 2, self.resolver.lookup_ip(host)).await {
            Ok(Ok(lookup)) => Ok(lookup.iter().collect()),
            Ok(Err(e)) => Err(ReconError::Lookup {
                host: host.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(ReconError::LookupTimeout {
                host: host.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub resolved: usize,
    pub unresolved: usize,
}

/// Resolve every subdomain in `registry`, `workers` lookups at a time.
///
/// Lookups run concurrently but only this function writes to the registry.
pub async fn resolve_all<R>(
    registry: &mut Registry,
    resolver: &R,
    workers: usize,
    log: &RunLog,
    progress: &ProgressBar,
) -> ResolveSummary
where
    R: HostResolver + ?Sized,
{
    let hosts = registry.subdomains();
    progress.set_length(hosts.len() as u64);

    let results: Vec<(String, ReconResult<Vec<IpAddr>>)> = stream::iter(hosts)
        .map(|host| async move {
            let result = resolver.lookup(&host).await;
            progress.inc(1);
            (host, result)
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await;

    let mut summary = ResolveSummary::default();
    for (host, result) in results {
        match result {
            Ok(addresses) if !addresses.is_empty() => {
                if log.enabled(DETAIL) {
                    let entry = BTreeMap::from([(host.as_str(), &addresses)]);
                    log.log(LogPayload::mapping(&entry), DETAIL);
                }
                registry.attach_addresses(&host, addresses);
                summary.resolved += 1;
            }
            Ok(_) => {
                log.log(format!("{} resolved to no addresses", host), DETAIL);
                summary.unresolved += 1;
            }
            Err(e) => {
                log.log(format!("Could not resolve {}: {}", host, e), DETAIL);
                summary.unresolved += 1;
            }
        }
    }
    progress.finish_and_clear();

    log.log(
        format!(
            "Resolved {} of {} subdomains",
            summary.resolved,
            summary.resolved + summary.unresolved
        ),
        MILESTONE,
    );
    summary
}
