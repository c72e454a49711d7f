// registry.rs - Subdomain registry
// Purpose: Single owner of every discovered subdomain, the sources that reported
//          it and the addresses it resolves to

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use crate::extractor::FrequencyMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubdomainRecord {
    /// Reporting sources, first sighting first, no repeats
    sources: Vec<String>,
    addresses: BTreeSet<IpAddr>,
}

impl SubdomainRecord {
    fn first_seen_by(source: &str) -> Self {
        Self {
            sources: vec![source.to_string()],
            addresses: BTreeSet::new(),
        }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn addresses(&self) -> &BTreeSet<IpAddr> {
        &self.addresses
    }

    pub fn reported_by(&self, source: &str) -> bool {
        self.sources.iter().any(|s| s == source)
    }

    fn add_source(&mut self, source: &str) -> bool {
        if self.reported_by(source) {
            return false;
        }
        self.sources.push(source.to_string());
        true
    }
}

/// Outcome of one merge, printed as the per-source summary line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub source: String,
    /// Distinct subdomains the source reported
    pub reported: usize,
    /// Of those, how many the registry had not seen yet
    pub added: usize,
}

#[derive(Debug, Default)]
pub struct Registry {
    records: BTreeMap<String, SubdomainRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute every subdomain in `subdomains` to `source`.
    ///
    /// Records are created on first sighting and never removed; merging the same
    /// mapping twice leaves the registry unchanged.
    pub fn merge(&mut self, subdomains: &FrequencyMap, source: &str) -> MergeSummary {
        let mut added = 0;

        for subdomain in subdomains.keys() {
            match self.records.get_mut(subdomain) {
                Some(record) => {
                    record.add_source(source);
                }
                None => {
                    self.records
                        .insert(subdomain.clone(), SubdomainRecord::first_seen_by(source));
                    added += 1;
                }
            }
        }

        MergeSummary {
            source: source.to_string(),
            reported: subdomains.len(),
            added,
        }
    }

    /// Replace the address set of a known subdomain. Unknown names are ignored.
    pub fn attach_addresses<I>(&mut self, subdomain: &str, addresses: I) -> bool
    where
        I: IntoIterator<Item = IpAddr>,
    {
        match self.records.get_mut(subdomain) {
            Some(record) => {
                record.addresses = addresses.into_iter().collect();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, subdomain: &str) -> Option<&SubdomainRecord> {
        self.records.get(subdomain)
    }

    pub fn contains(&self, subdomain: &str) -> bool {
        self.records.contains_key(subdomain)
    }

    pub fn subdomains(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    /// Records in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SubdomainRecord)> {
        self.records.iter().map(|(name, record)| (name.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn resolved_count(&self) -> usize {
        self.records.values().filter(|r| !r.addresses.is_empty()).count()
    }
}
