// testing.rs - In-memory collaborators for unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;

use crate::error::{ReconError, ReconResult};
use crate::fetcher::PageFetcher;
use crate::resolver::HostResolver;

enum Scripted {
    Page(String),
    Status(u16),
}

/// Serves canned bodies by exact URL and records every request.
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: HashMap<String, Scripted>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), Scripted::Page(body.to_string()));
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), Scripted::Status(status));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> ReconResult<String> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(Scripted::Page(body)) => Ok(body.clone()),
            Some(Scripted::Status(status)) => Err(ReconError::HttpStatus {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(ReconError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Google-shaped result page linking each host `count` times
pub fn google_page(hits: &[(&str, usize)]) -> String {
    let mut html = String::from(r#"<html><body><div id="rso">"#);
    for (host, count) in hits {
        for i in 0..*count {
            html.push_str(&format!(
                r#"<div><div><h3><a href="https://{}/page{}">{}</a></h3></div></div>"#,
                host, i, host
            ));
        }
    }
    html.push_str("</div></body></html>");
    html
}

/// Fixed host table; hosts not in it fail to resolve
#[derive(Default)]
pub struct StaticResolver {
    hosts: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, name: &str, addresses: &[&str]) -> Self {
        let parsed = addresses.iter().map(|a| a.parse().unwrap()).collect();
        self.hosts.insert(name.to_string(), parsed);
        self
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn lookup(&self, host: &str) -> ReconResult<Vec<IpAddr>> {
        self.hosts.get(host).cloned().ok_or_else(|| ReconError::Lookup {
            host: host.to_string(),
            reason: "NXDOMAIN".to_string(),
        })
    }
}
