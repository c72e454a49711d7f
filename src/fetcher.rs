// fetcher.rs - HTTP page retrieval
// Purpose: GET a source page with the browser user agent and hand back its body

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::config::ScanConfig;
use crate::error::{ReconError, ReconResult};

/// Anything that can turn a URL into an HTML body
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ReconResult<String>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScanConfig) -> ReconResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()
            .map_err(ReconError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> ReconResult<String> {
        let parsed = Url::parse(url).map_err(|source| ReconError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| ReconError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReconError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| ReconError::Transport {
            url: url.to_string(),
            source,
        })
    }
}
