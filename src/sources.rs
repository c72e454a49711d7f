// sources.rs - Source adapters
// Purpose: Turn a SourceConfig into request URLs for a domain and run the
//          extractor over the fetched pages

use colored::*;
use scraper::{Html, Selector};

use crate::config::{SourceConfig, SourceKind};
use crate::error::{ReconError, ReconResult};
use crate::extractor::{Extractor, FrequencyMap};
use crate::fetcher::PageFetcher;
use crate::logger::{RunLog, MILESTONE, RAW};
use crate::refine;

pub struct SourceAdapter {
    config: SourceConfig,
    extractor: Extractor,
    challenge: Option<Selector>,
}

impl SourceAdapter {
    /// Compile the adapter; selector and pattern problems surface here, before any fetch
    pub fn new(config: SourceConfig) -> ReconResult<Self> {
        let extractor = Extractor::new(&config.selection, config.capture)?;

        let challenge = config
            .challenge
            .map(|css| {
                Selector::parse(css).map_err(|e| ReconError::InvalidSelector {
                    selector: css.to_string(),
                    reason: format!("{:?}", e),
                })
            })
            .transpose()?;

        Ok(Self {
            config,
            extractor,
            challenge,
        })
    }

    pub fn name(&self) -> &'static str {
        self.config.name
    }

    /// Base query for `domain`, before any refinement
    pub fn query_url(&self, domain: &str) -> String {
        self.config.url_template.replace("{domain}", domain)
    }

    /// Everything this source reports for `domain`
    pub async fn discover<F>(
        &self,
        fetcher: &F,
        domain: &str,
        log: &RunLog,
    ) -> ReconResult<FrequencyMap>
    where
        F: PageFetcher + ?Sized,
    {
        match self.config.kind {
            SourceKind::ThreatIntel => {
                let url = self.query_url(domain);
                let subdomains = self.fetch_and_extract(fetcher, &url, log).await?;
                log.log(
                    format!("{} returned {} subdomains", self.name(), subdomains.len()),
                    MILESTONE,
                );
                Ok(subdomains)
            }
            SourceKind::SearchEngine => refine::discover(self, fetcher, domain, log).await,
        }
    }

    /// Fetch one page and count the subdomains on it
    pub(crate) async fn fetch_and_extract<F>(
        &self,
        fetcher: &F,
        url: &str,
        log: &RunLog,
    ) -> ReconResult<FrequencyMap>
    where
        F: PageFetcher + ?Sized,
    {
        log.log(format!("Fetch from URL: {}", url), MILESTONE);
        let body = fetcher.fetch(url).await?;
        if log.enabled(RAW) {
            log.log(body.as_str(), RAW);
        }

        let document = Html::parse_document(&body);
        if self.shows_challenge(&document) {
            let warning = format!(
                "[!] {} presented a captcha page, results from it will be empty",
                self.name()
            );
            println!("{}", warning.yellow());
            log.log(warning, MILESTONE);
        }

        self.extractor.extract(&document, log)
    }

    fn shows_challenge(&self, document: &Html) -> bool {
        let Some(selector) = &self.challenge else {
            return false;
        };
        document
            .select(selector)
            .map(|node| node.text().collect::<String>())
            .any(|text| text.to_lowercase().contains("captcha"))
    }
}
