// extractor.rs - Subdomain extraction from a parsed result page
// Purpose: Select result nodes, optionally run the capture pattern over their text,
//          and count how often each subdomain appears

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

use crate::config::Selection;
use crate::error::{ReconError, ReconResult};
use crate::logger::{RunLog, DETAIL};

/// subdomain -> occurrences within one page
pub type FrequencyMap = HashMap<String, usize>;

/// Compiled selection and capture pattern for one source
#[derive(Debug)]
pub struct Extractor {
    selector: Selector,
    attribute: Option<&'static str>,
    capture: Option<Regex>,
}

impl Extractor {
    /// Compile `selection` and `capture`. A pattern without a capture group is rejected here.
    pub fn new(selection: &Selection, capture: Option<&str>) -> ReconResult<Self> {
        let selector = Selector::parse(selection.css).map_err(|e| ReconError::InvalidSelector {
            selector: selection.css.to_string(),
            reason: format!("{:?}", e),
        })?;

        let capture = match capture.filter(|p| !p.is_empty()) {
            Some(pattern) => {
                let regex = Regex::new(pattern)?;
                if regex.captures_len() < 2 {
                    return Err(ReconError::NoCaptureGroup(pattern.to_string()));
                }
                Some(regex)
            }
            None => None,
        };

        Ok(Self {
            selector,
            attribute: selection.attribute,
            capture,
        })
    }

    /// Count the subdomains found in `document`.
    ///
    /// Nodes whose text is blank are skipped. A capture pattern that does not match
    /// a node is a configuration error and aborts the extraction.
    pub fn extract(&self, document: &Html, log: &RunLog) -> ReconResult<FrequencyMap> {
        let mut subdomains = FrequencyMap::new();

        for node in document.select(&self.selector) {
            let link = self.node_text(&node);
            let link = link.trim();
            if link.is_empty() {
                continue;
            }
            log.log(format!("Link Fetched: {}", link), DETAIL);

            let subdomain = match &self.capture {
                Some(regex) => regex
                    .captures(link)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str())
                    .ok_or_else(|| ReconError::CaptureMismatch {
                        pattern: regex.as_str().to_string(),
                        text: link.to_string(),
                    })?,
                None => link,
            };
            log.log(format!("Extracted subdomain: {}", subdomain), DETAIL);

            *subdomains.entry(subdomain.to_string()).or_insert(0) += 1;
        }

        Ok(subdomains)
    }

    fn node_text(&self, node: &ElementRef) -> String {
        match self.attribute {
            Some(name) => node.value().attr(name).unwrap_or_default().to_string(),
            None => node.text().collect(),
        }
    }
}

/// One-shot form of [`Extractor::new`] + [`Extractor::extract`]
pub fn extract(
    document: &Html,
    selection: &Selection,
    capture: Option<&str>,
    log: &RunLog,
) -> ReconResult<FrequencyMap> {
    Extractor::new(selection, capture)?.extract(document, log)
}
