// error.rs - Error taxonomy for SubRecon
// Purpose: Separate fatal configuration/input errors from per-source failures
//          that a scan may degrade past

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    #[error("invalid domain '{0}': expected a registrable domain such as 'example.org'")]
    InvalidDomain(String),

    #[error("unknown source '{0}'")]
    UnknownSource(String),

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid capture pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("capture pattern '{0}' has no capture group")]
    NoCaptureGroup(String),

    #[error("capture pattern '{pattern}' did not match '{text}'")]
    CaptureMismatch { pattern: String, text: String },

    #[error("invalid request URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("lookup of {host} failed: {reason}")]
    Lookup { host: String, reason: String },

    #[error("lookup of {host} timed out")]
    LookupTimeout { host: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl ReconError {
    /// Whether the error must abort the whole run.
    ///
    /// Network-side failures of a single source are not fatal: the caller may
    /// treat that source as having found nothing and continue.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ReconError::Transport { .. }
                | ReconError::HttpStatus { .. }
                | ReconError::Lookup { .. }
                | ReconError::LookupTimeout { .. }
        )
    }
}

pub type ReconResult<T> = Result<T, ReconError>;
