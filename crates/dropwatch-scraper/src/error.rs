use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("access denied by {domain} (HTTP {status})")]
    AccessDenied { domain: String, status: u16 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid store URL \"{store_url}\": {reason}")]
    InvalidStoreUrl { store_url: String, reason: String },

    #[error("unknown site: {0}")]
    UnknownSite(String),
}

impl ScraperError {
    /// `true` for outcomes of talking to a storefront (transport failures,
    /// throttling, refusals, bad statuses, unparseable pages). Anything else
    /// points at local misconfiguration.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ScraperError::Http(_)
                | ScraperError::Deserialize { .. }
                | ScraperError::RateLimited { .. }
                | ScraperError::AccessDenied { .. }
                | ScraperError::UnexpectedStatus { .. }
        )
    }
}
