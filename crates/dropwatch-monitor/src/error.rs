use dropwatch_scraper::ScraperError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error("unknown site: {0}")]
    UnknownSite(String),

    #[error("site {id} is a {platform} site, not a retail API site")]
    NotRetailSite { id: String, platform: String },
}
