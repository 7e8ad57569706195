//! Request URL builders for both storefront families.
//!
//! Catalog feeds are paged with a 1-based `page` query parameter. A cycle
//! stops at the first empty page or after [`MAX_PAGES`] pages, whichever
//! comes first. Retail search is a single request per keyword.

use crate::error::ScraperError;

/// Hard cap on catalog pages fetched per cycle.
pub const MAX_PAGES: u32 = 10;

/// Products requested per catalog page.
pub const PAGE_LIMIT: u32 = 250;

/// Results requested per retail keyword search.
pub const SEARCH_PAGE_SIZE: u32 = 60;

/// Builds `{origin}{endpoint}?limit=250&page={page}`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidStoreUrl`] if the joined URL cannot be parsed.
pub fn catalog_page_url(origin: &str, endpoint: &str, page: u32) -> Result<String, ScraperError> {
    let mut url = parse_base(origin, endpoint)?;
    url.query_pairs_mut()
        .append_pair("limit", &PAGE_LIMIT.to_string())
        .append_pair("page", &page.to_string());
    Ok(url.to_string())
}

/// Builds the newest-first keyword search URL for a retail site.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidStoreUrl`] if the joined URL cannot be parsed.
pub fn retail_search_url(
    origin: &str,
    endpoint: &str,
    keyword: &str,
) -> Result<String, ScraperError> {
    let mut url = parse_base(origin, endpoint)?;
    url.query_pairs_mut()
        .append_pair("query", keyword)
        .append_pair("currentPage", "0")
        .append_pair("pageSize", &SEARCH_PAGE_SIZE.to_string())
        .append_pair("sort", "newArrivals");
    Ok(url.to_string())
}

fn parse_base(origin: &str, endpoint: &str) -> Result<reqwest::Url, ScraperError> {
    let base = format!("{}{endpoint}", origin.trim_end_matches('/'));
    reqwest::Url::parse(&base).map_err(|e| ScraperError::InvalidStoreUrl {
        store_url: origin.to_owned(),
        reason: format!("\"{base}\" is not a valid URL: {e}"),
    })
}
