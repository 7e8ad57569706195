//! URL origin, domain, and proxy-display helpers.

use crate::error::ScraperError;

/// Extracts the scheme+host origin from a store URL.
///
/// Given `"https://kith.com/collections/all"`, returns `"https://kith.com"`, so
/// catalog endpoints are always built from the store root.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidStoreUrl`] if `store_url` is not an absolute
/// URL with a host.
pub fn extract_store_origin(store_url: &str) -> Result<String, ScraperError> {
    let url = reqwest::Url::parse(store_url).map_err(|e| ScraperError::InvalidStoreUrl {
        store_url: store_url.to_owned(),
        reason: e.to_string(),
    })?;
    if url.host_str().is_none() {
        return Err(ScraperError::InvalidStoreUrl {
            store_url: store_url.to_owned(),
            reason: "URL has no host".to_owned(),
        });
    }
    Ok(url.origin().ascii_serialization())
}

/// Extracts the hostname from a URL for logs and error messages.
///
/// Falls back to the full URL string if parsing fails.
#[must_use]
pub fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}

/// Proxy URL reduced to `host[:port]`, dropping scheme and credentials.
#[must_use]
pub fn redact_proxy(proxy: &str) -> String {
    match reqwest::Url::parse(proxy) {
        Ok(url) => match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_owned(),
            _ => "<invalid proxy>".to_owned(),
        },
        Err(_) => "<invalid proxy>".to_owned(),
    }
}
