//! Transport boundary: one reqwest client per polled store.
//!
//! Pollers only need "GET this URL with these headers through this proxy and
//! give me the status and body". Fingerprinting and TLS details stay in
//! reqwest's hands.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::Client;

use crate::error::ScraperError;

/// Redirect hops followed before a request fails.
const MAX_REDIRECTS: usize = 10;

/// Desktop browser user agents rotated per request.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

#[must_use]
pub fn random_user_agent() -> &'static str {
    USER_AGENTS[rand::random_range(0..USER_AGENTS.len())]
}

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    /// Parsed `Retry-After` header (seconds form only).
    pub retry_after_secs: Option<u64>,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP session bound to at most one proxy.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
    proxy: Option<String>,
}

impl HttpSession {
    /// Builds a session with a fixed request timeout, redirect following, and
    /// an optional proxy applied to every scheme.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the proxy URL is invalid or the
    /// client cannot be constructed.
    pub fn new(timeout: Duration, proxy: Option<&str>) -> Result<Self, ScraperError> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .redirect(Policy::limited(MAX_REDIRECTS));
        if let Some(proxy) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        Ok(Self {
            client: builder.build()?,
            proxy: proxy.map(str::to_owned),
        })
    }

    #[must_use]
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Issues a GET and reads the whole body. Non-2xx statuses are returned,
    /// not raised; interpreting them is the poller's job.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] on timeout, connection failure, or a
    /// body that cannot be read.
    pub async fn get(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse, ScraperError> {
        let response = self.client.get(url).headers(headers).send().await?;
        let status = response.status().as_u16();
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());
        let body = response.text().await?;
        Ok(HttpResponse {
            status,
            body,
            retry_after_secs,
        })
    }
}
