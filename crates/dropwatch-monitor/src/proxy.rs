//! Round-robin proxy hand-out for store registration.

/// Proxies handed out in order, wrapping at the end. An empty pool hands
/// out `None`, meaning direct connections.
#[derive(Debug, Clone, Default)]
pub struct ProxyPool {
    proxies: Vec<String>,
    cursor: usize,
}

impl ProxyPool {
    #[must_use]
    pub fn new(proxies: Vec<String>) -> Self {
        Self {
            proxies: proxies
                .into_iter()
                .map(|p| p.trim().to_owned())
                .filter(|p| !p.is_empty())
                .collect(),
            cursor: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// The proxy for the next registered store.
    pub fn next_proxy(&mut self) -> Option<String> {
        if self.proxies.is_empty() {
            return None;
        }
        let proxy = self.proxies[self.cursor % self.proxies.len()].clone();
        self.cursor = (self.cursor + 1) % self.proxies.len();
        Some(proxy)
    }
}
