use std::sync::{Arc, PoisonError, RwLock};

/// Search keywords shared by every retail poller of a fleet.
///
/// Replacing the list takes effect at the start of each poller's next cycle;
/// a cycle already in progress keeps the list it started with.
#[derive(Debug, Clone, Default)]
pub struct KeywordList(Arc<RwLock<Vec<String>>>);

impl KeywordList {
    #[must_use]
    pub fn new(keywords: Vec<String>) -> Self {
        Self(Arc::new(RwLock::new(clean(keywords))))
    }

    pub fn replace(&self, keywords: Vec<String>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = clean(keywords);
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trims, drops blanks, and removes case-insensitive duplicates.
fn clean(keywords: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let keyword = keyword.trim();
        if !keyword.is_empty() && !out.iter().any(|k| k.eq_ignore_ascii_case(keyword)) {
            out.push(keyword.to_owned());
        }
    }
    out
}
