use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings read from the environment at startup.
///
/// Everything describing *what* to monitor lives in the monitors file
/// (see [`crate::monitors`]); this struct only carries runtime knobs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub monitors_path: PathBuf,
    /// Curated-target JSON document. `None` means the built-in seed list.
    pub targets_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    /// Upper bound on polls in flight at once, per fleet.
    pub max_concurrent_polls: usize,
    pub event_log_capacity: usize,
    pub page_delay_ms: u64,
    pub keyword_delay_ms: u64,
    /// Matched targets whose profit exceeds this are treated as high priority.
    pub high_profit_threshold: f64,
}
