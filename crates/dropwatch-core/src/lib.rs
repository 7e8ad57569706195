pub mod app_config;
pub mod config;
pub mod monitors;
pub mod products;
pub mod seed;
pub mod sites;
pub mod targets;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use monitors::{
    load_monitors, parse_monitors, AutoTriggerConfig, CatalogSection, MonitorsFile,
    RetailSection, StoreDescriptor,
};
pub use products::{ProductSnapshot, VariantDetail};
pub use sites::{Platform, Site, SiteDirectory, DEFAULT_RETAIL_SITES};
pub use targets::{
    CuratedTarget, Priority, RegistryStats, TargetMatch, TargetRegistry, TargetsDocument,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read monitors file {path}: {source}")]
    MonitorsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse monitors file: {0}")]
    MonitorsFileParse(#[source] serde_yaml::Error),

    #[error("monitors config validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read targets file {path}: {source}")]
    TargetsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse targets document: {0}")]
    TargetsParse(#[source] serde_json::Error),

    #[error("unknown curated target: {0}")]
    UnknownTarget(String),
}
