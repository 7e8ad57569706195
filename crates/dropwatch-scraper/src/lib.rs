pub mod catalog;
pub mod error;
pub mod index;
pub mod origin;
pub mod pagination;
pub mod poller;
pub mod rate_limit;
pub mod retail;
pub mod session;
pub mod sizes;

pub use catalog::{CatalogOptions, CatalogPoller};
pub use error::ScraperError;
pub use index::InventoryIndex;
pub use poller::{
    Detection, DetectionKind, MonitoredStore, RecordOutcome, StoreCounters, StorePoller,
    StoreStats,
};
pub use retail::{KeywordList, RetailOptions, RetailPoller};
pub use session::{HttpResponse, HttpSession};
