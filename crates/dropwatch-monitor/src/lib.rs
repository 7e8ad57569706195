pub mod error;
pub mod event_log;
pub mod events;
pub mod fleet;
pub mod manager;
pub mod policy;
pub mod proxy;
pub mod tasks;

pub use error::MonitorError;
pub use event_log::EventLog;
pub use events::DetectionEvent;
pub use fleet::{DetectionHandler, FleetCoordinator};
pub use manager::{EventCallback, ManagerOptions, ManagerStats, MonitorManager};
pub use policy::should_trigger;
pub use proxy::ProxyPool;
pub use tasks::{LoggingTaskSink, TaskSink};
