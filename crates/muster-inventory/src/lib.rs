//! Muster Inventory - Synchronized container and host cache
//!
//! The center of the system: a periodically refreshed, concurrently
//! readable snapshot of the orchestrator's containers and hosts, joined so
//! every container carries its host's display name. Lookups are served
//! through the [`InventoryService`] contract, with logging and metrics
//! layered on as decorators.

pub mod cache;
pub mod instrument;
pub mod logging;
pub mod metrics;
pub mod service;

pub use cache::InventoryCache;
pub use instrument::{InstrumentedService, InstrumentedSource};
pub use logging::{LoggingService, LoggingSource};
pub use metrics::{inventory_metrics, InventoryMetrics};
pub use service::{InventoryService, InventoryStore, ReadService};
