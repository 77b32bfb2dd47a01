//! Lookup contracts and the read service facade

use std::sync::Arc;

use muster_common::{Container, Host, HostId, InventoryResult};

/// Point and bulk lookups against the published inventory snapshots.
///
/// Implemented by the synchronization cache; everything above it programs
/// against this trait so the cache can be replaced in tests.
pub trait InventoryStore: Send + Sync {
    /// Look up a single container by name
    fn container_by_name(&self, name: &str) -> InventoryResult<Arc<Container>>;

    /// All containers in the current snapshot
    fn containers(&self) -> InventoryResult<Vec<Arc<Container>>>;

    /// Look up a single host by identifier
    fn host_by_id(&self, id: &HostId) -> InventoryResult<Arc<Host>>;

    /// All hosts in the current snapshot
    fn hosts(&self) -> InventoryResult<Vec<Arc<Host>>>;
}

/// Container lookups as consumers see them.
///
/// Each operation is an independently wrappable unit with a stable
/// contract, so cross-cutting decorators can stack over any
/// implementation without touching it.
pub trait InventoryService: Send + Sync {
    /// Look up a single container by name
    fn container(&self, name: &str) -> InventoryResult<Arc<Container>>;

    /// All containers in the current snapshot
    fn containers(&self) -> InventoryResult<Vec<Arc<Container>>>;
}

/// Facade translating store lookups into the consumer-facing contract.
///
/// Adds no behavior of its own; the error distinctions made by the store
/// pass through unchanged.
pub struct ReadService<S> {
    store: Arc<S>,
}

impl<S> ReadService<S> {
    /// Create a read service over the given store
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: InventoryStore> InventoryService for ReadService<S> {
    fn container(&self, name: &str) -> InventoryResult<Arc<Container>> {
        self.store.container_by_name(name)
    }

    fn containers(&self) -> InventoryResult<Vec<Arc<Container>>> {
        self.store.containers()
    }
}
