//! Synchronization cache for the container and host inventory
//!
//! Pulls both collections from the metadata source on a fixed interval and
//! publishes them as immutable snapshots. Readers clone the current
//! snapshot handle and never block a refresh; a refresh that fails leaves
//! the last good snapshot in place.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

use muster_common::{Container, Host, HostId, InventoryError, InventoryResult};
use muster_upstream::MetadataSource;

use crate::metrics::inventory_metrics;
use crate::service::InventoryStore;

/// One published collection and its identifier index.
///
/// The two structures are only ever swapped together, so a reader holding
/// a snapshot handle sees a list and index that agree.
#[derive(Debug)]
struct Snapshot<K, T> {
    entries: Vec<Arc<T>>,
    index: HashMap<K, Arc<T>>,
}

impl<K, T> Snapshot<K, T>
where
    K: Eq + Hash + Clone,
{
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build a snapshot from an upstream collection.
    ///
    /// Duplicate keys take the last occurrence's data; the list keeps each
    /// key at its first upstream position so list and index stay in step.
    fn build<F>(items: Vec<T>, key_of: F) -> Self
    where
        F: Fn(&T) -> K,
    {
        let mut index: HashMap<K, Arc<T>> = HashMap::with_capacity(items.len());
        let mut order: Vec<K> = Vec::with_capacity(items.len());
        for item in items {
            let key = key_of(&item);
            if !index.contains_key(&key) {
                order.push(key.clone());
            }
            index.insert(key, Arc::new(item));
        }
        let entries = order.iter().map(|key| Arc::clone(&index[key])).collect();
        Self { entries, index }
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// In-memory cache of the orchestrator inventory.
///
/// Construct with [`InventoryCache::new`], then call
/// [`InventoryCache::start`] once to begin the refresh cycle. Lookups are
/// served through the [`InventoryStore`] impl.
pub struct InventoryCache {
    source: Arc<dyn MetadataSource>,
    containers: RwLock<Arc<Snapshot<String, Container>>>,
    hosts: RwLock<Arc<Snapshot<HostId, Host>>>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl InventoryCache {
    /// Create a cache with both collections empty
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self {
            source,
            containers: RwLock::new(Arc::new(Snapshot::empty())),
            hosts: RwLock::new(Arc::new(Snapshot::empty())),
            refresh_task: Mutex::new(None),
        }
    }

    /// Start the recurring refresh cycle.
    ///
    /// The first cycle runs immediately; each subsequent cycle starts
    /// `interval` after the previous one finished. Starting again replaces
    /// the running cycle. The task holds only a weak handle on the cache,
    /// so dropping the cache ends the cycle as well.
    pub fn start(self: &Arc<Self>, interval: Duration) {
        let weak = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            loop {
                let Some(cache) = weak.upgrade() else { break };
                cache.refresh_cycle().await;
                drop(cache);
                tokio::time::sleep(interval).await;
            }
        });
        if let Some(previous) = self.refresh_task.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Cancel the refresh cycle.
    ///
    /// Lookups keep working against the last published snapshots.
    pub fn shutdown(&self) {
        if let Some(handle) = self.refresh_task.lock().take() {
            handle.abort();
        }
    }

    /// One fetch, commit, enrich pass over both collections
    async fn refresh_cycle(&self) {
        tokio::join!(self.refresh_containers(), self.refresh_hosts());
        self.enrich_containers();

        let container_count = self.containers.read().len();
        let host_count = self.hosts.read().len();
        let metrics = inventory_metrics();
        metrics.set_container_count(container_count as u64);
        metrics.set_host_count(host_count as u64);
        metrics.record_refresh_cycle();
        debug!(
            "refresh cycle complete: {} containers, {} hosts",
            container_count, host_count
        );
    }

    async fn refresh_containers(&self) {
        // A failed fetch keeps the last good snapshot; decorators around
        // the source observe the error.
        if let Ok(items) = self.source.fetch_containers().await {
            let snapshot = Snapshot::build(items, |c: &Container| c.name.clone());
            *self.containers.write() = Arc::new(snapshot);
        }
    }

    async fn refresh_hosts(&self) {
        if let Ok(items) = self.source.fetch_hosts().await {
            let snapshot = Snapshot::build(items, |h: &Host| h.id.clone());
            *self.hosts.write() = Arc::new(snapshot);
        }
    }

    /// Join host names onto the container snapshot.
    ///
    /// Runs after both commits, over whatever each collection currently
    /// holds. A container whose host is unknown gets an empty name, which
    /// is not an error. The enriched collection is republished as a fresh
    /// snapshot, so readers never see a container mutate in place.
    fn enrich_containers(&self) {
        let current = self.containers.read().clone();
        if current.is_empty() {
            return;
        }
        let hosts = self.hosts.read().clone();

        let enriched: Vec<Container> = current
            .entries
            .iter()
            .map(|entry| {
                let mut container = Container::clone(entry);
                container.host_name = hosts
                    .index
                    .get(&container.host_id)
                    .map(|host| host.name.clone())
                    .unwrap_or_default();
                container
            })
            .collect();

        let snapshot = Snapshot::build(enriched, |c: &Container| c.name.clone());
        *self.containers.write() = Arc::new(snapshot);
    }
}

impl Drop for InventoryCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl InventoryStore for InventoryCache {
    fn container_by_name(&self, name: &str) -> InventoryResult<Arc<Container>> {
        let snapshot = self.containers.read().clone();
        if snapshot.is_empty() {
            return Err(InventoryError::ContainerRepositoryEmpty);
        }
        snapshot
            .index
            .get(name)
            .cloned()
            .ok_or(InventoryError::ContainerNotFound)
    }

    fn containers(&self) -> InventoryResult<Vec<Arc<Container>>> {
        let snapshot = self.containers.read().clone();
        if snapshot.is_empty() {
            return Err(InventoryError::ContainerRepositoryEmpty);
        }
        Ok(snapshot.entries.clone())
    }

    fn host_by_id(&self, id: &HostId) -> InventoryResult<Arc<Host>> {
        let snapshot = self.hosts.read().clone();
        if snapshot.is_empty() {
            return Err(InventoryError::HostRepositoryEmpty);
        }
        snapshot
            .index
            .get(id)
            .cloned()
            .ok_or(InventoryError::HostNotFound)
    }

    fn hosts(&self) -> InventoryResult<Vec<Arc<Host>>> {
        let snapshot = self.hosts.read().clone();
        if snapshot.is_empty() {
            return Err(InventoryError::HostRepositoryEmpty);
        }
        Ok(snapshot.entries.clone())
    }
}
