//! Logging decorators
//!
//! Wrap the lookup service and the metadata source without changing their
//! contracts. Fetch failures are absorbed by the cache, so this layer is
//! where they become visible.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use muster_common::{Container, Host, InventoryResult};
use muster_upstream::{MetadataSource, SourceResult};
use tracing::{debug, warn};

use crate::service::InventoryService;

/// Logs every lookup with its outcome and duration
pub struct LoggingService<S> {
    inner: S,
}

impl<S> LoggingService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: InventoryService> InventoryService for LoggingService<S> {
    fn container(&self, name: &str) -> InventoryResult<Arc<Container>> {
        let start = Instant::now();
        let result = self.inner.container(name);
        match &result {
            Ok(_) => debug!("container lookup {:?} took {:?}", name, start.elapsed()),
            Err(e) => debug!(
                "container lookup {:?} failed after {:?}: {}",
                name,
                start.elapsed(),
                e
            ),
        }
        result
    }

    fn containers(&self) -> InventoryResult<Vec<Arc<Container>>> {
        let start = Instant::now();
        let result = self.inner.containers();
        match &result {
            Ok(list) => debug!(
                "container list returned {} entries in {:?}",
                list.len(),
                start.elapsed()
            ),
            Err(e) => debug!("container list failed after {:?}: {}", start.elapsed(), e),
        }
        result
    }
}

/// Logs every upstream fetch; failures are warnings
pub struct LoggingSource<S> {
    inner: S,
}

impl<S> LoggingSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: MetadataSource> MetadataSource for LoggingSource<S> {
    async fn fetch_containers(&self) -> SourceResult<Vec<Container>> {
        let start = Instant::now();
        let result = self.inner.fetch_containers().await;
        match &result {
            Ok(items) => debug!("fetched {} containers in {:?}", items.len(), start.elapsed()),
            Err(e) => warn!("container fetch failed after {:?}: {}", start.elapsed(), e),
        }
        result
    }

    async fn fetch_hosts(&self) -> SourceResult<Vec<Host>> {
        let start = Instant::now();
        let result = self.inner.fetch_hosts().await;
        match &result {
            Ok(items) => debug!("fetched {} hosts in {:?}", items.len(), start.elapsed()),
            Err(e) => warn!("host fetch failed after {:?}: {}", start.elapsed(), e),
        }
        result
    }
}
