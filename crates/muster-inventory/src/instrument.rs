//! Metrics decorators
//!
//! Count lookups by outcome and upstream fetches by result, recording into
//! the global inventory metrics.

use std::sync::Arc;

use async_trait::async_trait;
use muster_common::{Container, Host, InventoryResult};
use muster_upstream::{MetadataSource, SourceResult};

use crate::metrics::{
    inventory_metrics, Collection, LookupOperation, LookupOutcome, LookupTimer,
};
use crate::service::InventoryService;

fn outcome_of<T>(result: &InventoryResult<T>) -> LookupOutcome {
    match result {
        Ok(_) => LookupOutcome::Found,
        Err(e) if e.is_not_found() => LookupOutcome::NotFound,
        Err(_) => LookupOutcome::Empty,
    }
}

/// Times each lookup and records its outcome
pub struct InstrumentedService<S> {
    inner: S,
}

impl<S> InstrumentedService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: InventoryService> InventoryService for InstrumentedService<S> {
    fn container(&self, name: &str) -> InventoryResult<Arc<Container>> {
        let timer = LookupTimer::new(LookupOperation::ContainerByName);
        let result = self.inner.container(name);
        timer.complete(outcome_of(&result));
        result
    }

    fn containers(&self) -> InventoryResult<Vec<Arc<Container>>> {
        let timer = LookupTimer::new(LookupOperation::Containers);
        let result = self.inner.containers();
        timer.complete(outcome_of(&result));
        result
    }
}

/// Counts each upstream fetch by collection and outcome
pub struct InstrumentedSource<S> {
    inner: S,
}

impl<S> InstrumentedSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: MetadataSource> MetadataSource for InstrumentedSource<S> {
    async fn fetch_containers(&self) -> SourceResult<Vec<Container>> {
        let result = self.inner.fetch_containers().await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.code(),
        };
        inventory_metrics().record_fetch(Collection::Containers, outcome);
        result
    }

    async fn fetch_hosts(&self) -> SourceResult<Vec<Host>> {
        let result = self.inner.fetch_hosts().await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.code(),
        };
        inventory_metrics().record_fetch(Collection::Hosts, outcome);
        result
    }
}
