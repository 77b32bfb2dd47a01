//! Core type definitions for Muster
//!
//! This module defines the two inventory entities served by the system.
//! The serialized shapes are the consumer-facing contract: PascalCase keys,
//! with the internal host identifier never exposed.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Service index value marking a container as unattached to any
/// orchestrator-managed service.
pub const ORPHANED_SERVICE_INDEX: i64 = 0;

/// Opaque identifier of a host, as reported by the metadata source
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[display("{_0}")]
pub struct HostId(String);

impl HostId {
    /// Create a new host ID
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the host ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the ID is empty (container reported without a host)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for HostId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Debug for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostId({:?})", self.0)
    }
}

/// A running container as reported by the metadata source.
///
/// `host_name` is the only field not sourced verbatim from upstream: it is
/// denormalized from the host collection during refresh and may be empty if
/// the referenced host is unknown at that time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Container name, unique within a snapshot; the primary lookup key
    #[serde(rename = "Name")]
    pub name: String,
    /// Status label reported by the orchestrator (free-form)
    #[serde(rename = "State")]
    pub state: String,
    /// Address on the internal overlay network
    #[serde(rename = "PrivateIP")]
    pub private_ip: String,
    /// Index within the owning service; 0 means orphaned
    #[serde(rename = "ServiceIndex")]
    pub service_index: i64,
    /// Identifier of the host running this container; enrichment-internal
    #[serde(skip)]
    pub host_id: HostId,
    /// Display name of the host, filled in by enrichment
    #[serde(rename = "HostName")]
    pub host_name: String,
}

impl Container {
    /// Check whether this container is unattached to any service
    #[must_use]
    pub const fn is_orphaned(&self) -> bool {
        self.service_index == ORPHANED_SERVICE_INDEX
    }
}

/// A host as reported by the metadata source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Opaque unique identifier; the primary lookup key
    #[serde(skip)]
    pub id: HostId,
    /// Display hostname
    #[serde(rename = "HostName")]
    pub name: String,
}
