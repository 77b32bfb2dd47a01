//! Muster Upstream - Metadata source access
//!
//! Talks to the orchestrator metadata service and converts its wire
//! payloads into the shared domain types. Everything downstream consumes
//! the [`MetadataSource`] trait rather than the HTTP client directly.

pub mod client;
pub mod error;

mod wire;

pub use client::{MetadataHttpClient, MetadataSource, CONTAINERS_SUBPATH, HOSTS_SUBPATH};
pub use error::{SourceError, SourceResult};
