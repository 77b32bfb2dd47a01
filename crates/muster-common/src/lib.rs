//! Muster Common - Shared types and utilities
//!
//! This crate provides the entity types, error taxonomy, and configuration
//! structures used across all Muster components.

pub mod config;
pub mod error;
pub mod types;

pub use config::{GatewayConfig, LoggingConfig, MetadataConfig, ServerConfig};
pub use error::{InventoryError, InventoryResult};
pub use types::*;
