//! Error types for Muster
//!
//! This module defines the lookup error taxonomy shared by the inventory
//! cache and the HTTP transport.

use thiserror::Error;

/// Common result type for inventory lookups
pub type InventoryResult<T> = std::result::Result<T, InventoryError>;

/// Errors returned by inventory lookups.
///
/// "Not found" means the snapshot is populated but the requested key is
/// absent. "Repository is empty" means no data is currently published for
/// that entity kind, either because no refresh has ever succeeded or because
/// the upstream source legitimately reported zero entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("container not found")]
    ContainerNotFound,

    #[error("container repository is empty")]
    ContainerRepositoryEmpty,

    #[error("host not found")]
    HostNotFound,

    #[error("host repository is empty")]
    HostRepositoryEmpty,
}

impl InventoryError {
    /// Check if this is a not found error
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ContainerNotFound | Self::HostNotFound)
    }

    /// Get the HTTP status code this error maps to.
    ///
    /// Missing keys are 404; an unpopulated repository is 424 Failed
    /// Dependency.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::ContainerNotFound | Self::HostNotFound => 404,
            Self::ContainerRepositoryEmpty | Self::HostRepositoryEmpty => 424,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_not_found() {
        assert!(InventoryError::ContainerNotFound.is_not_found());
        assert!(InventoryError::HostNotFound.is_not_found());
        assert!(!InventoryError::ContainerRepositoryEmpty.is_not_found());
    }

    #[test]
    fn test_error_http_status() {
        assert_eq!(InventoryError::ContainerNotFound.http_status_code(), 404);
        assert_eq!(InventoryError::HostNotFound.http_status_code(), 404);
        assert_eq!(
            InventoryError::ContainerRepositoryEmpty.http_status_code(),
            424
        );
        assert_eq!(InventoryError::HostRepositoryEmpty.http_status_code(), 424);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            InventoryError::ContainerNotFound.to_string(),
            "container not found"
        );
        assert_eq!(
            InventoryError::ContainerRepositoryEmpty.to_string(),
            "container repository is empty"
        );
        assert_eq!(InventoryError::HostNotFound.to_string(), "host not found");
        assert_eq!(
            InventoryError::HostRepositoryEmpty.to_string(),
            "host repository is empty"
        );
    }
}
