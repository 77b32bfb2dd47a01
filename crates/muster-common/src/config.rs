//! Configuration types for Muster
//!
//! This module defines the configuration file structure consumed by the
//! gateway binary. Every value has a default so a partial (or absent) file
//! is valid; CLI flags and environment variables override file values.

use serde::Deserialize;

/// Root configuration for the gateway
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream metadata source configuration
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address for the read API
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Base path the read API is served from
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            base_path: default_base_path(),
        }
    }
}

/// Upstream metadata source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataConfig {
    /// Base address of the metadata source; scheme defaults to http
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Seconds between refresh cycles
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Per-request timeout for metadata fetches, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            refresh_interval_secs: default_refresh_interval_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl MetadataConfig {
    /// Normalized base URL for the metadata source.
    ///
    /// The endpoint is usually configured as a bare `host/path`; the
    /// metadata source speaks plain HTTP unless told otherwise, so a
    /// missing scheme becomes `http://`. Trailing slashes are dropped so
    /// entity subpaths can be appended directly.
    #[must_use]
    pub fn base_url(&self) -> String {
        let trimmed = self.endpoint.trim_end_matches('/');
        if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_base_path() -> String {
    "/muster/v1".to_string()
}

fn default_endpoint() -> String {
    "orchestrator-metadata.internal/latest".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    300
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.server.base_path, "/muster/v1");
        assert_eq!(config.metadata.refresh_interval_secs, 300);
        assert_eq!(config.metadata.fetch_timeout_secs, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_base_url_scheme_defaulting() {
        let mut metadata = MetadataConfig::default();
        assert_eq!(
            metadata.base_url(),
            "http://orchestrator-metadata.internal/latest"
        );

        metadata.endpoint = "https://metadata.example.com/latest".to_string();
        assert_eq!(metadata.base_url(), "https://metadata.example.com/latest");

        metadata.endpoint = "metadata.example.com/latest/".to_string();
        assert_eq!(metadata.base_url(), "http://metadata.example.com/latest");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [metadata]
            endpoint = "10.0.0.2:8500/latest"
            refresh_interval_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.metadata.endpoint, "10.0.0.2:8500/latest");
        assert_eq!(config.metadata.refresh_interval_secs, 30);
        assert_eq!(config.metadata.fetch_timeout_secs, 10);
        assert_eq!(config.server.listen, "0.0.0.0:8080");
    }
}
