//! HTTP client for the orchestrator metadata source
//!
//! The source offers no query capability beyond "give me everything": one
//! GET per entity kind, returning the complete collection as JSON. Both
//! fetches are side-effect-free and carry their own request timeout.
//! Retry and backoff policy deliberately does not live here.

use std::time::Duration;

use async_trait::async_trait;
use muster_common::{Container, Host, MetadataConfig};

use crate::error::{SourceError, SourceResult};
use crate::wire::{WireContainer, WireHost};

/// Subpath of the container collection
pub const CONTAINERS_SUBPATH: &str = "/containers";
/// Subpath of the host collection
pub const HOSTS_SUBPATH: &str = "/hosts";

/// Port to the remote metadata source.
///
/// The cache and its decorators only ever see this trait, so transports can
/// be swapped and cross-cutting concerns layered without touching either.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch the full container collection
    async fn fetch_containers(&self) -> SourceResult<Vec<Container>>;

    /// Fetch the full host collection
    async fn fetch_hosts(&self) -> SourceResult<Vec<Host>>;
}

/// HTTP implementation of [`MetadataSource`]
#[derive(Debug)]
pub struct MetadataHttpClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl MetadataHttpClient {
    /// Create a new client against the configured base address
    pub fn new(config: &MetadataConfig) -> Result<Self, SourceError> {
        if config.endpoint.trim().is_empty() {
            return Err(SourceError::InvalidEndpoint(
                "endpoint must not be empty".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| SourceError::InvalidEndpoint(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url(),
            http_client,
        })
    }

    /// The normalized base URL fetches are issued against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_collection<T>(&self, subpath: &str) -> SourceResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, subpath);

        let response = self
            .http_client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout
                } else {
                    SourceError::Unavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::from_status(status, body));
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MetadataSource for MetadataHttpClient {
    async fn fetch_containers(&self) -> SourceResult<Vec<Container>> {
        let wire = self
            .fetch_collection::<WireContainer>(CONTAINERS_SUBPATH)
            .await?;
        Ok(wire.into_iter().map(Container::from).collect())
    }

    async fn fetch_hosts(&self) -> SourceResult<Vec<Host>> {
        let wire = self.fetch_collection::<WireHost>(HOSTS_SUBPATH).await?;
        Ok(wire.into_iter().map(Host::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;

    fn config_for(endpoint: String) -> MetadataConfig {
        MetadataConfig {
            endpoint,
            refresh_interval_secs: 300,
            fetch_timeout_secs: 2,
        }
    }

    async fn serve_fixture(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn containers_fixture() -> impl IntoResponse {
        (
            [(header::CONTENT_TYPE, "application/json")],
            r#"[
                {"name":"web_1","state":"running","primary_ip":"10.42.0.7",
                 "service_index":"1","host_uuid":"H1"},
                {"name":"db_1","state":"stopped","primary_ip":"10.42.0.9"}
            ]"#,
        )
    }

    async fn hosts_fixture() -> impl IntoResponse {
        (
            [(header::CONTENT_TYPE, "application/json")],
            r#"[{"uuid":"H1","name":"host-1"}]"#,
        )
    }

    #[test]
    fn test_rejects_empty_endpoint() {
        let err = MetadataHttpClient::new(&config_for(String::new())).unwrap_err();
        assert!(matches!(err, SourceError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_base_url_gets_default_scheme() {
        let client = MetadataHttpClient::new(&config_for("metadata.internal/latest".into())).unwrap();
        assert_eq!(client.base_url(), "http://metadata.internal/latest");
    }

    #[tokio::test]
    async fn test_fetch_containers_and_hosts() {
        let base = serve_fixture(
            Router::new()
                .route("/containers", get(containers_fixture))
                .route("/hosts", get(hosts_fixture)),
        )
        .await;
        let client = MetadataHttpClient::new(&config_for(base)).unwrap();

        let containers = client.fetch_containers().await.unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[0].name, "web_1");
        assert_eq!(containers[0].service_index, 1);
        assert_eq!(containers[0].host_id.as_str(), "H1");
        assert!(containers[1].is_orphaned());
        assert!(containers[1].host_id.is_empty());

        let hosts = client.fetch_hosts().await.unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].name, "host-1");
    }

    #[tokio::test]
    async fn test_fetch_empty_collection_succeeds() {
        let base = serve_fixture(Router::new().route(
            "/containers",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], "[]") }),
        ))
        .await;
        let client = MetadataHttpClient::new(&config_for(base)).unwrap();

        let containers = client.fetch_containers().await.unwrap();
        assert!(containers.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let base = serve_fixture(Router::new().route(
            "/hosts",
            get(|| async { (StatusCode::NOT_FOUND, "no such path") }),
        ))
        .await;
        let client = MetadataHttpClient::new(&config_for(base)).unwrap();

        let err = client.fetch_hosts().await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_a_decode_error() {
        let base = serve_fixture(Router::new().route(
            "/containers",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], r#"{"oops":1}"#) }),
        ))
        .await;
        let client = MetadataHttpClient::new(&config_for(base)).unwrap();

        let err = client.fetch_containers().await.unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_source() {
        // Nothing listens on the bound-then-dropped port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = MetadataHttpClient::new(&config_for(format!("http://{addr}"))).unwrap();
        let err = client.fetch_containers().await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Unavailable(_) | SourceError::Timeout
        ));
    }
}
