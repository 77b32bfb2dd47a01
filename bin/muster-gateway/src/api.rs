//! HTTP read API for the container inventory
//!
//! Routes, handlers, and the JSON shapes consumers see. Every lookup is
//! answered from the published cache snapshot; no request waits on the
//! upstream metadata source.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::debug;

use muster_common::{Container, InventoryError};
use muster_inventory::{InventoryService, inventory_metrics};

/// Shared handler state
pub struct AppState {
    pub service: Arc<dyn InventoryService>,
}

/// Single-container response envelope
#[derive(Debug, Serialize)]
struct ContainerEnvelope {
    #[serde(rename = "Container")]
    container: Container,
}

/// Container collection response envelope
#[derive(Debug, Serialize)]
struct ContainersEnvelope {
    #[serde(rename = "Containers")]
    containers: Vec<Container>,
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorBody {
    #[serde(rename = "Error")]
    error: String,
}

fn error_response(err: &InventoryError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// Build the gateway router with inventory routes under `base_path`
pub fn router(base_path: &str, state: Arc<AppState>) -> Router {
    let inventory = Router::new()
        .route("/containers", get(list_containers))
        .route("/containers/{name}", get(get_container));

    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_check));

    let base = normalize_base_path(base_path);
    let app = if base == "/" {
        app.merge(inventory)
    } else {
        app.nest(&base, inventory)
    };

    app.fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Force a leading slash and drop any trailing one
fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// GET {base}/containers
async fn list_containers(State(state): State<Arc<AppState>>) -> Response {
    match state.service.containers() {
        Ok(containers) => {
            let containers = containers.iter().map(|c| Container::clone(c)).collect();
            (StatusCode::OK, Json(ContainersEnvelope { containers })).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET {base}/containers/{name}
async fn get_container(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    match state.service.container(&name) {
        Ok(container) => (
            StatusCode::OK,
            Json(ContainerEnvelope {
                container: Container::clone(&container),
            }),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Liveness probe
async fn health_check() -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(concat!(
            r#"{"status":"healthy","service":"muster-gateway","version":""#,
            env!("CARGO_PKG_VERSION"),
            r#""}"#
        )))
        .unwrap()
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = inventory_metrics().export_prometheus();
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// Unmatched routes answer with the standard error body
async fn not_found(uri: Uri) -> Response {
    debug!("no route matches {}", uri.path());
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "not found".to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::Request;
    use muster_common::{HostId, InventoryResult};
    use tower::ServiceExt;

    fn sample_container() -> Container {
        Container {
            name: "web_1".to_string(),
            state: "running".to_string(),
            private_ip: "10.42.0.7".to_string(),
            service_index: 1,
            host_id: HostId::from("H1"),
            host_name: "host-1".to_string(),
        }
    }

    struct PopulatedService;

    impl InventoryService for PopulatedService {
        fn container(&self, name: &str) -> InventoryResult<Arc<Container>> {
            if name == "web_1" {
                Ok(Arc::new(sample_container()))
            } else {
                Err(InventoryError::ContainerNotFound)
            }
        }

        fn containers(&self) -> InventoryResult<Vec<Arc<Container>>> {
            Ok(vec![Arc::new(sample_container())])
        }
    }

    struct EmptyService;

    impl InventoryService for EmptyService {
        fn container(&self, _name: &str) -> InventoryResult<Arc<Container>> {
            Err(InventoryError::ContainerRepositoryEmpty)
        }

        fn containers(&self) -> InventoryResult<Vec<Arc<Container>>> {
            Err(InventoryError::ContainerRepositoryEmpty)
        }
    }

    fn app(service: impl InventoryService + 'static) -> Router {
        router(
            "/muster/v1",
            Arc::new(AppState {
                service: Arc::new(service),
            }),
        )
    }

    async fn get_json(app: Router, path: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap();
        (status, value)
    }

    #[tokio::test]
    async fn test_get_container() {
        let (status, body) = get_json(app(PopulatedService), "/muster/v1/containers/web_1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Container"]["Name"], "web_1");
        assert_eq!(body["Container"]["HostName"], "host-1");
        assert_eq!(body["Container"]["PrivateIP"], "10.42.0.7");
    }

    #[tokio::test]
    async fn test_get_container_not_found() {
        let (status, body) = get_json(app(PopulatedService), "/muster/v1/containers/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["Error"], "container not found");
    }

    #[tokio::test]
    async fn test_list_containers() {
        let (status, body) = get_json(app(PopulatedService), "/muster/v1/containers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Containers"].as_array().unwrap().len(), 1);
        assert_eq!(body["Containers"][0]["State"], "running");
    }

    #[tokio::test]
    async fn test_empty_repository_is_failed_dependency() {
        let (status, body) = get_json(app(EmptyService), "/muster/v1/containers").await;
        assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
        assert_eq!(body["Error"], "container repository is empty");

        let (status, _) = get_json(app(EmptyService), "/muster/v1/containers/web_1").await;
        assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
    }

    #[tokio::test]
    async fn test_unmatched_route() {
        let (status, body) = get_json(app(PopulatedService), "/somewhere/else").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["Error"], "not found");
    }

    #[tokio::test]
    async fn test_root_base_path() {
        let router = router(
            "/",
            Arc::new(AppState {
                service: Arc::new(PopulatedService),
            }),
        );
        let (status, body) = get_json(router, "/containers/web_1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Container"]["Name"], "web_1");
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(app(PopulatedService), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let response = app(PopulatedService)
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/plain"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("muster_gateway_uptime_seconds"));
    }
}
