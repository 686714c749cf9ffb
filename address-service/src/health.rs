//! Health check handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::repository::Repository;
use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service name
    pub service: String,

    /// Version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Readiness check response with dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,

    /// Service name
    pub service: String,

    /// Dependency statuses
    pub dependencies: HashMap<String, DependencyStatus>,
}

/// Individual dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct DependencyStatus {
    /// Dependency is healthy
    pub healthy: bool,

    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Simple health check (liveness probe)
///
/// Always returns 200 OK if the service is running.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: state.config().service.name.clone(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check (readiness probe)
///
/// Returns 200 OK when the `Addresses` table can be counted, 503 otherwise.
/// The geocoding service is not probed; a distance request is the only
/// thing that depends on it.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let mut dependencies = HashMap::new();
    let mut all_ready = true;

    match state.addresses().count().await {
        Ok(count) => {
            dependencies.insert(
                "database".to_string(),
                DependencyStatus {
                    healthy: true,
                    message: Some(format!("Connected ({} addresses)", count)),
                },
            );
        }
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            all_ready = false;
            dependencies.insert(
                "database".to_string(),
                DependencyStatus {
                    healthy: false,
                    message: Some(format!("Connection failed: {}", e)),
                },
            );
        }
    }

    let response = ReadinessResponse {
        ready: all_ready,
        service: state.config().service.name.clone(),
        dependencies,
    };

    let status = if all_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DatabaseConfig};
    use axum::body::to_bytes;

    async fn state() -> AppState {
        let config = Config {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        AppState::builder()
            .config(config)
            .without_tracing()
            .build()
            .await
            .unwrap()
    }

    #[test]
    fn test_health_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            service: "address-service".to_string(),
            version: Some("0.1.0".to_string()),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_with_open_pool() {
        let response = readiness(State(state().await)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ReadinessResponse = serde_json::from_slice(&body).unwrap();
        assert!(body.ready);
        assert!(body.dependencies["database"].healthy);
        assert_eq!(
            body.dependencies["database"].message.as_deref(),
            Some("Connected (0 addresses)")
        );
    }

    #[tokio::test]
    async fn test_readiness_with_closed_pool() {
        let state = state().await;
        state.db().close().await;

        let response = readiness(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
