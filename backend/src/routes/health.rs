//! Health check endpoints
//!
//! - /health - Basic health check
//! - /health/ready - Readiness probe (checks the user store)
//! - /health/live - Liveness probe

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

/// Individual health checks
#[derive(Serialize)]
pub struct HealthChecks {
    pub user_store: CheckStatus,
}

/// Status of an individual check
#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn status(status: &str) -> HealthResponse {
    HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
    }
}

/// Basic health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(status("healthy"))
}

/// Readiness probe. 503 while the user store is unreachable.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store_check = match state.users().ping().await {
        Ok(()) => CheckStatus {
            status: "healthy".to_string(),
            message: None,
        },
        Err(e) => CheckStatus {
            status: "unhealthy".to_string(),
            message: Some(e.to_string()),
        },
    };

    let is_healthy = store_check.status == "healthy";
    let response = HealthResponse {
        checks: Some(HealthChecks {
            user_store: store_check,
        }),
        ..status(if is_healthy { "ready" } else { "not_ready" })
    };

    if is_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Liveness probe
pub async fn liveness_check() -> Json<HealthResponse> {
    Json(status("alive"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::repositories::MemoryUserStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_check_returns_healthy() {
        let response = health_check().await;
        assert_eq!(response.status, "healthy");
        assert!(!response.version.is_empty());
    }

    #[tokio::test]
    async fn test_liveness_check_returns_alive() {
        let response = liveness_check().await;
        assert_eq!(response.status, "alive");
    }

    #[tokio::test]
    async fn test_readiness_with_reachable_store() {
        let state = AppState::new(Arc::new(MemoryUserStore::new()), AppConfig::default());

        let response = readiness_check(State(state)).await.ok().unwrap();

        assert_eq!(response.status, "ready");
        let checks = response.0.checks.as_ref().unwrap();
        assert_eq!(checks.user_store.status, "healthy");
    }
}
