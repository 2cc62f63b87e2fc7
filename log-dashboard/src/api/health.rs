//! Liveness endpoint

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{SecondsFormat, Utc};
use tracing::warn;

use crate::api::DashboardState;
use crate::database::DatabaseProvider;
use crate::schema::HealthResponse;

/// Handler for GET /api/health
///
/// Runs `SELECT 1` against the pool. Responds 200 when it succeeds and 503
/// with the failure reason when it does not.
pub async fn health_handler<DB: DatabaseProvider>(
    State(state): State<DashboardState<DB>>,
) -> (StatusCode, Json<HealthResponse>) {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let environment = state.environment.to_string();

    match state.database.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                timestamp,
                database: "connected".to_string(),
                environment,
                error: None,
            }),
        ),
        Err(error) => {
            warn!(error = %error, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    timestamp,
                    database: "disconnected".to_string(),
                    environment,
                    error: Some(error.to_string()),
                }),
            )
        }
    }
}
