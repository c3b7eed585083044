//! Health check endpoint.

use axum::{Json, extract::State};
use serde::Serialize;

use bramble_core::Envelope;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub database: &'static str,
    pub allowed_origins: Vec<String>,
}

/// Report service and database health.
///
/// Always returns 200; a broken database is reported in the body so load
/// balancers keep routing while operators see the degradation.
pub async fn health(State(state): State<AppState>) -> Json<Envelope<HealthReport>> {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(state.pool())
        .await
    {
        Ok(_) => "connected",
        Err(err) => {
            tracing::error!(error = %err, "health check database probe failed");
            "unavailable"
        }
    };

    let report = HealthReport {
        status: "ok",
        database,
        allowed_origins: state.config().cors.allowed_origins.clone(),
    };
    Json(Envelope::ok(report))
}
