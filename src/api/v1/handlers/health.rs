/*
 * Responsibility
 * - GET /health (liveness + database reachability)
 * - Public route: never goes through the auth pre-handler
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let Some(tester) = &state.db else {
        return (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "not configured" })),
        );
    };

    let report = tester.test().await;
    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if report.success { "ok" } else { "degraded" },
            "database": {
                "variant": tester.variant(),
                "success": report.success,
                "message": report.message,
            },
        })),
    )
}
