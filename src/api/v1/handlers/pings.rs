/*
 * Responsibility
 * - POST /pings: authenticated write that publishes a UserPinged event
 * - Response goes through the Created envelope (201 + data)
 */
use axum::{Json, extract::State};
use chrono::Utc;

use crate::{
    api::{
        response::Created,
        v1::dto::pings::{PingRequest, PingResponse},
    },
    error::AppError,
    events::UserPinged,
    plugins::auth::CurrentUser,
    state::AppState,
};

const DEFAULT_MESSAGE: &str = "ping";

pub async fn create_ping(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<PingRequest>,
) -> Result<Created<PingResponse>, AppError> {
    req.validate()?;

    let event = UserPinged {
        user_id: user.id,
        message: req.message.unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
        at: Utc::now(),
    };

    let delivered = state.events.emit(event.clone());
    tracing::debug!(user_id = %event.user_id, delivered, "ping published");

    Ok(Created(PingResponse {
        user_id: event.user_id,
        message: event.message,
        at: event.at,
    }))
}
