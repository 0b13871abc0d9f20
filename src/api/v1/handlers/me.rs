/*
 * Responsibility
 * - GET /me: echo the identity the auth plugin attached
 */
use axum::Json;

use crate::plugins::auth::{CurrentUser, RequestUser};

pub async fn me(CurrentUser(user): CurrentUser) -> Json<RequestUser> {
    Json(user)
}
