/*
 * Responsibility
 * - v1 URL structure
 * - Which routes require authentication is decided here (RouteOptions::authenticated)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    api::v1::handlers::{health::health, me::me, pings::create_ping},
    plugins::{
        auth::{AuthPlugin, RequestUser, UserLookup},
        route::{RouteOptions, RouteRegistry},
    },
    state::AppState,
};

pub fn routes<L>(auth: AuthPlugin<L>) -> Router<AppState>
where
    L: UserLookup<User = RequestUser>,
{
    RouteRegistry::new()
        .hook(auth)
        .route("/health", get(health), RouteOptions::new())
        .route("/me", get(me), RouteOptions::new().authenticated())
        .route("/pings", post(create_ping), RouteOptions::new().authenticated())
        .into_router()
}
