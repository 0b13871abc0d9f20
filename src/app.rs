/*
 * Responsibility
 * - tracing / panic hook setup
 * - Config -> dependencies (pool, connection tester, event bus, auth plugin) -> Router
 * - Router-level middleware (HTTP, CORS)
 * - axum::serve()
 */
use std::{panic, process};

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    db::{DatabaseConnectionTester, default_variant_messages},
    error::AppError,
    events::UserPinged,
    middleware,
    plugins::{
        auth::{AuthConfig, AuthPlugin, RequestUser, UserLookup},
        event_bus::EventBus,
    },
    services::StaticApiKeyLookup,
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG wins when set, e.g. RUST_LOG=info,server_kit=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash loudly; production: default hook, keep serving
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting server in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let auth = AuthPlugin::new(
        AuthConfig::new(StaticApiKeyLookup::new(config.static_api_keys.clone()))
            .with_options(config.auth.clone()),
    );

    let app = build_router(state, auth, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(config: &Config) -> Result<AppState, AppError> {
    let db = match &config.database_url {
        Some(url) => {
            // lazy: the server starts even when the database is down; /health reports it
            let pool = PgPoolOptions::new().max_connections(5).connect_lazy(url)?;
            let tester = DatabaseConnectionTester::new(
                pool,
                config.database_variant.as_str(),
                default_variant_messages(),
            )?;
            Some(tester)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; database health check disabled");
            None
        }
    };

    let events = EventBus::default();
    events.on(|e: UserPinged| {
        tracing::info!(user_id = %e.user_id, message = %e.message, at = %e.at, "user pinged");
    });

    Ok(AppState::new(db, events))
}

pub fn build_router<L>(state: AppState, auth: AuthPlugin<L>, config: &Config) -> Router
where
    L: UserLookup<User = RequestUser>,
{
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(auth))
        .with_state(state);

    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
