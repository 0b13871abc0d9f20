/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - db: connection tester for the health check (None when DATABASE_URL is unset)
 *   - events: process-wide event bus
 * - Cheap to Clone (Arc / pool handles inside)
 */
use crate::db::DatabaseConnectionTester;
use crate::plugins::event_bus::EventBus;

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub db: Option<DatabaseConnectionTester>,
    pub events: EventBus,
}

impl AppState {
    pub fn new(db: Option<DatabaseConnectionTester>, events: EventBus) -> Self {
        Self { db, events }
    }
}
