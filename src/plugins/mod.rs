/*
 * Responsibility
 * - Plugins that plug into route registration or application state
 *   - route: ordered pre-handler chains + registration hooks
 *   - auth: credential resolution as a pre-handler
 *   - event_bus: typed process-wide event broadcast
 */
pub mod auth;
pub mod event_bus;
pub mod route;
