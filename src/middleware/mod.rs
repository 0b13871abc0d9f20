/*
 * Responsibility
 * - Router-level middleware (transport concerns, not authentication)
 * - Authentication is a per-route pre-handler: see plugins::auth
 */
pub mod cors;
pub mod http;
