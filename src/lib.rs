/*
 * Responsibility
 * - Public surface of the kit: error taxonomy, assertion helpers, schemas,
 *   auth / route / event-bus plugins, DB connection tester, response wrapper
 * - The bundled server (app / config / state / api / services / middleware)
 *   is built on the same modules
 */
pub mod api;
pub mod app;
pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod events;
pub mod middleware;
pub mod plugins;
pub mod schemas;
pub mod services;
pub mod state;

pub use error::{AppError, BoxError, ErrorKind};
