/*
 * Responsibility
 * - Health probe for a Postgres pool: acquire one connection, release it, report
 * - Per-variant (app DB, warehouse, ...) success / failure messages
 *
 * Notes
 * - A failed connection is a *report*, not an error: callers decide the HTTP status
 * - An unknown variant is a wiring mistake and fails at construction
 */
use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantMessages {
    pub success: String,
    pub failure: String,
}

impl VariantMessages {
    pub fn new(success: impl Into<String>, failure: impl Into<String>) -> Self {
        Self {
            success: success.into(),
            failure: failure.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectionTesterError {
    #[error("no messages configured for database variant {0:?}")]
    UnknownVariant(String),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConnectionTestReport {
    pub success: bool,
    pub error: Option<String>,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct DatabaseConnectionTester {
    pool: PgPool,
    variant: String,
    messages: VariantMessages,
}

impl DatabaseConnectionTester {
    pub fn new(
        pool: PgPool,
        variant: impl Into<String>,
        mut variant_messages: HashMap<String, VariantMessages>,
    ) -> Result<Self, ConnectionTesterError> {
        let variant = variant.into();
        let messages = variant_messages
            .remove(&variant)
            .ok_or_else(|| ConnectionTesterError::UnknownVariant(variant.clone()))?;

        Ok(Self {
            pool,
            variant,
            messages,
        })
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub async fn test(&self) -> ConnectionTestReport {
        match self.pool.acquire().await {
            Ok(conn) => {
                // back to the pool right away
                drop(conn);
                ConnectionTestReport {
                    success: true,
                    error: None,
                    message: self.messages.success.clone(),
                }
            }
            Err(e) => {
                tracing::warn!(
                    variant = %self.variant,
                    error = ?e,
                    "database connection test failed"
                );
                ConnectionTestReport {
                    success: false,
                    error: Some(e.to_string()),
                    message: self.messages.failure.clone(),
                }
            }
        }
    }
}

/// Messages for the variants the server knows about out of the box.
pub fn default_variant_messages() -> HashMap<String, VariantMessages> {
    HashMap::from([
        (
            "app".to_string(),
            VariantMessages::new(
                "App database connection can be established",
                "Failed to connect to app database",
            ),
        ),
        (
            "data_warehouse".to_string(),
            VariantMessages::new(
                "Data warehouse database connection can be established",
                "Failed to connect to data warehouse database",
            ),
        ),
    ])
}
