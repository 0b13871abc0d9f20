/*
 * Responsibility
 * - POST /pings request/response DTO
 * - validate() for format checks (kept next to the type)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::assert_true;
use crate::error::{AppError, ErrorKind};

const MAX_MESSAGE_LEN: usize = 256;

// Unknown fields (e.g. email/password used for authentication) are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PingRequest {
    pub message: Option<String>,
}

impl PingRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(message) = &self.message {
            assert_true(
                !message.trim().is_empty(),
                "message cannot be empty",
                ErrorKind::Validation,
            )?;
            assert_true(
                message.len() <= MAX_MESSAGE_LEN,
                "message must be <= 256 chars",
                ErrorKind::Validation,
            )?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PingResponse {
    pub user_id: String,
    pub message: String,
    pub at: DateTime<Utc>,
}
