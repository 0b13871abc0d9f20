/*
 * Responsibility
 * - Closed set of error kinds (ErrorKind) with their HTTP status and default message
 * - A single AppError value carrying kind / message / optional cause
 * - IntoResponse implementation (HTTP status / JSON error body)
 * - Conversion from sqlx / config / io errors used by the server
 */
use std::{fmt, str::FromStr};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::db::ConnectionTesterError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Cast,
    DuplicateKey,
    Authentication,
    Authorization,
    Forbidden,
    Conflict,
    BadRequest,
    Internal,
}

/// Every kind, in declaration order.
pub const ALL_ERROR_KINDS: [ErrorKind; 10] = [
    ErrorKind::Validation,
    ErrorKind::NotFound,
    ErrorKind::Cast,
    ErrorKind::DuplicateKey,
    ErrorKind::Authentication,
    ErrorKind::Authorization,
    ErrorKind::Forbidden,
    ErrorKind::Conflict,
    ErrorKind::BadRequest,
    ErrorKind::Internal,
];

/// Constructor shape returned by [`ErrorKind::constructor`].
///
/// `None` (or an empty string) as message falls back to the kind's default.
pub type ErrorConstructor = fn(Option<String>, Option<BoxError>) -> AppError;

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation
            | ErrorKind::Cast
            | ErrorKind::DuplicateKey
            | ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            // authorization is reported as 401 as well (not 403)
            ErrorKind::Authentication | ErrorKind::Authorization => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Canonical name, also used as the `code` of the JSON error body.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Cast => "CastError",
            ErrorKind::DuplicateKey => "DuplicateKeyError",
            ErrorKind::Authentication => "AuthenticationError",
            ErrorKind::Authorization => "AuthorizationError",
            ErrorKind::Forbidden => "ForbiddenError",
            ErrorKind::Conflict => "ConflictError",
            ErrorKind::BadRequest => "BadRequestError",
            ErrorKind::Internal => "InternalServerError",
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            ErrorKind::Validation => "The input is not valid.",
            ErrorKind::NotFound => "The requested resource was not found.",
            ErrorKind::Cast => "Type casting error.",
            ErrorKind::DuplicateKey => "A resource with that identifier already exists.",
            ErrorKind::Authentication => "Authentication failed.",
            ErrorKind::Authorization => "This action requires authorization.",
            ErrorKind::Forbidden => {
                "You don't have the necessary permissions to perform this action."
            }
            ErrorKind::Conflict => "A conflict occurred.",
            ErrorKind::BadRequest => "Bad request.",
            ErrorKind::Internal => "An unexpected server error occurred.",
        }
    }

    pub fn constructor(self) -> ErrorConstructor {
        match self {
            ErrorKind::Validation => AppError::validation,
            ErrorKind::NotFound => AppError::not_found,
            ErrorKind::Cast => AppError::cast,
            ErrorKind::DuplicateKey => AppError::duplicate_key,
            ErrorKind::Authentication => AppError::authentication,
            ErrorKind::Authorization => AppError::authorization,
            ErrorKind::Forbidden => AppError::forbidden,
            ErrorKind::Conflict => AppError::conflict,
            ErrorKind::BadRequest => AppError::bad_request,
            ErrorKind::Internal => AppError::internal,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown error kind: {0}")]
pub struct UnknownErrorKind(pub String);

impl FromStr for ErrorKind {
    type Err = UnknownErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_ERROR_KINDS
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownErrorKind(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            kind.default_message().to_string()
        } else {
            message
        };

        Self {
            kind,
            message,
            cause: None,
        }
    }

    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_message())
    }

    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    fn build(kind: ErrorKind, message: Option<String>, cause: Option<BoxError>) -> Self {
        Self {
            cause,
            ..Self::new(kind, message.unwrap_or_default())
        }
    }

    pub fn validation(message: Option<String>, cause: Option<BoxError>) -> Self {
        Self::build(ErrorKind::Validation, message, cause)
    }

    pub fn not_found(message: Option<String>, cause: Option<BoxError>) -> Self {
        Self::build(ErrorKind::NotFound, message, cause)
    }

    pub fn cast(message: Option<String>, cause: Option<BoxError>) -> Self {
        Self::build(ErrorKind::Cast, message, cause)
    }

    pub fn duplicate_key(message: Option<String>, cause: Option<BoxError>) -> Self {
        Self::build(ErrorKind::DuplicateKey, message, cause)
    }

    pub fn authentication(message: Option<String>, cause: Option<BoxError>) -> Self {
        Self::build(ErrorKind::Authentication, message, cause)
    }

    pub fn authorization(message: Option<String>, cause: Option<BoxError>) -> Self {
        Self::build(ErrorKind::Authorization, message, cause)
    }

    pub fn forbidden(message: Option<String>, cause: Option<BoxError>) -> Self {
        Self::build(ErrorKind::Forbidden, message, cause)
    }

    pub fn conflict(message: Option<String>, cause: Option<BoxError>) -> Self {
        Self::build(ErrorKind::Conflict, message, cause)
    }

    pub fn bad_request(message: Option<String>, cause: Option<BoxError>) -> Self {
        Self::build(ErrorKind::BadRequest, message, cause)
    }

    pub fn internal(message: Option<String>, cause: Option<BoxError>) -> Self {
        Self::build(ErrorKind::Internal, message, cause)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // The cause is for diagnostics only; it never reaches the response body.
        if status.is_server_error() {
            tracing::error!(kind = %self.kind, cause = ?self.cause, "{}", self.message);
        } else {
            tracing::warn!(kind = %self.kind, cause = ?self.cause, "{}", self.message);
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.kind.name(),
                message: self.message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        let kind = match &e {
            sqlx::Error::RowNotFound => ErrorKind::NotFound,
            // 23505: unique_violation
            sqlx::Error::Database(dbe) if dbe.code().as_deref() == Some("23505") => {
                ErrorKind::DuplicateKey
            }
            _ => ErrorKind::Internal,
        };

        AppError::from_kind(kind).with_cause(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::new(ErrorKind::Internal, e.to_string()).with_cause(e)
    }
}

impl From<UnknownErrorKind> for AppError {
    fn from(e: UnknownErrorKind) -> Self {
        AppError::new(ErrorKind::Internal, e.to_string()).with_cause(e)
    }
}

impl From<ConnectionTesterError> for AppError {
    fn from(e: ConnectionTesterError) -> Self {
        AppError::new(ErrorKind::Internal, e.to_string()).with_cause(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::from_kind(ErrorKind::Internal).with_cause(e)
    }
}
