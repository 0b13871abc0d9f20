use axum::{extract::FromRequestParts, http::request::Parts};

use super::lookup::RequestUser;
use crate::error::{AppError, ErrorKind};

/// Handler-side access to the identity the resolver attached.
///
/// Only meaningful on routes registered with `RouteOptions::authenticated()`;
/// elsewhere nothing is attached and the extractor rejects with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser<U = RequestUser>(pub U);

impl<S, U> FromRequestParts<S> for CurrentUser<U>
where
    S: Send + Sync,
    U: Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<U>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::from_kind(ErrorKind::Authentication))
    }
}
