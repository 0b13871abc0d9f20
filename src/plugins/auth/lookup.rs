/*
 * Responsibility
 * - Contract between the resolver and the embedding application's user store
 * - Default identity type (RequestUser)
 * - Closure adapter so an `async fn`/closure can be used as the lookup
 */
use std::future::Future;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::credential::{AuthMethod, CredentialValue};
use crate::error::BoxError;

/// Authenticated identity attached to the request.
///
/// Only `id` is required; whatever else the lookup knows goes into `extra`
/// and is flattened when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestUser {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Resolves a detected credential to an identity.
///
/// This is the only source of identity truth: the resolver never verifies
/// tokens or passwords itself. Any error is reported to the client as an
/// authentication failure; the error itself is kept as cause for logs.
#[async_trait]
pub trait UserLookup: Send + Sync + 'static {
    type User: Clone + Send + Sync + 'static;

    async fn lookup(
        &self,
        method: AuthMethod,
        value: &CredentialValue,
        options: Option<&Value>,
    ) -> Result<Self::User, BoxError>;
}

/// Adapter returned by [`lookup_fn`].
#[derive(Clone)]
pub struct FnLookup<F>(F);

/// Wraps `Fn(method, value, options) -> Future<Output = Result<User, E>>` as a [`UserLookup`].
///
/// ```ignore
/// let lookup = lookup_fn(|method, value, _options| async move {
///     match (method, value.as_token()) {
///         (AuthMethod::XApiKey, Some("k1")) => Ok(RequestUser::new("u1")),
///         _ => Err(anyhow::anyhow!("unknown credential")),
///     }
/// });
/// ```
pub fn lookup_fn<F, Fut, U, E>(f: F) -> FnLookup<F>
where
    F: Fn(AuthMethod, CredentialValue, Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<U, E>> + Send + 'static,
    U: Clone + Send + Sync + 'static,
    E: Into<BoxError> + 'static,
{
    FnLookup(f)
}

#[async_trait]
impl<F, Fut, U, E> UserLookup for FnLookup<F>
where
    F: Fn(AuthMethod, CredentialValue, Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<U, E>> + Send + 'static,
    U: Clone + Send + Sync + 'static,
    E: Into<BoxError> + 'static,
{
    type User = U;

    async fn lookup(
        &self,
        method: AuthMethod,
        value: &CredentialValue,
        options: Option<&Value>,
    ) -> Result<U, BoxError> {
        (self.0)(method, value.clone(), options.cloned())
            .await
            .map_err(Into::into)
    }
}
