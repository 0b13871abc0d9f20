/*
 * Responsibility
 * - Configuration-backed UserLookup for the bundled server (api keys only)
 * - Real deployments plug in their own lookup (DB / IdP); this one never verifies tokens
 */
use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;

use crate::error::BoxError;
use crate::plugins::auth::{AuthMethod, CredentialValue, RequestUser, UserLookup};

#[derive(Debug, Clone, Default)]
pub struct StaticApiKeyLookup {
    // api key -> user id
    keys: HashMap<String, String>,
}

impl StaticApiKeyLookup {
    pub fn new(keys: HashMap<String, String>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl UserLookup for StaticApiKeyLookup {
    type User = RequestUser;

    async fn lookup(
        &self,
        method: AuthMethod,
        value: &CredentialValue,
        _options: Option<&Value>,
    ) -> Result<RequestUser, BoxError> {
        if method != AuthMethod::XApiKey {
            return Err(anyhow!("authentication method {method} is not supported").into());
        }

        let key = value
            .as_token()
            .ok_or_else(|| anyhow!("api key credential without a token"))?;

        let user_id = self
            .keys
            .get(key)
            .ok_or_else(|| anyhow!("unknown api key"))?;

        Ok(RequestUser::new(user_id.as_str()).with_field("method", method.as_str()))
    }
}
