/*
 * Responsibility
 * - Credential model (method tag + value)
 * - Detection over headers / cookies / body in fixed priority order, first match wins
 *
 * Notes
 * - Pure function over borrowed request data: no I/O, no lookup here
 * - Empty values count as absent (an empty api key never shadows a bearer token)
 */
use std::{collections::HashMap, fmt};

use axum::http::{HeaderMap, header};
use serde::Serialize;
use serde_json::Value;

use super::options::AuthOptions;

pub const API_KEY_HEADER: &str = "x-api-key";
const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthMethod {
    XApiKey,
    Bearer,
    CookieJwt,
    EmailPassword,
}

impl AuthMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthMethod::XApiKey => "xApiKey",
            AuthMethod::Bearer => "bearer",
            AuthMethod::CookieJwt => "cookieJwt",
            AuthMethod::EmailPassword => "emailPassword",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CredentialValue {
    Token(String),
    EmailPassword { email: String, password: String },
}

impl CredentialValue {
    pub fn as_token(&self) -> Option<&str> {
        match self {
            CredentialValue::Token(token) => Some(token),
            CredentialValue::EmailPassword { .. } => None,
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for CredentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialValue::Token(_) => f.debug_tuple("Token").field(&"***").finish(),
            CredentialValue::EmailPassword { email, .. } => f
                .debug_struct("EmailPassword")
                .field("email", email)
                .field("password", &"***")
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    method: AuthMethod,
    value: CredentialValue,
}

impl Credential {
    pub fn api_key(key: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::XApiKey,
            value: CredentialValue::Token(key.into()),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::Bearer,
            value: CredentialValue::Token(token.into()),
        }
    }

    pub fn cookie_jwt(token: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::CookieJwt,
            value: CredentialValue::Token(token.into()),
        }
    }

    pub fn email_password(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::EmailPassword,
            value: CredentialValue::EmailPassword {
                email: email.into(),
                password: password.into(),
            },
        }
    }

    pub fn method(&self) -> AuthMethod {
        self.method
    }

    pub fn value(&self) -> &CredentialValue {
        &self.value
    }
}

/// Picks the single credential a request carries, or `None`.
///
/// Order: `x-api-key` > `Authorization: Bearer` > session cookie > email/password body fields.
pub fn detect_credential(
    headers: &HeaderMap,
    cookies: &HashMap<String, String>,
    body: &Value,
    options: &AuthOptions,
) -> Option<Credential> {
    // HeaderMap::get returns the first value when the header is repeated
    if let Some(key) = header_str(headers, API_KEY_HEADER) {
        return Some(Credential::api_key(key));
    }

    if let Some(token) = header_str(headers, header::AUTHORIZATION.as_str())
        .and_then(|auth| auth.strip_prefix(BEARER_PREFIX))
    {
        return Some(Credential::bearer(token));
    }

    if let Some(jwt) = cookies
        .get(&options.jwt_cookie_name)
        .filter(|v| !v.is_empty())
    {
        return Some(Credential::cookie_jwt(jwt.as_str()));
    }

    let email = body_str(body, &options.email_field)?;
    let password = body_str(body, &options.password_field)?;
    Some(Credential::email_password(email, password))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn body_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
}
