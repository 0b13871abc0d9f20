use async_trait::async_trait;
use serde_json::Value;

use super::{
    credential::{Credential, detect_credential},
    lookup::UserLookup,
    options::AuthOptions,
};
use crate::{
    core::{assert, safe},
    error::{AppError, ErrorKind},
    plugins::route::{PreHandler, PreHandlerRequest},
};

pub const NO_AUTH_METHOD_MESSAGE: &str = "No authentication method found";
pub const LOOKUP_FAILED_MESSAGE: &str = "Failed to get user by auth method";

/// Turns a request into an identity: detect one credential, ask the lookup, attach the result.
///
/// Immutable after construction and shared across requests.
pub struct AuthResolver<L: UserLookup> {
    lookup: L,
    options: AuthOptions,
    lookup_options: Option<Value>,
}

impl<L: UserLookup> AuthResolver<L> {
    pub fn new(lookup: L, options: AuthOptions, lookup_options: Option<Value>) -> Self {
        Self {
            lookup,
            options,
            lookup_options,
        }
    }

    pub fn options(&self) -> &AuthOptions {
        &self.options
    }

    pub fn detect(&self, req: &PreHandlerRequest) -> Option<Credential> {
        detect_credential(req.headers(), req.cookies(), req.body(), &self.options)
    }

    /// Resolves the identity without touching the request.
    ///
    /// Both "no credential" and "lookup failed" come back as `Authentication` (401);
    /// the lookup's own error is only reachable as the cause.
    pub async fn resolve(&self, req: &PreHandlerRequest) -> Result<L::User, AppError> {
        let credential = assert(self.detect(req), NO_AUTH_METHOD_MESSAGE, ErrorKind::Authentication)
            .inspect_err(|_| tracing::debug!("request carries no credential"))?;

        let method = credential.method();
        tracing::debug!(%method, "authentication method detected");

        safe(
            self.lookup
                .lookup(method, credential.value(), self.lookup_options.as_ref()),
            LOOKUP_FAILED_MESSAGE,
            ErrorKind::Authentication,
        )
        .await
        // the cause is logged once, when the error is rendered
        .inspect_err(|_| tracing::debug!(%method, "user lookup failed"))
    }

    /// Resolves and stores the identity in the request extensions.
    pub async fn authenticate(&self, req: &mut PreHandlerRequest) -> Result<(), AppError> {
        let user = self.resolve(req).await?;
        req.extensions_mut().insert(user);
        Ok(())
    }
}

#[async_trait]
impl<L: UserLookup> PreHandler for AuthResolver<L> {
    async fn handle(&self, req: &mut PreHandlerRequest) -> Result<(), AppError> {
        self.authenticate(req).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use axum::{http::Request, response::IntoResponse};
    use serde_json::json;
    use tracing_test::traced_test;

    use super::*;
    use crate::error::BoxError;
    use crate::plugins::auth::{AuthMethod, CredentialValue, RequestUser};

    /// Records calls; accepts api key `k1` and bearer `abc` only.
    #[derive(Clone, Default)]
    struct CountingLookup {
        calls: Arc<AtomicUsize>,
        seen: Arc<std::sync::Mutex<Vec<(AuthMethod, CredentialValue, Option<Value>)>>>,
    }

    #[async_trait]
    impl UserLookup for CountingLookup {
        type User = RequestUser;

        async fn lookup(
            &self,
            method: AuthMethod,
            value: &CredentialValue,
            options: Option<&Value>,
        ) -> Result<RequestUser, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((method, value.clone(), options.cloned()));

            match (method, value.as_token()) {
                (AuthMethod::XApiKey, Some("k1")) => Ok(RequestUser::new("u1")),
                (AuthMethod::Bearer, Some("abc")) => Ok(RequestUser::new("u2")),
                _ => Err("unknown credential".into()),
            }
        }
    }

    fn request(builder: axum::http::request::Builder, body: &str) -> PreHandlerRequest {
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        PreHandlerRequest::from_parts(parts, body.as_bytes())
    }

    #[tokio::test]
    #[traced_test]
    async fn rejected_lookup_warns_once_at_render_time() {
        let resolver = AuthResolver::new(CountingLookup::default(), AuthOptions::default(), None);
        let req = request(Request::builder().header("authorization", "Bearer nope"), "");

        let err = resolver.resolve(&req).await.unwrap_err();
        assert!(!logs_contain("WARN"));

        let _ = err.into_response();
        logs_assert(|lines: &[&str]| {
            let warnings = lines.iter().filter(|line| line.contains("WARN")).count();
            match warnings {
                1 => Ok(()),
                n => Err(format!("expected one warning, got {n}")),
            }
        });
    }

    #[tokio::test]
    async fn api_key_request_gets_user_attached() {
        let lookup = CountingLookup::default();
        let resolver = AuthResolver::new(lookup.clone(), AuthOptions::default(), None);
        let mut req = request(Request::builder().header("x-api-key", "k1"), "{}");

        resolver.authenticate(&mut req).await.unwrap();

        assert_eq!(req.extensions().get::<RequestUser>(), Some(&RequestUser::new("u1")));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_credential_never_calls_lookup() {
        let lookup = CountingLookup::default();
        let resolver = AuthResolver::new(lookup.clone(), AuthOptions::default(), None);
        let mut req = request(Request::builder(), "");

        let err = resolver.authenticate(&mut req).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.status().as_u16(), 401);
        assert_eq!(err.message(), NO_AUTH_METHOD_MESSAGE);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
        assert!(req.extensions().get::<RequestUser>().is_none());
    }

    #[tokio::test]
    async fn lookup_failure_is_wrapped_with_cause() {
        let resolver = AuthResolver::new(CountingLookup::default(), AuthOptions::default(), None);
        let mut req = request(Request::builder().header("authorization", "Bearer nope"), "");

        let err = resolver.authenticate(&mut req).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.message(), LOOKUP_FAILED_MESSAGE);
        assert_eq!(
            err.cause().map(|c| c.to_string()).as_deref(),
            Some("unknown credential")
        );
        assert!(req.extensions().get::<RequestUser>().is_none());
    }

    #[tokio::test]
    async fn lookup_options_and_email_password_are_forwarded() {
        let lookup = CountingLookup::default();
        let options = AuthOptions {
            email_field: "login".to_string(),
            ..AuthOptions::default()
        };
        let resolver =
            AuthResolver::new(lookup.clone(), options, Some(json!({ "tenant": "acme" })));
        let mut req = request(
            Request::builder().header("content-type", "application/json"),
            r#"{"login":"a@example.com","password":"pw"}"#,
        );

        // rejected by the lookup, but what it received is what matters here
        let _ = resolver.authenticate(&mut req).await;

        let seen = lookup.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, AuthMethod::EmailPassword);
        assert_eq!(
            seen[0].1,
            CredentialValue::EmailPassword {
                email: "a@example.com".to_string(),
                password: "pw".to_string(),
            }
        );
        assert_eq!(seen[0].2, Some(json!({ "tenant": "acme" })));
    }

    #[tokio::test]
    async fn cookie_value_reaches_lookup_unmodified() {
        let lookup = CountingLookup::default();
        let resolver = AuthResolver::new(lookup.clone(), AuthOptions::default(), None);
        let req = request(Request::builder().header("cookie", "jwt=a%2Fb.c"), "");

        let _ = resolver.resolve(&req).await;

        let seen = lookup.seen.lock().unwrap();
        assert_eq!(seen[0].0, AuthMethod::CookieJwt);
        assert_eq!(seen[0].1.as_token(), Some("a%2Fb.c"));
    }

    #[tokio::test]
    async fn resolving_twice_is_stable() {
        let resolver = AuthResolver::new(CountingLookup::default(), AuthOptions::default(), None);
        let ok = request(Request::builder().header("authorization", "Bearer abc"), "");
        let bad = request(Request::builder().header("authorization", "Bearer zzz"), "");

        assert_eq!(
            resolver.resolve(&ok).await.unwrap(),
            resolver.resolve(&ok).await.unwrap()
        );

        let first = resolver.resolve(&bad).await.unwrap_err();
        let second = resolver.resolve(&bad).await.unwrap_err();
        assert_eq!(first.kind(), second.kind());
        assert_eq!(first.message(), second.message());
    }
}
