//! Route registration with ordered pre-handler chains.
//!
//! Responsibility:
//! - `RouteOptions`: per-route flags + the ordered list of pre-handlers
//! - `RouteHook`: runs once per registered route and may rewrite its options
//!   (the auth plugin uses this to put itself in front of the chain)
//! - `RouteRegistry`: applies the hooks, then mounts the route with its chain
//!   as a single `route_layer`
//!
//! Pre-handlers see a buffered view of the request (headers, cookies, JSON body)
//! and may write to its extensions. The original body bytes are handed to the
//! route handler untouched.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Request, State},
    http::{Extensions, HeaderMap, StatusCode, header, request::Parts},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use cookie::Cookie;
use http_body_util::LengthLimitError;
use serde_json::Value;

use crate::error::{AppError, ErrorBody, ErrorKind, ErrorResponse};

/// Upper bound for buffered bodies; matches the HTTP-level body limit.
pub const PRE_HANDLER_BODY_LIMIT: usize = 1024 * 1024;

/// Request as seen by pre-handlers.
#[derive(Debug)]
pub struct PreHandlerRequest {
    parts: Parts,
    cookies: HashMap<String, String>,
    body: Value,
}

impl PreHandlerRequest {
    /// Builds the view from request parts and the raw body.
    ///
    /// - cookies: every `Cookie` header is parsed, the first occurrence of a name wins
    /// - body: parsed only for JSON content types; otherwise (or when malformed) `Value::Null`
    pub fn from_parts(parts: Parts, body: &[u8]) -> Self {
        let cookies = parse_cookies(&parts.headers);
        let body = parse_json_body(&parts.headers, body);

        Self {
            parts,
            cookies,
            body,
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn cookies(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.parts.extensions
    }

    pub fn into_parts(self) -> Parts {
        self.parts
    }
}

fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();

    for raw in headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
    {
        // malformed pairs are skipped, the rest of the header still counts
        for cookie in Cookie::split_parse(raw).flatten() {
            cookies
                .entry(cookie.name().to_string())
                .or_insert_with(|| cookie.value().to_string());
        }
    }

    cookies
}

fn parse_json_body(headers: &HeaderMap, body: &[u8]) -> Value {
    if body.is_empty() || !is_json(headers) {
        return Value::Null;
    }

    serde_json::from_slice(body).unwrap_or(Value::Null)
}

fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// One step that runs before the route handler. Returning `Err` stops the chain
/// and the error becomes the response.
#[async_trait]
pub trait PreHandler: Send + Sync + 'static {
    async fn handle(&self, req: &mut PreHandlerRequest) -> Result<(), AppError>;
}

/// Per-route flags read by hooks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteConfig {
    /// Opt-in: only routes with this flag get the authentication pre-handler.
    pub authenticate: bool,
}

#[derive(Clone, Default)]
pub struct RouteOptions {
    pub config: RouteConfig,
    pub pre_handlers: Vec<Arc<dyn PreHandler>>,
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authenticated(mut self) -> Self {
        self.config.authenticate = true;
        self
    }

    /// Appends a pre-handler; handlers run in insertion order.
    pub fn pre_handler(mut self, handler: impl PreHandler) -> Self {
        self.pre_handlers.push(Arc::new(handler));
        self
    }
}

impl std::fmt::Debug for RouteOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteOptions")
            .field("config", &self.config)
            .field("pre_handlers", &self.pre_handlers.len())
            .finish()
    }
}

/// Invoked once per route at registration time.
pub trait RouteHook: Send + Sync + 'static {
    fn on_route(&self, options: RouteOptions) -> RouteOptions;
}

/// Router builder that runs [`RouteHook`]s on every route it registers.
///
/// ```ignore
/// let routes = RouteRegistry::new()
///     .hook(auth_plugin)
///     .route("/health", get(health), RouteOptions::new())
///     .route("/me", get(me), RouteOptions::new().authenticated())
///     .into_router();
/// ```
pub struct RouteRegistry<S = ()> {
    router: Router<S>,
    hooks: Vec<Arc<dyn RouteHook>>,
}

impl<S> Default for RouteRegistry<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self {
            router: Router::new(),
            hooks: Vec::new(),
        }
    }
}

impl<S> RouteRegistry<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Hooks only see routes registered after them.
    pub fn hook(mut self, hook: impl RouteHook) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn route(
        mut self,
        path: &str,
        method_router: MethodRouter<S>,
        options: RouteOptions,
    ) -> Self {
        let options = self
            .hooks
            .iter()
            .fold(options, |options, hook| hook.on_route(options));

        tracing::debug!(
            path,
            authenticate = options.config.authenticate,
            pre_handlers = options.pre_handlers.len(),
            "route registered"
        );

        let method_router = with_pre_handlers(method_router, options.pre_handlers);
        self.router = self.router.route(path, method_router);
        self
    }

    pub fn into_router(self) -> Router<S> {
        self.router
    }
}

#[derive(Clone)]
struct PreHandlerChain(Arc<[Arc<dyn PreHandler>]>);

fn with_pre_handlers<S>(
    method_router: MethodRouter<S>,
    handlers: Vec<Arc<dyn PreHandler>>,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    if handlers.is_empty() {
        return method_router;
    }

    let chain = PreHandlerChain(handlers.into());
    method_router.route_layer(middleware::from_fn_with_state(chain, run_pre_handlers))
}

async fn run_pre_handlers(
    State(chain): State<PreHandlerChain>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();

    let bytes: Bytes = match axum::body::to_bytes(body, PRE_HANDLER_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) if is_length_limit(&e) => return Ok(payload_too_large()),
        Err(e) => {
            let err = AppError::new(ErrorKind::BadRequest, "request body could not be read");
            return Err(err.with_cause(e));
        }
    };

    let mut pre = PreHandlerRequest::from_parts(parts, &bytes);

    for handler in chain.0.iter() {
        handler.handle(&mut pre).await?;
    }

    let req = Request::from_parts(pre.into_parts(), Body::from(bytes));
    Ok(next.run(req).await)
}

fn is_length_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// 413 in the same JSON shape as [`AppError`]; the size limit is not one of the error kinds.
fn payload_too_large() -> Response {
    tracing::warn!(limit = PRE_HANDLER_BODY_LIMIT, "request body over limit");

    let body = ErrorResponse {
        error: ErrorBody {
            code: "PayloadTooLargeError",
            message: format!("Request body exceeds {PRE_HANDLER_BODY_LIMIT} bytes."),
        },
    };
    (StatusCode::PAYLOAD_TOO_LARGE, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::Request as HttpRequest;
    use serde_json::json;

    use super::*;

    fn pre_request(builder: axum::http::request::Builder, body: &str) -> PreHandlerRequest {
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        PreHandlerRequest::from_parts(parts, body.as_bytes())
    }

    #[test]
    fn cookies_are_collected_from_all_headers() {
        let req = pre_request(
            HttpRequest::builder()
                .header("cookie", "jwt=abc; theme=dark")
                .header("cookie", "jwt=later; lang=en"),
            "",
        );

        assert_eq!(req.cookies().get("jwt").map(String::as_str), Some("abc"));
        assert_eq!(req.cookies().get("theme").map(String::as_str), Some("dark"));
        assert_eq!(req.cookies().get("lang").map(String::as_str), Some("en"));
    }

    #[test]
    fn json_body_is_parsed_for_json_content_types() {
        let req = pre_request(
            HttpRequest::builder().header("content-type", "application/json; charset=utf-8"),
            r#"{"email":"a@example.com"}"#,
        );
        assert_eq!(req.body(), &json!({ "email": "a@example.com" }));

        let req = pre_request(
            HttpRequest::builder().header("content-type", "application/merge-patch+json"),
            r#"{"a":1}"#,
        );
        assert_eq!(req.body(), &json!({ "a": 1 }));
    }

    #[test]
    fn other_or_broken_bodies_become_null() {
        let req = pre_request(
            HttpRequest::builder().header("content-type", "text/plain"),
            r#"{"email":"a@example.com"}"#,
        );
        assert_eq!(req.body(), &Value::Null);

        let req = pre_request(
            HttpRequest::builder().header("content-type", "application/json"),
            "{not json",
        );
        assert_eq!(req.body(), &Value::Null);
    }

    struct Noop;

    #[async_trait]
    impl PreHandler for Noop {
        async fn handle(&self, _req: &mut PreHandlerRequest) -> Result<(), AppError> {
            Ok(())
        }
    }

    struct Prepend;

    impl RouteHook for Prepend {
        fn on_route(&self, mut options: RouteOptions) -> RouteOptions {
            options.pre_handlers.insert(0, Arc::new(Noop));
            options
        }
    }

    #[tokio::test]
    async fn oversized_body_is_413_before_any_pre_handler() {
        use axum::routing::post;
        use tower::ServiceExt;

        struct Reject;

        #[async_trait]
        impl PreHandler for Reject {
            async fn handle(&self, _req: &mut PreHandlerRequest) -> Result<(), AppError> {
                Err(AppError::from_kind(ErrorKind::Authentication))
            }
        }

        let router: Router = RouteRegistry::new()
            .route(
                "/upload",
                post(|| async { "ok" }),
                RouteOptions::new().pre_handler(Reject),
            )
            .into_router();

        let res = router
            .oneshot(
                HttpRequest::post("/upload")
                    .header("content-type", "application/json")
                    .body(Body::from(vec![b' '; PRE_HANDLER_BODY_LIMIT + 1]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "PayloadTooLargeError");
    }

    #[test]
    fn options_builder_keeps_order_and_flag() {
        let options = RouteOptions::new()
            .pre_handler(Noop)
            .pre_handler(Noop)
            .authenticated();

        assert!(options.config.authenticate);
        assert_eq!(options.pre_handlers.len(), 2);

        let options = Prepend.on_route(options);
        assert_eq!(options.pre_handlers.len(), 3);
        assert!(format!("{options:?}").contains("pre_handlers: 3"));
    }
}
