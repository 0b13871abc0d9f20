//! Transport layers shared by every route.
//!
//! Layers are added innermost first; the last `layer` call sees the request first:
//! request id -> trace span -> timeout -> body limit -> routes.
//!
//! The body limit is the same bound the pre-handler chain buffers with, so a body
//! the auth plugin accepts is never cut short further in.

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::{HeaderName, Request, Response, StatusCode},
};
use tower::{BoxError, ServiceBuilder, timeout::TimeoutLayer};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{Span, field::Empty};

use crate::config::Config;
use crate::plugins::route::PRE_HANDLER_BODY_LIMIT;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn apply(router: Router, config: &Config) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // streaming bodies are cut by tower-http, extractors by axum's own limit
    let router = router
        .layer(RequestBodyLimitLayer::new(PRE_HANDLER_BODY_LIMIT))
        .layer(DefaultBodyLimit::max(PRE_HANDLER_BODY_LIMIT));

    let router = router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(timeout_status))
            .layer(TimeoutLayer::new(config.request_timeout)),
    );

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(request_span)
            .on_response(|res: &Response<Body>, latency: Duration, span: &Span| {
                span.record("status", res.status().as_u16());
                span.record("latency_ms", latency.as_millis() as u64);
            }),
    );

    router
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

async fn timeout_status(err: BoxError) -> StatusCode {
    if err.is::<tower::timeout::error::Elapsed>() {
        StatusCode::REQUEST_TIMEOUT
    } else {
        tracing::error!(error = %err, "unhandled middleware error");
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn request_span(req: &Request<Body>) -> Span {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("n/a");

    tracing::info_span!(
        "http_request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id,
        status = Empty,
        latency_ms = Empty
    )
}

#[cfg(test)]
mod tests {
    use axum::routing::post;
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppEnv;

    fn config() -> Config {
        Config {
            addr: ([127, 0, 0, 1], 0).into(),
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            request_timeout: Duration::from_secs(5),
            database_url: None,
            database_variant: "app".to_string(),
            auth: Default::default(),
            static_api_keys: Default::default(),
        }
    }

    fn app() -> Router {
        let echo = post(|body: String| async move { body });
        apply(Router::new().route("/echo", echo), &config())
    }

    #[tokio::test]
    async fn request_id_is_generated_and_echoed() {
        let res = app()
            .oneshot(Request::post("/echo").body(Body::from("hi")).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(REQUEST_ID_HEADER));

        let res = app()
            .oneshot(
                Request::post("/echo")
                    .header(REQUEST_ID_HEADER, "req-1")
                    .body(Body::from("hi"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.headers()[REQUEST_ID_HEADER], "req-1");
    }

    #[tokio::test]
    async fn oversized_body_is_413() {
        let res = app()
            .oneshot(
                Request::post("/echo")
                    .body(Body::from(vec![b'a'; PRE_HANDLER_BODY_LIMIT + 1]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
