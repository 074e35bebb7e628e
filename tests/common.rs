//! Shared helpers for integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset of helpers")]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_util::{AnyError, TestApp};
use tower::ServiceExt;

/// Build a [`TestApp`], or `None` when the backend prerequisites are missing.
///
/// `SQLite` runs always. PostgreSQL runs only when `POSTGRES_TEST_URL` names
/// a scratch database.
///
/// # Errors
///
/// Returns any error raised while preparing an available database.
pub async fn app_or_skip() -> Result<Option<TestApp>, AnyError> {
    #[cfg(feature = "postgres")]
    if std::env::var_os("POSTGRES_TEST_URL").is_none() {
        tracing::warn!("skipping test: POSTGRES_TEST_URL is not set");
        return Ok(None);
    }
    TestApp::new().await.map(Some)
}

/// Send `request` through `router` and decode the JSON body.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

/// POST `body` as JSON to `path`.
pub async fn post_json(router: Router, path: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");
    send(router, request).await
}

/// Run a GraphQL operation and return the whole response document.
pub async fn graphql(router: Router, query: &str, variables: Value) -> Value {
    let (status, body) = post_json(
        router,
        "/graphql",
        &json!({"query": query, "variables": variables}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "graphql transport failed: {body}");
    body
}

/// `extensions.code` of the first error in a GraphQL response.
pub fn first_error_code(response: &Value) -> Option<&str> {
    response["errors"][0]["extensions"]["code"].as_str()
}
