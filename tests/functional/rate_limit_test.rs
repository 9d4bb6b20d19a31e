//! Functional tests for rate limiting

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use print_asset_pipeline::middleware::rate_limit::RateLimitLayer;
use tower::ServiceExt;

fn create_test_app(rps: u32, burst: u32) -> Router {
    Router::new()
        .route("/api/generate", axum::routing::post(|| async { "OK" }))
        .route("/health", axum::routing::get(|| async { "healthy" }))
        .layer(RateLimitLayer::new(rps, burst))
}

fn generate_request() -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/generate")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_rate_limit_allows_within_limit() {
    let app = create_test_app(100, 100);

    let response = app.oneshot(generate_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_exceeded() {
    let app = create_test_app(1, 1);

    let response = app.clone().oneshot(generate_request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut limited = None;
    for _ in 0..10 {
        let response = app.clone().oneshot(generate_request()).await.unwrap();
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            limited = Some(response);
            break;
        }
    }

    let response = limited.expect("Expected rate limiting to kick in");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "rate_limit_exceeded");
}

#[tokio::test]
async fn test_rate_limit_health_bypass() {
    let app = create_test_app(1, 1);

    // Exhaust the quota first
    let _ = app.clone().oneshot(generate_request()).await.unwrap();

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_rate_limit_options_bypass() {
    let app = Router::new()
        .route(
            "/api/generate",
            axum::routing::post(|| async { "OK" }).options(|| async { StatusCode::OK }),
        )
        .layer(RateLimitLayer::new(1, 1));

    let _ = app.clone().oneshot(generate_request()).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/generate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_burst_capacity() {
    let app = create_test_app(1, 5);

    for _ in 0..5 {
        let response = app.clone().oneshot(generate_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
