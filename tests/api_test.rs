//! End-to-end behavior of the HTTP surface against a mock upstream.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::util::ServiceExt;
use wallfeed::aggregator::Aggregator;
use wallfeed::config::FeedConfig;
use wallfeed::server::{router, AppState};
use wallfeed::source::SourceAdapter;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_for(server: &MockServer) -> axum::Router {
    let config = FeedConfig {
        static_base: format!("{}/static?query=", server.uri()),
        video_base: format!("{}/video?q=", server.uri()),
        ..FeedConfig::default()
    };
    let http = reqwest::Client::new();
    let aggregator = Arc::new(Aggregator::new(SourceAdapter::new(http.clone()), config));
    router(AppState { aggregator, http })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn feed_query_returns_normalized_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/static"))
        .and(query_param("query", "nature"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"results":[{"id":"a","thumb":"u1"}]}"#),
        )
        .mount(&server)
        .await;

    let response = app_for(&server)
        .oneshot(
            Request::builder()
                .uri("/api/feed?q=nature&page=1&source=static")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert!(data[0]["id"].as_str().unwrap().starts_with("a_"));
    assert_eq!(data[0]["thumbnail"], "u1");
    assert_eq!(data[0]["full"], "u1");
    assert!(data[0].get("video").is_none());
}

#[tokio::test]
async fn feed_accepts_query_alias_and_tolerates_bad_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/static"))
        .and(query_param("query", "cars"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id":"c","url":"u"}]"#))
        .mount(&server)
        .await;

    let response = app_for(&server)
        .oneshot(
            Request::builder()
                .uri("/api/feed?query=cars&page=zero")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn feed_routes_video_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/video"))
        .and(query_param("q", "rain"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"results":[{"id":"v","mp4":"clip.mp4"}]}"#),
        )
        .mount(&server)
        .await;

    let response = app_for(&server)
        .oneshot(
            Request::builder()
                .uri("/api/feed?q=rain&source=video")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["video"], "clip.mp4");
}

#[tokio::test]
async fn feed_without_query_serves_random_home_mix() {
    let server = MockServer::start().await;
    // Every topic resolves to the same two records; the endpoint merges
    // without dedup (that belongs to the pagination layer).
    Mock::given(method("GET"))
        .and(path("/static"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"results":[{"id":"a","url":"u"},{"id":"b","url":"u"}]}"#),
        )
        .mount(&server)
        .await;

    let response = app_for(&server)
        .oneshot(Request::builder().uri("/api/feed").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    let fanout = FeedConfig::default().fanout;
    assert_eq!(json["data"].as_array().unwrap().len(), 2 * fanout);
}

#[tokio::test]
async fn download_requires_url_parameter() {
    let server = MockServer::start().await;
    let response = app_for(&server)
        .oneshot(Request::builder().uri("/api/download").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_streams_bytes_with_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![1u8, 2, 3])
                .insert_header("content-type", "image/png"),
        )
        .mount(&server)
        .await;

    let target = format!("{}/img.png", server.uri());
    let uri = format!("/api/download?url={}", urlencoding::encode(&target));
    let response = app_for(&server)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap().to_str().unwrap(),
        "image/png"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), &[1u8, 2, 3]);
}

#[tokio::test]
async fn download_failure_maps_to_500() {
    let server = MockServer::start().await;
    let uri = format!(
        "/api/download?url={}",
        urlencoding::encode("http://127.0.0.1:1/gone.png")
    );
    let response = app_for(&server)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
