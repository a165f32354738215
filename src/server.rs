//! HTTP surface: the aggregation endpoint and the byte proxy.
//!
//! `/api/feed` answers `{ ok, data, error? }`; upstream trouble never leaks
//! past the adapters, so the 500 path only covers genuine internal failure.
//! `/api/download` is pass-through plumbing with no decision logic.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::aggregator::Aggregator;
use crate::item::{Item, SourceKind};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub http: reqwest::Client,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/feed", get(get_feed))
        .route("/api/download", get(download))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the task is cancelled.
pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(%bind, "serving");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    pub source: Option<String>,
    pub q: Option<String>,
    pub query: Option<String>,
    /// Kept as text and parsed tolerantly; anything unparseable means page 1.
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub ok: bool,
    pub data: Vec<Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn get_feed(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> (StatusCode, Json<FeedResponse>) {
    let source = params
        .source
        .as_deref()
        .map(SourceKind::parse)
        .unwrap_or_default();
    let query = params.q.or(params.query);
    let page = params
        .page
        .as_deref()
        .and_then(|p| p.parse::<u32>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);

    match state.aggregator.aggregate(query.as_deref(), page, source).await {
        Ok(data) => (
            StatusCode::OK,
            Json(FeedResponse { ok: true, data, error: None }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "feed aggregation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FeedResponse { ok: false, data: Vec::new(), error: Some(e.to_string()) }),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub url: Option<String>,
}

/// Stream the fetched resource's bytes back with its reported content type.
async fn download(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Response {
    let Some(url) = params.url.filter(|u| !u.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing URL").into_response();
    };
    match state.http.get(&url).send().await {
        Ok(res) => {
            let content_type = res
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("image/jpeg")
                .to_string();
            let stream = res.bytes_stream();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from_stream(stream))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        Err(e) => {
            tracing::error!(%url, error = %e, "download proxy fetch failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to download image").into_response()
        }
    }
}
