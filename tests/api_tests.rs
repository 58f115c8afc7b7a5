mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use cinedex::config::Config;
use cinedex::db::Store;
use cinedex::state::SharedState;
use common::{FakeProvider, space_catalog, temp_db_url};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app_with(provider: FakeProvider) -> Router {
    let mut config = Config::default();
    config.database.url = temp_db_url("cinedex-api-test");

    let store = Store::from_config(&config.database)
        .await
        .expect("failed to open test database");
    let index = Arc::new(store.search_index(config.search_index.max_results));
    let cache = Arc::new(store.result_cache());

    let shared = SharedState::from_parts(config, store, Arc::new(provider), index, cache)
        .await
        .expect("failed to build shared state");

    let state = cinedex::api::create_app_state(Arc::new(shared), None);
    cinedex::api::router(state).await
}

async fn spawn_app() -> Router {
    spawn_app_with(FakeProvider::with_records(&space_catalog())).await
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_live() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/system/health/live").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "alive");
}

#[tokio::test]
async fn test_fetch_then_search_reports_provenance() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "POST", "/api/movies/fetch").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["succeeded"], 5);
    assert_eq!(body["data"]["failed"], 0);
    assert_eq!(body["data"]["cache_invalidated"], true);
    assert!(body["data"]["processing_time_ms"].is_u64());

    let (status, body) = send(&app, "GET", "/api/movies/search?query=Space").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source"], "index");
    assert_eq!(body["data"]["count"], 5);
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 5);

    let (_, body) = send(&app, "GET", "/api/movies/search?query=space").await;
    assert_eq!(body["data"]["source"], "cache");
    assert_eq!(body["data"]["count"], 5);
}

#[tokio::test]
async fn test_search_requires_query() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/movies/search?query=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, "GET", "/api/movies/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_movie() {
    let app = spawn_app().await;
    send(&app, "POST", "/api/movies/fetch").await;

    let (status, body) = send(&app, "GET", "/api/movies/tt0000003").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Space Movie 3");

    let (status, body) = send(&app, "GET", "/api/movies/tt4040404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_status_reports_catalog_size() {
    let app = spawn_app().await;
    send(&app, "POST", "/api/movies/fetch").await;

    let (status, body) = send(&app, "GET", "/api/system/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["catalog_size"], 5);
    assert_eq!(body["data"]["search_backend"], "sqlite");
}

#[tokio::test]
async fn test_fetch_reports_provider_outage() {
    let provider = FakeProvider::with_records(&space_catalog());
    provider.set_list_fails(true);
    let app = spawn_app_with(provider).await;

    let (status, body) = send(&app, "POST", "/api/movies/fetch").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "OMDb service is unavailable");
}
