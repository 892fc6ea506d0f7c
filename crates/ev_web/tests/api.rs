use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use ev_core::prelude::*;
use ev_inference::models::DummyModel;
use ev_report::{ReportConfig, ReportOrchestrator, NO_ARTICLES_SENTINEL};
use ev_storage::InMemoryStorage;
use ev_web::{create_app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

struct FixedTagger;

#[async_trait]
impl TagExtractor for FixedTagger {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn extract_tags(&self, _query: &str, top_n: usize) -> Result<Vec<String>> {
        Ok(["tariff", "trump"].iter().take(top_n).map(|t| t.to_string()).collect())
    }
}

struct StaticFetcher(Vec<FetchedArticle>);

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<FetchedArticle>> {
        request.validate()?;
        Ok(self.0.clone())
    }
}

fn app_state(fetched: Vec<FetchedArticle>) -> (AppState, Arc<InMemoryStorage>) {
    let storage = Arc::new(InMemoryStorage::empty());
    let config = ReportConfig { min_article_threshold: 3, min_tag_matches: 2, ..ReportConfig::default() };
    let orchestrator = ReportOrchestrator::new(
        Arc::new(FixedTagger),
        storage.clone(),
        Arc::new(StaticFetcher(fetched)),
        Arc::new(DummyModel::new()),
        config,
    )
    .unwrap();
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        tagger: Arc::new(FixedTagger),
        instructions: None,
    };
    (state, storage)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_report_supplements_and_persists() {
    let fetched = vec![FetchedArticle::new("https://fresh.example/a", "raw", "Tariffs went up.")];
    let (state, storage) = app_state(fetched);
    let app = create_app(state).await;

    let response = app
        .oneshot(json_request("POST", "/api/reports", json!({ "query": "Trump tariffs" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["report"].as_str().unwrap().starts_with("Executive Summary"));
    assert_eq!(body["tags"], json!(["tariff", "trump"]));
    assert_eq!(body["supplemented"], json!(true));
    assert_eq!(body["appended"], json!(1));
    assert!(storage.contains("https://fresh.example/a").await.unwrap());
}

#[tokio::test]
async fn test_report_without_evidence() {
    let (state, _storage) = app_state(vec![]);
    let app = create_app(state).await;

    let response = app
        .oneshot(json_request("POST", "/api/reports", json!({ "query": "anything" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["report"], json!(NO_ARTICLES_SENTINEL));
}

#[tokio::test]
async fn test_empty_query_is_bad_request() {
    let (state, _storage) = app_state(vec![]);
    let app = create_app(state).await;

    let response = app
        .oneshot(json_request("POST", "/api/reports", json!({ "query": "  " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_store_then_lookup() {
    let (state, _storage) = app_state(vec![]);
    let app = create_app(state).await;

    let records = json!([
        { "url": "https://s.example/1", "summary": "one", "query": "q", "tags": ["Tariff", "Trump"] },
        { "url": "https://s.example/2", "summary": "two", "query": "q", "tags": ["tariff"] },
        { "url": "bad url", "summary": "x" }
    ]);
    let response = app.clone().oneshot(json_request("POST", "/api/articles", records)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["stored"], json!(2));
    assert_eq!(body["skipped"], json!(1));
    assert_eq!(body["refreshed"], json!(0));

    let request = Request::builder()
        .uri("/api/articles?tags=tariff,trump&min_matches=2")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let body = body_json(response).await;
    let urls: Vec<&str> = body.as_array().unwrap().iter().map(|a| a["url"].as_str().unwrap()).collect();
    assert_eq!(urls, vec!["https://s.example/1"]);

    let request = Request::builder()
        .uri("/api/articles?tags=tariff&min_matches=1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_tags_endpoint() {
    let (state, _storage) = app_state(vec![]);
    let app = create_app(state).await;

    let request = Request::builder().uri("/api/tags?q=trump%20tariffs&top_n=1").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["tags"], json!(["tariff"]));

    let request = Request::builder().uri("/api/tags?q=").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
