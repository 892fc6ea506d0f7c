use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use ev_core::tags::normalize_tags;
use ev_core::{Article, Error};
use ev_report::{query_by_tags, store_records, ArticleRecord, Stage, StoreOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::AppState;

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, String)>;

fn api_error(e: Error) -> (StatusCode, String) {
    if e.is_config() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else {
        tracing::error!("Request failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub query: String,
    #[serde(default)]
    pub instructions: Option<String>,
    /// Ask the model for query-specific instructions when none are given.
    #[serde(default)]
    pub dynamic: bool,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report: String,
    pub tags: Vec<String>,
    pub articles: Vec<Article>,
    pub supplemented: bool,
    pub appended: usize,
    pub stages: Vec<Stage>,
}

pub async fn create_report(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReportRequest>,
) -> ApiResult<ReportResponse> {
    let mut extra = request.instructions.unwrap_or_default();
    if extra.is_empty() && request.dynamic {
        if let Some(generator) = &state.instructions {
            extra = generator.generate(&request.query).await;
        }
    }

    let run = state.orchestrator.run(&request.query, &extra).await.map_err(api_error)?;
    Ok(Json(ReportResponse {
        report: run.report,
        tags: run.tags,
        articles: run.articles,
        supplemented: run.supplemented,
        appended: run.appended,
        stages: run.stages,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ArticleQuery {
    /// Comma-separated tag list.
    #[serde(default)]
    pub tags: String,
    pub min_matches: Option<usize>,
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ArticleQuery>,
) -> ApiResult<Vec<Article>> {
    let tags: Vec<&str> = params.tags.split(',').collect();
    let tags = normalize_tags(&tags);
    let min_matches = params.min_matches.unwrap_or(state.orchestrator.config().min_tag_matches);
    let storage = state.orchestrator.storage();
    Ok(Json(query_by_tags(storage.as_ref(), &tags, min_matches).await))
}

pub async fn store_articles(
    State(state): State<Arc<AppState>>,
    Json(records): Json<Vec<ArticleRecord>>,
) -> ApiResult<StoreOutcome> {
    let storage = state.orchestrator.storage();
    let outcome = store_records(storage.as_ref(), records).await.map_err(api_error)?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct TagQuery {
    pub q: String,
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TagResponse {
    pub tags: Vec<String>,
}

pub async fn extract_tags(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TagQuery>,
) -> ApiResult<TagResponse> {
    if params.q.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "q must not be empty".to_string()));
    }
    let top_n = params.top_n.unwrap_or(state.orchestrator.config().tag_top_n);
    let tags = state.tagger.extract_tags(&params.q, top_n).await.map_err(api_error)?;
    Ok(Json(TagResponse { tags }))
}
