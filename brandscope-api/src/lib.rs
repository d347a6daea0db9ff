//! HTTP surface for the website record store.
//!
//! Routes:
//! - `POST /api/websites/analyze`: ingest a URL, `201 {id, brandName}`
//! - `GET  /api/websites`: paginated listing, newest first
//! - `PATCH /api/websites/:id`: partial update with no-change detection
//! - `DELETE /api/websites/:id`: remove a record
//! - `GET  /`: health check
//!
//! Every failure body is `{"error": "<message>"}`. Client mistakes get the
//! specific message; anything unexpected gets the generic one while the
//! full cause goes to the log only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use brandscope_ingest::{IngestError, Ingestor};
use brandscope_store::{StoreError, WebsitePatch, WebsiteRecord, WebsiteStore};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";
const NOT_FOUND_MESSAGE: &str = "Check the ID properly. Website not found.";
const DELETED_MESSAGE: &str = "Website deleted successfully";
const HEALTH_MESSAGE: &str = "API is running";
const UPDATE_FIELDS_REQUIRED_MESSAGE: &str =
    "At least one of brandName or description is required";
const NO_CHANGES_MESSAGE: &str = "No changes detected";

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct ApiState {
    ingestor: Arc<Ingestor>,
    store: WebsiteStore,
}

impl ApiState {
    pub fn new(ingestor: Ingestor, store: WebsiteStore) -> Self {
        Self {
            ingestor: Arc::new(ingestor),
            store,
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/websites/analyze", post(analyze_website))
        .route("/api/websites", get(list_websites))
        .route(
            "/api/websites/:id",
            patch(update_website).delete(delete_website),
        )
        .with_state(state)
}

// ==============================
// Errors
// ==============================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl ApiError {
    fn internal(err: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal(err.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(m) | ApiError::NotFound(m) | ApiError::Conflict(m) => m,
            ApiError::Internal(_) => GENERIC_ERROR_MESSAGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref err) = self {
            tracing::error!(error = ?err, "api.internal_error");
        }
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::MissingUrl
            | IngestError::InvalidUrlFormat
            | IngestError::UrlTooLong
            | IngestError::Unscrapable => ApiError::BadRequest(err.to_string()),
            IngestError::DuplicateUrl => ApiError::Conflict(err.to_string()),
            IngestError::Store(inner) => ApiError::from(inner),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound(NOT_FOUND_MESSAGE.to_string()),
            StoreError::DuplicateUrl => ApiError::Conflict(err.to_string()),
            StoreError::Db(inner) => ApiError::internal(inner),
        }
    }
}

// ==============================
// Wire types
// ==============================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub id: i64,
    pub brand_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub data: Vec<WebsiteRecord>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub brand_name: Option<String>,
    pub description: Option<String>,
}

// ==============================
// Handlers
// ==============================

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "message": HEALTH_MESSAGE }))
}

async fn analyze_website(
    State(state): State<ApiState>,
    body: Option<Json<AnalyzeRequest>>,
) -> Result<(StatusCode, Json<AnalyzeResponse>), ApiError> {
    let req_id = Uuid::new_v4();
    // A missing or unreadable body is the same as a missing url field.
    let url = body.and_then(|Json(req)| req.url).unwrap_or_default();
    tracing::info!(req_id = %req_id, url = %url, "api.analyze.start");

    let receipt = state.ingestor.ingest(&url).await.map_err(|err| {
        tracing::info!(req_id = %req_id, error = %err, "api.analyze.rejected");
        ApiError::from(err)
    })?;

    tracing::info!(req_id = %req_id, id = receipt.id, "api.analyze.created");
    Ok((
        StatusCode::CREATED,
        Json(AnalyzeResponse {
            id: receipt.id,
            brand_name: receipt.brand_name,
        }),
    ))
}

async fn list_websites(
    State(state): State<ApiState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let req_id = Uuid::new_v4();
    let page = coerce_positive(params.page.as_deref(), DEFAULT_PAGE);
    let limit = coerce_positive(params.limit.as_deref(), DEFAULT_LIMIT);

    let listing = state.store.list(page, limit).await?;
    let total_pages = total_pages(listing.total, limit);
    tracing::info!(
        req_id = %req_id,
        page,
        limit,
        total = listing.total,
        "api.list"
    );

    Ok(Json(ListResponse {
        data: listing.records,
        page,
        limit,
        total: listing.total,
        total_pages,
    }))
}

async fn update_website(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    body: Option<Json<UpdateRequest>>,
) -> Result<Json<WebsiteRecord>, ApiError> {
    let req_id = Uuid::new_v4();
    let id = parse_record_id(&id)?;
    let current = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

    let req = body.map(|Json(req)| req).unwrap_or_default();
    if req.brand_name.is_none() && req.description.is_none() {
        return Err(ApiError::BadRequest(
            UPDATE_FIELDS_REQUIRED_MESSAGE.to_string(),
        ));
    }

    // Drop any supplied field that matches what is already stored; if
    // nothing is left the request changes nothing and is rejected.
    let brand_name = req.brand_name.filter(|v| *v != current.brand_name);
    let description = req.description.filter(|v| *v != current.description);
    if brand_name.is_none() && description.is_none() {
        tracing::info!(req_id = %req_id, id, "api.update.no_change");
        return Err(ApiError::BadRequest(NO_CHANGES_MESSAGE.to_string()));
    }

    let updated = state
        .store
        .update(
            id,
            WebsitePatch {
                brand_name,
                description,
            },
        )
        .await?;
    tracing::info!(req_id = %req_id, id, "api.update.applied");
    Ok(Json(updated))
}

async fn delete_website(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req_id = Uuid::new_v4();
    let id = parse_record_id(&id)?;
    state.store.delete(id).await?;
    tracing::info!(req_id = %req_id, id, "api.delete");
    Ok(Json(json!({ "message": DELETED_MESSAGE })))
}

// ==============================
// Helpers
// ==============================

/// Anything that is not a positive integer falls back to the default, so
/// `?page=abc&limit=-5` quietly becomes the first default-sized page.
fn coerce_positive(raw: Option<&str>, fallback: i64) -> i64 {
    raw.and_then(|s| s.parse::<i64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(fallback)
}

/// Non-numeric ids get the not-found treatment rather than a syntax error;
/// the id namespace is the store's business, not the client's.
fn parse_record_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::NotFound(NOT_FOUND_MESSAGE.to_string()))
}

/// Ceiling division that stays in range for any positive `limit`, including
/// the extreme values `coerce_positive` lets through.
fn total_pages(total: i64, limit: i64) -> i64 {
    if total == 0 {
        0
    } else {
        (total - 1) / limit + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_coercion_defaults() {
        assert_eq!(coerce_positive(None, 1), 1);
        assert_eq!(coerce_positive(Some("3"), 1), 3);
        assert_eq!(coerce_positive(Some("abc"), 1), 1);
        assert_eq!(coerce_positive(Some("0"), 10), 10);
        assert_eq!(coerce_positive(Some("-5"), 10), 10);
        // Any positive value parses through untouched, however large.
        assert_eq!(coerce_positive(Some("9223372036854775807"), 10), i64::MAX);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(3, 2), 2);
    }

    #[test]
    fn total_pages_stays_in_range_for_extreme_limits() {
        assert_eq!(total_pages(3, i64::MAX), 1);
        assert_eq!(total_pages(0, i64::MAX), 0);
        assert_eq!(total_pages(i64::MAX, 1), i64::MAX);
        assert_eq!(total_pages(i64::MAX, i64::MAX), 1);
    }

    #[test]
    fn record_id_parsing_maps_to_not_found() {
        assert_eq!(parse_record_id("7").unwrap(), 7);
        let err = parse_record_id("abc").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.message(), NOT_FOUND_MESSAGE);
    }
}
