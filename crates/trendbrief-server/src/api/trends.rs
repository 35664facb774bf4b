//! Trend document handlers: request a brief, read stored briefs, refresh.
//!
//! Creation and refresh are asynchronous: the handler validates, enqueues a
//! job, and answers 202. The document only appears (or changes) once a
//! worker's pipeline run has been persisted.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::jobs::{enqueue_refresh_sweep, EnqueueError, JobKind, TrendJob};
use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateTrendRequest {
    pub id: String,
    pub brand: String,
    pub product: String,
    pub recipient_email: String,
    pub recipient_name: String,
    pub email_subject: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ListTrendsQuery {
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(in crate::api) struct CreateTrendResponse {
    pub id: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct TrendDocumentItem {
    pub id: String,
    pub brand: String,
    pub product: String,
    pub recipient_email: String,
    pub recipient_name: String,
    pub email_subject: String,
    pub email_body: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct RefreshResponse {
    pub enqueued: usize,
    pub skipped: usize,
}

impl From<trendbrief_db::TrendDocumentRow> for TrendDocumentItem {
    fn from(row: trendbrief_db::TrendDocumentRow) -> Self {
        Self {
            id: row.id,
            brand: row.brand,
            product: row.product,
            recipient_email: row.recipient_email,
            recipient_name: row.recipient_name,
            email_subject: row.email_subject,
            email_body: row.email_body,
            metadata: row.metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn require_non_blank(req_id: &str, field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            format!("'{field}' must not be blank"),
        ));
    }
    Ok(trimmed.to_owned())
}

fn validate_email(req_id: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = require_non_blank(req_id, "recipient_email", value)?;
    // Minimal shape check; the mailer parses the full address at send time.
    if !trimmed.contains('@') || trimmed.contains(char::is_whitespace) {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            format!("'recipient_email' must be an email address, got '{trimmed}'"),
        ));
    }
    Ok(trimmed)
}

fn map_enqueue_error(req_id: &str, e: &EnqueueError) -> ApiError {
    match e {
        EnqueueError::Full => ApiError::new(
            req_id,
            "unavailable",
            "job queue is full, retry later",
        ),
        EnqueueError::Closed => {
            tracing::error!("job queue is closed; workers are gone");
            ApiError::new(req_id, "internal_error", "job queue is closed")
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/trends — queue a pipeline run for a new or existing brief.
pub(in crate::api) async fn create_trend(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateTrendRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateTrendResponse>>), ApiError> {
    let rid = &req_id.0;

    let id = require_non_blank(rid, "id", &body.id)?;
    let brand = require_non_blank(rid, "brand", &body.brand)?;
    let product = require_non_blank(rid, "product", &body.product)?;
    let recipient_email = validate_email(rid, &body.recipient_email)?;
    let recipient_name = require_non_blank(rid, "recipient_name", &body.recipient_name)?;

    let job = TrendJob {
        trend_id: id.clone(),
        brand,
        product,
        recipient_email,
        recipient_name,
        email_subject: body
            .email_subject
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty()),
        metadata: body.metadata.unwrap_or_else(|| serde_json::json!({})),
        kind: JobKind::Requested,
    };

    state
        .jobs
        .try_enqueue(job)
        .map_err(|e| map_enqueue_error(rid, &e))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: CreateTrendResponse {
                id,
                status: "queued",
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/trends — list stored briefs, most recently updated first.
pub(in crate::api) async fn list_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListTrendsQuery>,
) -> Result<Json<ApiResponse<Vec<TrendDocumentItem>>>, ApiError> {
    let limit = normalize_limit(query.limit);
    let rows = trendbrief_db::list_trend_documents(&state.pool, limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(TrendDocumentItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/trends/:trend_id — fetch one stored brief.
pub(in crate::api) async fn get_trend(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(trend_id): Path<String>,
) -> Result<Json<ApiResponse<TrendDocumentItem>>, ApiError> {
    let row = trendbrief_db::get_trend_document(&state.pool, &trend_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: TrendDocumentItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/trends/refresh — queue a re-run for every stored brief.
pub(in crate::api) async fn refresh_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<(StatusCode, Json<ApiResponse<RefreshResponse>>), ApiError> {
    let (enqueued, skipped) = enqueue_refresh_sweep(&state.pool, &state.jobs)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: RefreshResponse { enqueued, skipped },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
