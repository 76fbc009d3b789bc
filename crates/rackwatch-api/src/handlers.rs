//! API handlers.
//!
//! The sweep trigger keeps the exact response contract of the original
//! serverless function (`{message, updated}` / `{error}`); the inventory
//! endpoints use the `ApiResponse` envelope.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use tracing::{error, info};

use rackwatch_store::{ServerRecord, UpdateFields};
use rackwatch_sweep::run_sweep;

use crate::export::{export_filename, render_csv};
use crate::ApiState;

/// Response wrapper for the inventory endpoints.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

// ── Sweep trigger ──────────────────────────────────────────────

/// POST /api/v1/sweep
///
/// Runs one sweep synchronously and returns its report. The route only
/// accepts POST; axum answers 405 for anything else before the handler
/// (and therefore the store) is touched.
pub async fn trigger_sweep(State(state): State<ApiState>) -> impl IntoResponse {
    match run_sweep(&*state.store, state.prober.clone()).await {
        Ok(report) => {
            info!(updated = report.updated, "manual sweep finished");
            (StatusCode::OK, Json(serde_json::json!(report))).into_response()
        }
        Err(e) => {
            error!(error = %e, "manual sweep failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

// ── Inventory ──────────────────────────────────────────────────

/// GET /api/v1/servers
pub async fn list_servers(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.list().await {
        Ok(records) => ApiResponse::ok(records).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// POST /api/v1/servers
pub async fn create_server(
    State(state): State<ApiState>,
    Json(record): Json<ServerRecord>,
) -> impl IntoResponse {
    match state.store.insert(std::slice::from_ref(&record)).await {
        Ok(()) => (StatusCode::CREATED, ApiResponse::ok(record)).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// PATCH /api/v1/servers/{id}
pub async fn update_server(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(mut fields): Json<UpdateFields>,
) -> impl IntoResponse {
    if fields.is_empty() {
        return error_response("no fields to update", StatusCode::BAD_REQUEST).into_response();
    }
    // Every user edit bumps the timestamp, like the original client did.
    fields.updated_at.get_or_insert_with(Utc::now);
    match state.store.update(&id, fields).await {
        Ok(()) => ApiResponse::ok("updated").into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// Bulk mutation body: one set of fields applied to many ids.
#[derive(serde::Deserialize)]
pub struct BulkUpdateRequest {
    pub ids: Vec<String>,
    pub fields: UpdateFields,
}

/// PATCH /api/v1/servers
pub async fn bulk_update_servers(
    State(state): State<ApiState>,
    Json(req): Json<BulkUpdateRequest>,
) -> impl IntoResponse {
    if req.ids.is_empty() {
        return error_response("no ids given", StatusCode::BAD_REQUEST).into_response();
    }
    let mut fields = req.fields;
    fields.updated_at.get_or_insert_with(Utc::now);
    match state.store.update_many(&req.ids, fields).await {
        Ok(()) => ApiResponse::ok(req.ids.len()).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// DELETE /api/v1/servers/{id} — `id` may be a comma-separated list.
pub async fn delete_servers(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let ids: Vec<String> = id
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if ids.is_empty() {
        return error_response("no ids given", StatusCode::BAD_REQUEST).into_response();
    }
    match state.store.delete(&ids).await {
        Ok(()) => ApiResponse::ok("deleted").into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// PATCH /api/v1/servers/{id}/autosave
///
/// Queues a debounced write; the store is only touched after the 500 ms
/// quiet period, so the response says "accepted", not "saved".
pub async fn autosave_server(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(fields): Json<UpdateFields>,
) -> impl IntoResponse {
    if fields.is_empty() {
        return error_response("no fields to update", StatusCode::BAD_REQUEST).into_response();
    }
    state.autosave.submit(&id, fields).await;
    (StatusCode::ACCEPTED, ApiResponse::ok("accepted")).into_response()
}

// ── Export ─────────────────────────────────────────────────────

/// GET /api/v1/servers/export
pub async fn export_servers(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.list().await {
        Ok(records) => {
            let filename = export_filename(Utc::now().date_naive());
            let body = render_csv(&records);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                body,
            )
                .into_response()
        }
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}
