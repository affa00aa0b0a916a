//! Session export routes

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use keyword_db::entity::search_session::SearchSession;

use crate::export;
use crate::AppState;

/// Query params for the export endpoint
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub session_id: Option<i32>,
}

/// GET /api/export/:format?session_id=
/// Exports a session's keywords as `csv` or `json`; the autosave session is
/// used when no id is given
pub async fn export_session(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
    Query(params): Query<ExportParams>,
) -> impl IntoResponse {
    let session = match params.session_id {
        Some(id) => SearchSession::find_by_id(id, &state.db_pool).await,
        None => SearchSession::find_autosave(&state.db_pool).await,
    };

    let session = match session {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to load session for export: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    if params.session_id.is_some() && session.is_none() {
        return (StatusCode::NOT_FOUND, "Session not found").into_response();
    }

    let keywords: Vec<JsonValue> = session.map(|s| s.keywords_list()).unwrap_or_default();

    match format.to_lowercase().as_str() {
        "csv" => match export::keywords_csv(&keywords) {
            Ok(body) => export::csv_attachment("keywords_export", body),
            Err(e) => {
                tracing::error!("Failed to build keywords CSV: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Export error").into_response()
            }
        },
        "json" => match serde_json::to_string_pretty(&keywords) {
            Ok(body) => export::json_attachment("keywords_export", body),
            Err(e) => {
                tracing::error!("Failed to serialize keywords: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Export error").into_response()
            }
        },
        _ => (StatusCode::BAD_REQUEST, "Invalid export format").into_response(),
    }
}
