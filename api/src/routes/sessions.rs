//! Session API routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use keyword_db::entity::search_session::SearchSession;

use crate::AppState;

/// Session list response item
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub id: i32,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub keyword_count: usize,
}

impl From<SearchSession> for SessionSummary {
    fn from(s: SearchSession) -> Self {
        Self {
            id: s.id,
            name: s.session_name.clone(),
            created_at: s.created_at.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
            updated_at: s.updated_at.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
            keyword_count: s.keyword_count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummary>,
}

/// Request body for saving a named session
#[derive(Debug, Deserialize)]
pub struct SaveSessionRequest {
    pub session_name: String,
    pub keywords_data: JsonValue,
}

/// Loaded session payload
#[derive(Debug, Serialize)]
pub struct LoadSessionResponse {
    pub success: bool,
    pub session_name: String,
    pub keywords_data: Vec<JsonValue>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SearchSession> for LoadSessionResponse {
    fn from(s: SearchSession) -> Self {
        Self {
            success: true,
            session_name: s.session_name.clone(),
            keywords_data: s.keywords_list(),
            created_at: s.created_at.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
            updated_at: s.updated_at.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
        }
    }
}

/// GET /api/sessions
/// Returns named sessions, most recently updated first
pub async fn get_sessions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match SearchSession::list_named(&state.db_pool).await {
        Ok(sessions) => {
            let sessions: Vec<SessionSummary> = sessions.into_iter().map(Into::into).collect();
            Json(SessionsResponse { sessions }).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to list sessions: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

/// POST /api/sessions
/// Saves a named session, overwriting an existing session of the same name
pub async fn save_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaveSessionRequest>,
) -> impl IntoResponse {
    let session_name = request.session_name.trim();
    if session_name.is_empty() {
        return (StatusCode::BAD_REQUEST, "Session name is required").into_response();
    }

    let result = match SearchSession::find_named(session_name, &state.db_pool).await {
        Ok(Some(existing)) => {
            SearchSession::update_keywords(existing.id, &request.keywords_data, &state.db_pool)
                .await
        }
        Ok(None) => {
            SearchSession::create(session_name, false, &request.keywords_data, &state.db_pool)
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => Json(serde_json::json!({
            "success": true,
            "message": "Session saved successfully"
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to save session '{}': {}", session_name, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

/// GET /api/sessions/:id
/// Loads a session; id 0 loads the autosave session
pub async fn load_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i32>,
) -> impl IntoResponse {
    let result = if session_id == 0 {
        SearchSession::find_autosave(&state.db_pool).await
    } else {
        SearchSession::find_by_id(session_id, &state.db_pool).await
    };

    match result {
        Ok(Some(session)) => Json(LoadSessionResponse::from(session)).into_response(),
        // An absent autosave is an empty session, not an error
        Ok(None) if session_id == 0 => Json(LoadSessionResponse {
            success: true,
            session_name: "Autosave".to_string(),
            keywords_data: Vec::new(),
            created_at: String::new(),
            updated_at: String::new(),
        })
        .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Session not found").into_response(),
        Err(e) => {
            tracing::error!("Failed to load session {}: {}", session_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

/// DELETE /api/sessions/:id
/// Deletes a named session; the autosave session cannot be deleted
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i32>,
) -> impl IntoResponse {
    let session = match SearchSession::find_by_id(session_id, &state.db_pool).await {
        Ok(Some(session)) => session,
        Ok(None) => return (StatusCode::NOT_FOUND, "Session not found").into_response(),
        Err(e) => {
            tracing::error!("Failed to load session {}: {}", session_id, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    if session.is_autosave.unwrap_or(false) {
        return (StatusCode::BAD_REQUEST, "Cannot delete autosave session").into_response();
    }

    match SearchSession::delete(session_id, &state.db_pool).await {
        Ok(_) => Json(serde_json::json!({
            "success": true,
            "message": "Session deleted successfully"
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to delete session {}: {}", session_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

/// Full-session backup entry, keyword payload included
#[derive(Debug, Serialize)]
struct BackupEntry {
    id: i32,
    name: String,
    created_at: String,
    updated_at: String,
    keyword_count: usize,
    keywords_data: Vec<JsonValue>,
}

#[derive(Debug, Serialize)]
struct BackupFile {
    timestamp: String,
    sessions: Vec<BackupEntry>,
}

/// GET /api/sessions/backup
/// Downloads every named session with its keyword data as a JSON attachment
pub async fn backup_sessions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sessions = match SearchSession::list_named(&state.db_pool).await {
        Ok(sessions) => sessions,
        Err(e) => {
            tracing::error!("Failed to list sessions for backup: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    let now = Utc::now();
    let backup = BackupFile {
        timestamp: now.to_rfc3339(),
        sessions: sessions
            .into_iter()
            .map(|s| BackupEntry {
                id: s.id,
                name: s.session_name.clone(),
                created_at: s.created_at.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
                updated_at: s.updated_at.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
                keyword_count: s.keyword_count(),
                keywords_data: s.keywords_list(),
            })
            .collect(),
    };

    let body = match serde_json::to_string_pretty(&backup) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Failed to serialize sessions backup: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Serialization error").into_response();
        }
    };

    let filename = format!(
        "keyword_sessions_backup_{}.json",
        now.format("%Y%m%d_%H%M%S")
    );

    (
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", filename),
            ),
        ],
        body,
    )
        .into_response()
}
