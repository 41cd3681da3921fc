//! Chat backend HTTP server.
//!
//! Thin router/controller layer over the chat business logic:
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/chat` | Submit a chat message, receive a reply |
//! | `GET`  | `/history` | Retrieve chat history for a user/session |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "message must not be empty" } }
//! ```
//!
//! Validation and business-rule violations map to 400; anything unexpected
//! maps to 500 with a generic fallback message. No retry or backoff.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::chatbot::{self, ChatMessageRequest, ChatMessageResponse};
use crate::config::Config;
use crate::db;
use crate::llm::LlmClient;
use crate::migrate;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    pool: SqlitePool,
    llm: Arc<LlmClient>,
    model: String,
}

/// Start the chat backend server on the configured bind address.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let llm = LlmClient::from_env(&config.llm)?;

    // Schema is idempotent, so serving always starts from a usable database.
    migrate::run_migrations(config).await?;
    let pool = db::connect(&config.db).await?;

    let model = llm.model().to_string();
    let state = AppState {
        pool,
        llm: Arc::new(llm),
        model,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/chat", post(handle_chat))
        .route("/history", get(handle_history))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("chat server listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /chat ============

async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatMessageRequest>,
) -> Result<Json<ChatMessageResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(bad_request("message must not be empty"));
    }

    let session_id = request
        .session_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let (reply, tokens_used) = chatbot::process_message(&state.llm, &request)
        .await
        .map_err(|e| internal(format!("Internal server error: {}", e)))?;

    store_message(
        &state.pool,
        request.user_id,
        &session_id,
        "user",
        &request.message,
        None,
    )
    .await
    .map_err(|e| internal(format!("Internal server error: {}", e)))?;

    store_message(
        &state.pool,
        request.user_id,
        &session_id,
        "assistant",
        &reply,
        Some(&state.model),
    )
    .await
    .map_err(|e| internal(format!("Internal server error: {}", e)))?;

    Ok(Json(ChatMessageResponse {
        reply,
        session_id,
        model_used: state.model.clone(),
        tokens_used,
    }))
}

async fn store_message(
    pool: &SqlitePool,
    user_id: Option<i64>,
    session_id: &str,
    role: &str,
    content: &str,
    model: Option<&str>,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO messages (id, user_id, session_id, role, content, model, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(session_id)
    .bind(role)
    .bind(content)
    .bind(model)
    .bind(chrono::Utc::now().timestamp())
    .execute(pool)
    .await?;
    Ok(())
}

// ============ GET /history ============

#[derive(Deserialize)]
struct HistoryParams {
    user_id: i64,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default = "default_history_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_history_limit() -> i64 {
    50
}

#[derive(Serialize)]
struct HistoryMessage {
    id: String,
    session_id: String,
    role: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    created_at: String, // ISO8601
}

#[derive(Serialize)]
struct ChatHistoryResponse {
    messages: Vec<HistoryMessage>,
    total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
}

async fn handle_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<ChatHistoryResponse>, AppError> {
    if params.user_id <= 0 {
        return Err(bad_request("Invalid user_id"));
    }
    if !(1..=100).contains(&params.limit) {
        return Err(bad_request("limit must be between 1 and 100"));
    }
    if params.offset < 0 {
        return Err(bad_request("offset must be >= 0"));
    }

    let (rows, total) = fetch_history(&state.pool, &params)
        .await
        .map_err(|e| internal(format!("Failed to retrieve chat history: {}", e)))?;

    let messages = rows
        .iter()
        .map(|row| HistoryMessage {
            id: row.get("id"),
            session_id: row.get("session_id"),
            role: row.get("role"),
            content: row.get("content"),
            model: row.get("model"),
            created_at: format_ts_iso(row.get("created_at")),
        })
        .collect();

    Ok(Json(ChatHistoryResponse {
        messages,
        total,
        session_id: params.session_id,
    }))
}

async fn fetch_history(
    pool: &SqlitePool,
    params: &HistoryParams,
) -> anyhow::Result<(Vec<sqlx::sqlite::SqliteRow>, i64)> {
    let (rows, total) = match &params.session_id {
        Some(session_id) => {
            let rows = sqlx::query(
                "SELECT id, session_id, role, content, model, created_at FROM messages \
                 WHERE user_id = ? AND session_id = ? \
                 ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(params.user_id)
            .bind(session_id)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await?;
            let total: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM messages WHERE user_id = ? AND session_id = ?",
            )
            .bind(params.user_id)
            .bind(session_id)
            .fetch_one(pool)
            .await?;
            (rows, total)
        }
        None => {
            let rows = sqlx::query(
                "SELECT id, session_id, role, content, model, created_at FROM messages \
                 WHERE user_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
            )
            .bind(params.user_id)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE user_id = ?")
                .bind(params.user_id)
                .fetch_one(pool)
                .await?;
            (rows, total)
        }
    };

    Ok((rows, total))
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_render_as_iso8601() {
        assert_eq!(format_ts_iso(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_ts_iso(1_700_000_000), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn history_params_defaults() {
        let params: HistoryParams =
            serde_json::from_str(r#"{"user_id": 7}"#).unwrap();
        assert_eq!(params.limit, 50);
        assert_eq!(params.offset, 0);
        assert!(params.session_id.is_none());
    }
}
