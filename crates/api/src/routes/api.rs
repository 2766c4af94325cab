use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use common::SettingsUpdate;
use session::{DashboardSnapshot, SessionError};

use crate::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/balance", get(get_balance))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/settings", get(get_settings).post(post_settings))
        .route("/api/session", post(post_session))
}

// ─── Balance ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct BalanceQuery {
    token: Option<String>,
}

async fn get_balance(
    State(state): State<AppState>,
    Query(query): Query<BalanceQuery>,
) -> (StatusCode, Json<Value>) {
    let token = query.token.unwrap_or_default();
    match state.broker.balance(&token).await {
        Ok(balance) => (StatusCode::OK, Json(json!({ "balance": balance }))),
        Err(err) => {
            warn!(error = %err, "balance fetch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Balance fetch failed" })),
            )
        }
    }
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.store.dashboard().await)
}

// ─── Settings ────────────────────────────────────────────────────────────────

async fn get_settings(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "settings": state.store.settings().await }))
}

/// The dashboard sends either `{ "settings": {...} }` or the bare object.
/// Either way the four gating fields must be present and numeric.
fn parse_settings_body(body: Value) -> Option<SettingsUpdate> {
    let payload = match body.get("settings") {
        Some(inner) => inner.clone(),
        None => body,
    };
    serde_json::from_value(payload).ok()
}

async fn post_settings(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(update) = parse_settings_body(body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid settings format" })),
        );
    };

    let settings = state.store.merge_settings(update).await;
    info!(stake = settings.stake_amount, max_trades = settings.max_trades, "settings updated");
    (
        StatusCode::OK,
        Json(json!({ "message": "Settings updated", "settings": settings })),
    )
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SessionRequest {
    token: Option<String>,
}

async fn post_session(
    State(state): State<AppState>,
    Json(body): Json<SessionRequest>,
) -> (StatusCode, Json<Value>) {
    let token = body.token.unwrap_or_default();
    match state.orchestrator.run_session(&token).await {
        Ok(outcome) => (StatusCode::OK, Json(json!({ "message": outcome.message() }))),
        Err(SessionError::Rejected(rejection)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": rejection.to_string() })),
        ),
        Err(SessionError::Internal(err)) => {
            error!(error = %err, "trade session failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Trade session failed" })),
            )
        }
    }
}
