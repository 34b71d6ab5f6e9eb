// src/api.rs
// HTTP control surface. Thin handlers over the engine; every route answers
// with structured JSON and the background loop is never blocked by them.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::engine::AlertEngine;
use crate::notify::slack::sample_alert;
use crate::notify::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AlertEngine>,
    pub notifier: Arc<dyn Notifier>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/check", post(manual_check))
        .route("/webhook", post(webhook_receiver))
        .route("/test", post(test_notification))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "sent_alerts_count": state.engine.sent_count(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Run a check on its own task so a panic surfaces as a JoinError (→ 500)
/// instead of tearing the server down.
async fn run_check(engine: Arc<AlertEngine>) -> Result<usize, tokio::task::JoinError> {
    tokio::spawn(async move { engine.check_once().await }).await
}

async fn manual_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match run_check(state.engine.clone()).await {
        Ok(new_alerts) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "new_alerts_sent": new_alerts,
                "total_sent_alerts": state.engine.sent_count(),
            })),
        ),
        Err(e) => {
            tracing::error!(error = ?e, "manual check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": e.to_string() })),
            )
        }
    }
}

async fn webhook_receiver(
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> (StatusCode, Json<Value>) {
    // Arbitrary JSON is accepted; anything unparseable is echoed as null.
    let received: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    tracing::info!(payload = %received, "received webhook");

    match run_check(state.engine.clone()).await {
        Ok(new_alerts) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "new_alerts_sent": new_alerts,
                "received_data": received,
            })),
        ),
        Err(e) => {
            tracing::error!(error = ?e, "webhook-triggered check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": e.to_string() })),
            )
        }
    }
}

async fn test_notification(State(state): State<AppState>) -> Json<Value> {
    match state.notifier.send(&sample_alert()).await {
        Ok(()) => Json(json!({
            "status": "success",
            "message": "Test notification sent",
        })),
        Err(e) => {
            tracing::error!(error = ?e, "test notification failed");
            Json(json!({
                "status": "error",
                "message": "Failed to send test notification",
            }))
        }
    }
}
