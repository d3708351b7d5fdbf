//! Frame host webhook.
//!
//! Events are acknowledged and logged; nothing is persisted.

use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

pub const APP_NAME: &str = "CrossPay";
pub const WEBHOOK_VERSION: &str = "2.0";

/// `GET /api/webhook`
pub async fn webhook_status() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "app": APP_NAME,
        "version": WEBHOOK_VERSION,
        "webhook": "active",
    }))
}

/// `POST /api/webhook`
pub async fn receive_webhook(body: Bytes) -> Response {
    let event: Value = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, bytes = body.len(), "Rejected malformed webhook body");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid request" })),
            )
                .into_response();
        }
    };

    let receipt_id = Uuid::new_v4();
    let event_type = event.get("event").and_then(Value::as_str).unwrap_or("unknown");
    tracing::info!(
        receipt_id = %receipt_id,
        event_type,
        payload = %event,
        "Webhook received"
    );

    Json(json!({
        "status": "received",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
    .into_response()
}
