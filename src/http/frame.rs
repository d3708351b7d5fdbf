//! Frame page, manifest, payment QR and health handlers.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::frame::manifest::{self, FrameManifest};
use crate::http::server::AppState;
use crate::payments::{draft, qr, uri};

/// `GET /`
pub async fn landing_page(State(state): State<AppState>) -> Response {
    match manifest::render_page(&state.config.frame) {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render landing page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

/// `GET /.well-known/farcaster.json`, `GET /farcaster.json`
pub async fn farcaster_manifest(State(state): State<AppState>) -> Json<FrameManifest> {
    Json(FrameManifest::from_config(&state.config.frame))
}

#[derive(Debug, Deserialize)]
pub struct QrQuery {
    pub address: String,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub chain_id: Option<u64>,
}

/// `GET /api/qr?address=..&amount=..` → SVG.
pub async fn payment_qr(State(state): State<AppState>, Query(query): Query<QrQuery>) -> Response {
    if let Err(e) = draft::validate_address(&query.address) {
        return bad_request(e.to_string());
    }
    let chain_id = query.chain_id.unwrap_or(state.config.chain.chain_id);

    let payment_uri = match uri::build_payment_uri(&query.address, chain_id, query.amount.as_deref()) {
        Ok(u) => u,
        Err(e) => return bad_request(e.to_string()),
    };

    match qr::render_svg_string(&payment_uri, &qr::QrOptions::svg()) {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "QR rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "QR rendering failed").into_response()
        }
    }
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Response {
    let rpc_healthy = match &state.client {
        Some(client) => Some(client.is_healthy().await),
        None => None,
    };

    Json(json!({
        "status": "ok",
        "chain_id": state.config.chain.chain_id,
        "rpc_healthy": rpc_healthy,
    }))
    .into_response()
}
