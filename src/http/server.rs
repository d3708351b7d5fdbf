//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, body limit, request ID, CORS)
//! - Record request metrics
//! - Serve until the shutdown signal fires

use axum::{
    extract::{MatchedPath, Request},
    http::{header, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::blockchain::BlockchainClient;
use crate::config::CrossPayConfig;
use crate::http::{frame, images, webhook};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<CrossPayConfig>,
    /// Chain client for health reporting; absent when not configured.
    pub client: Option<Arc<BlockchainClient>>,
}

/// HTTP server for the frame surface.
pub struct HttpServer {
    router: Router,
    config: Arc<CrossPayConfig>,
}

impl HttpServer {
    pub fn new(config: Arc<CrossPayConfig>, client: Option<Arc<BlockchainClient>>) -> Self {
        let state = AppState {
            config: config.clone(),
            client,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &CrossPayConfig, state: AppState) -> Router {
        let manifest = Router::new()
            .route("/.well-known/farcaster.json", get(frame::farcaster_manifest))
            .route("/farcaster.json", get(frame::farcaster_manifest))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ));

        Router::new()
            .route("/", get(frame::landing_page))
            .route("/api/og", get(images::og_image))
            .route("/icon.png", get(images::icon_png))
            .route("/splash.png", get(images::splash_png))
            .route("/preview.png", get(images::preview_png))
            .route("/image.png", get(images::preview_png))
            .route(
                "/api/webhook",
                get(webhook::webhook_status).post(webhook::receive_webhook),
            )
            .route("/api/qr", get(frame::payment_qr))
            .route("/health", get(frame::health))
            .merge(manifest)
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(RequestBodyLimitLayer::new(config.server.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for serving or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            app_url = %self.config.frame.app_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &CrossPayConfig {
        &self.config
    }
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&route, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    fn router() -> Router {
        HttpServer::new(Arc::new(CrossPayConfig::default()), None).router()
    }

    async fn send(request: axum::http::Request<Body>) -> Response {
        router().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_manifest_has_cors() {
        for path in ["/.well-known/farcaster.json", "/farcaster.json"] {
            let response = send(get(path)).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
                "*"
            );
            let json = body_json(response).await;
            assert_eq!(json["frame"]["name"], "CrossPay");
        }
    }

    #[tokio::test]
    async fn test_webhook_get() {
        let json = body_json(send(get("/api/webhook")).await).await;
        assert_eq!(
            json,
            serde_json::json!({
                "status": "ok",
                "app": "CrossPay",
                "version": "2.0",
                "webhook": "active"
            })
        );
    }

    #[tokio::test]
    async fn test_webhook_post() {
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"event":"frame_added"}"#))
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "received");
        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert!(timestamp.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_webhook_post_invalid_body() {
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/webhook")
            .body(Body::from("{not json"))
            .unwrap();
        let response = send(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Invalid request" })
        );
    }

    #[tokio::test]
    async fn test_request_id_propagated() {
        let response = send(get("/health")).await;
        assert!(response.headers().contains_key("x-request-id"));
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json["rpc_healthy"].is_null());
    }

    #[tokio::test]
    async fn test_image_aliases_are_png() {
        for path in ["/api/og?type=icon", "/icon.png", "/splash.png", "/image.png"] {
            let response = send(get(path)).await;
            assert_eq!(response.status(), StatusCode::OK, "{}", path);
            assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        }
    }

    #[tokio::test]
    async fn test_qr_endpoint() {
        let ok = send(get(
            "/api/qr?address=0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266&amount=0.5",
        ))
        .await;
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(ok.headers()[header::CONTENT_TYPE], "image/svg+xml");

        let bad = send(get("/api/qr?address=0x1234")).await;
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let bad_amount = send(get(
            "/api/qr?address=0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266&amount=-1",
        ))
        .await;
        assert_eq!(bad_amount.status(), StatusCode::BAD_REQUEST);
    }
}
