//! HTTP surface for the frame host.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, limits, metrics)
//!     → frame.rs   (landing page, manifest, payment QR, health)
//!     → images.rs  (icon / splash / preview PNGs)
//!     → webhook.rs (host event acknowledgement)
//! ```

pub mod frame;
pub mod images;
pub mod server;
pub mod webhook;

pub use server::{AppState, HttpServer};
