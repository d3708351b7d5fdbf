//! CrossPay: native-token payments on Base from a wallet connected inside or
//! outside a Farcaster frame.

pub mod blockchain;
pub mod config;
pub mod frame;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod payments;
pub mod wallet;

pub use config::schema::CrossPayConfig;
pub use http::HttpServer;
pub use lifecycle::{bootstrap, CrossPayApp, Shutdown};
