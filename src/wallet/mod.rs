//! Wallet/session subsystem.
//!
//! # Data Flow
//! ```text
//! config (bridge URLs, key env var) + frame detection
//!     → connector.rs (one WalletConnector per connection method)
//!         ├─ local.rs   (injected: local signer + alloy provider)
//!         └─ eip1193.rs (frame host, hosted SDK, mobile relay)
//!     → session.rs (active connector, ConnectionState watch channel)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data

pub mod connector;
pub mod eip1193;
pub mod local;
pub mod session;
pub mod state;

pub use connector::{ConnectorKind, RelayConnector, WalletConnector, WalletError};
pub use eip1193::{Eip1193Provider, HttpEip1193Provider, ProviderRpcError};
pub use local::LocalSignerConnector;
pub use session::{SessionError, WalletSession};
pub use state::{Account, ConnectionState};
