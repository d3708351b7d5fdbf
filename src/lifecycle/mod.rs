//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → chain client → frame detection → connectors → session → flow
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server stops accepting → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, CrossPayApp, StartupError};
