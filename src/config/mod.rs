//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → CrossPayConfig (validated, immutable)
//!     → shared via Arc / clones to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError, CONFIG_PATH_ENV_VAR};
pub use schema::{
    ChainConfig, CrossPayConfig, FrameConfig, LogFormat, ObservabilityConfig, ServerConfig,
    WalletConfig,
};
