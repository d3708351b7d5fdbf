//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::CrossPayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV_VAR: &str = "CROSSPAY_CONFIG";

/// Environment variable overriding `chain.rpc_url`.
pub const RPC_URL_ENV_VAR: &str = "CROSSPAY_RPC_URL";

/// Environment variable overriding `wallet.walletconnect_project_id`.
pub const WC_PROJECT_ID_ENV_VAR: &str = "CROSSPAY_WC_PROJECT_ID";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<CrossPayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse, apply environment overrides and validate configuration text.
pub fn parse_config(content: &str) -> Result<CrossPayConfig, ConfigError> {
    let mut config: CrossPayConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    apply_env_overrides(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load from `path` when given, otherwise start from defaults.
///
/// Defaults still get environment overrides and validation.
pub fn load_or_default(path: Option<&Path>) -> Result<CrossPayConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = CrossPayConfig::default();
            apply_env_overrides(&mut config);
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

fn apply_env_overrides(config: &mut CrossPayConfig) {
    if let Ok(rpc_url) = std::env::var(RPC_URL_ENV_VAR) {
        config.chain.rpc_url = rpc_url;
    }
    if let Ok(project_id) = std::env::var(WC_PROJECT_ID_ENV_VAR) {
        config.wallet.walletconnect_project_id = project_id;
    }
}
