//! Frame-host context.
//!
//! # Responsibilities
//! - Detect whether the app is running inside the social-network host
//! - Fetch the host-provided user identity
//! - Signal readiness and expose the host's wallet provider
//!
//! Detection failures are never fatal: anything short of a usable context
//! means "standalone".

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wallet::eip1193::{self, Eip1193Provider, HttpEip1193Provider};

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Frame host unreachable: {0}")]
    Transport(String),

    #[error("Invalid frame host response: {0}")]
    InvalidResponse(String),

    #[error("Invalid frame host URL: {0}")]
    InvalidUrl(String),
}

/// Identity of the host user. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameUser {
    #[serde(default)]
    pub fid: Option<u64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub pfp_url: Option<String>,
}

/// Context object handed over by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameContext {
    #[serde(default)]
    pub user: FrameUser,
}

/// The host environment the app may be embedded in.
#[async_trait]
pub trait FrameHost: Send + Sync {
    /// Host context, or `None` when not embedded.
    async fn context(&self) -> Result<Option<FrameContext>, FrameError>;

    /// Tell the host the app has finished loading.
    async fn ready(&self) -> Result<(), FrameError>;

    /// The host's wallet, when it offers one.
    fn eth_provider(&self) -> Option<Arc<dyn Eip1193Provider>>;
}

/// Frame host reached over its HTTP bridge.
///
/// Layout under the bridge base URL:
/// - `GET  context` → context JSON, `null` or 404 when not embedded
/// - `POST ready`
/// - `POST wallet` → EIP-1193 JSON-RPC
pub struct HttpFrameHost {
    base: url::Url,
    http: reqwest::Client,
    wallet: Arc<HttpEip1193Provider>,
}

impl HttpFrameHost {
    pub fn new(base_url: &str, timeout: Duration, wallet_timeout: Duration) -> Result<Self, FrameError> {
        let mut base = url::Url::parse(base_url)
            .map_err(|e| FrameError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FrameError::Transport(e.to_string()))?;

        let wallet_url = join(&base, "wallet")?;
        let wallet = HttpEip1193Provider::new(wallet_url.as_str(), wallet_timeout)
            .map_err(|e| FrameError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            base,
            http,
            wallet: Arc::new(wallet),
        })
    }
}

fn join(base: &url::Url, path: &str) -> Result<url::Url, FrameError> {
    base.join(path)
        .map_err(|e| FrameError::InvalidUrl(format!("{}{}: {}", base, path, e)))
}

#[async_trait]
impl FrameHost for HttpFrameHost {
    async fn context(&self) -> Result<Option<FrameContext>, FrameError> {
        let response = self
            .http
            .get(join(&self.base, "context")?)
            .send()
            .await
            .map_err(|e| FrameError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(FrameError::Transport(format!(
                "context request returned HTTP {}",
                response.status()
            )));
        }

        response
            .json::<Option<FrameContext>>()
            .await
            .map_err(|e| FrameError::InvalidResponse(e.to_string()))
    }

    async fn ready(&self) -> Result<(), FrameError> {
        self.http
            .post(join(&self.base, "ready")?)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FrameError::Transport(e.to_string()))?;
        Ok(())
    }

    fn eth_provider(&self) -> Option<Arc<dyn Eip1193Provider>> {
        Some(self.wallet.clone())
    }
}

/// What was learned about the host at startup.
#[derive(Clone, Default)]
pub struct FrameSession {
    context: Option<FrameContext>,
    connected_address: Option<Address>,
    provider: Option<Arc<dyn Eip1193Provider>>,
}

impl std::fmt::Debug for FrameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSession")
            .field("context", &self.context)
            .field("connected_address", &self.connected_address)
            .field("has_provider", &self.provider.is_some())
            .finish()
    }
}

impl FrameSession {
    /// Not embedded in any host.
    pub fn standalone() -> Self {
        Self::default()
    }

    /// Detect the frame host behind `host`.
    ///
    /// When a context is present the host is told the app is ready and its
    /// wallet is asked for an account. Failures of either step are logged
    /// and otherwise ignored.
    pub async fn detect(host: &dyn FrameHost) -> Self {
        let context = match host.context().await {
            Ok(Some(context)) => context,
            Ok(None) => {
                tracing::debug!("No frame context, running standalone");
                return Self::standalone();
            }
            Err(e) => {
                tracing::debug!(error = %e, "Frame detection failed, running standalone");
                return Self::standalone();
            }
        };

        if let Err(e) = host.ready().await {
            tracing::warn!(error = %e, "Failed to signal frame readiness");
        }

        let provider = host.eth_provider();
        let connected_address = match &provider {
            Some(p) => match eip1193::request_account(p.as_ref()).await {
                Ok(address) => Some(address),
                Err(e) => {
                    tracing::debug!(error = %e, "Frame wallet returned no account");
                    None
                }
            },
            None => None,
        };

        tracing::info!(
            fid = context.user.fid,
            username = context.user.username.as_deref(),
            connected = connected_address.is_some(),
            "Running inside frame host"
        );

        Self {
            context: Some(context),
            connected_address,
            provider,
        }
    }

    pub fn is_in_frame(&self) -> bool {
        self.context.is_some()
    }

    pub fn context(&self) -> Option<&FrameContext> {
        self.context.as_ref()
    }

    /// Host user; all fields empty when standalone.
    pub fn user(&self) -> FrameUser {
        self.context
            .as_ref()
            .map(|c| c.user.clone())
            .unwrap_or_default()
    }

    /// Address the host wallet reported at startup.
    pub fn connected_address(&self) -> Option<Address> {
        self.connected_address
    }

    /// Host wallet, only while embedded.
    pub fn wallet_provider(&self) -> Option<Arc<dyn Eip1193Provider>> {
        if self.is_in_frame() {
            self.provider.clone()
        } else {
            None
        }
    }
}
