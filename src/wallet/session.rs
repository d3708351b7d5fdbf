//! Wallet session: which connector is active and what it is connected to.
//!
//! # Responsibilities
//! - Offer the configured connectors
//! - Run at most one connection attempt at a time
//! - Publish connection state changes to observers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::TxHash;
use alloy::rpc::types::TransactionRequest;
use thiserror::Error;
use tokio::sync::{watch, RwLock};

use crate::blockchain::chains;
use crate::wallet::connector::{ConnectorKind, WalletConnector, WalletError};
use crate::wallet::state::{Account, ConnectionState};

/// Errors surfaced to the user by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Connecting failed; the message is meant for the user.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Another connection attempt is still running.
    #[error("A connection attempt is already in progress")]
    ConnectionInProgress,

    /// The requested connector is not configured.
    #[error("Connector '{0}' is not available")]
    Unavailable(ConnectorKind),

    /// No connector is configured at all.
    #[error("No wallet connectors configured")]
    NoConnectors,

    /// Operation needs a connected wallet.
    #[error("Wallet not connected")]
    NotConnected,

    /// Chain outside the supported list.
    #[error("Unsupported chain {0}")]
    UnsupportedChain(u64),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Holds the available connectors and the current connection.
pub struct WalletSession {
    connectors: Vec<Arc<dyn WalletConnector>>,
    active: RwLock<Option<Arc<dyn WalletConnector>>>,
    state: watch::Sender<ConnectionState>,
    connecting: AtomicBool,
    in_frame: bool,
}

impl WalletSession {
    /// Create a session over `connectors`.
    ///
    /// `in_frame` selects the frame host's wallet as the default connector.
    pub fn new(connectors: Vec<Arc<dyn WalletConnector>>, in_frame: bool) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            connectors,
            active: RwLock::new(None),
            state,
            connecting: AtomicBool::new(false),
            in_frame,
        }
    }

    /// Connection methods on offer.
    pub fn connectors(&self) -> Vec<ConnectorKind> {
        self.connectors.iter().map(|c| c.kind()).collect()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// Observe connection state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Connected account, if any.
    pub fn account(&self) -> Option<Account> {
        self.state.borrow().account()
    }

    fn find(&self, kind: ConnectorKind) -> Option<Arc<dyn WalletConnector>> {
        self.connectors.iter().find(|c| c.kind() == kind).cloned()
    }

    /// The connector the connect button uses: the host wallet inside the
    /// frame, else the hosted wallet SDK, else whatever is configured first.
    pub fn default_connector(&self) -> Option<ConnectorKind> {
        let preferred = if self.in_frame {
            ConnectorKind::FarcasterFrame
        } else {
            ConnectorKind::CoinbaseWalletSdk
        };
        self.find(preferred)
            .or_else(|| self.connectors.first().cloned())
            .map(|c| c.kind())
    }

    /// Connect with the default connector.
    pub async fn connect_default(&self) -> Result<Account, SessionError> {
        let kind = self.default_connector().ok_or(SessionError::NoConnectors)?;
        self.connect(kind).await
    }

    /// Connect using `kind`.
    ///
    /// Replaces any existing connection on success. On failure, or when the
    /// returned future is dropped before it finishes, the session ends up
    /// disconnected and a new attempt can start.
    pub async fn connect(&self, kind: ConnectorKind) -> Result<Account, SessionError> {
        let connector = self.find(kind).ok_or(SessionError::Unavailable(kind))?;

        if self
            .connecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::ConnectionInProgress);
        }
        let mut attempt = ConnectAttempt {
            session: self,
            finished: false,
        };

        self.state.send_replace(ConnectionState::Connecting);
        let result = connector.connect().await;

        let outcome = match result {
            Ok(account) => {
                *self.active.write().await = Some(connector);
                self.state.send_replace(ConnectionState::from(account));
                Ok(account)
            }
            Err(e) => {
                tracing::warn!(connector = %kind, error = %e, "Wallet connection failed");
                *self.active.write().await = None;
                self.state.send_replace(ConnectionState::Disconnected);
                Err(SessionError::ConnectionFailed(e.to_string()))
            }
        };

        attempt.finished = true;
        outcome
    }

    /// Disconnect the active connector, if any.
    pub async fn disconnect(&self) {
        if let Some(connector) = self.active.write().await.take() {
            connector.disconnect().await;
        }
        self.state.send_replace(ConnectionState::Disconnected);
    }

    /// Kind of the active connector.
    pub async fn active_kind(&self) -> Option<ConnectorKind> {
        self.active.read().await.as_ref().map(|c| c.kind())
    }

    /// Send through the active connector.
    ///
    /// A transaction without `from` is sent from the connected account.
    pub async fn send_transaction(&self, mut tx: TransactionRequest) -> Result<TxHash, SessionError> {
        let connector = self
            .active
            .read()
            .await
            .clone()
            .ok_or(SessionError::NotConnected)?;
        if tx.from.is_none() {
            if let Some(account) = self.account() {
                tx.set_from(account.address);
            }
        }
        Ok(connector.send_transaction(tx).await?)
    }

    /// Switch the connected wallet to another supported chain.
    pub async fn switch_chain(&self, chain_id: u64) -> Result<(), SessionError> {
        if chains::find_chain(chain_id).is_none() {
            return Err(SessionError::UnsupportedChain(chain_id));
        }
        let connector = self
            .active
            .read()
            .await
            .clone()
            .ok_or(SessionError::NotConnected)?;

        if self.state.borrow().chain_id() == Some(chain_id) {
            return Ok(());
        }

        connector.switch_chain(chain_id).await?;
        self.state.send_modify(|state| {
            if let ConnectionState::Connected { chain_id: current, .. } = state {
                *current = chain_id;
            }
        });
        tracing::info!(connector = %connector.kind(), chain_id, "Switched chain");
        Ok(())
    }
}

/// Marks a connect attempt as running until dropped.
struct ConnectAttempt<'a> {
    session: &'a WalletSession,
    finished: bool,
}

impl Drop for ConnectAttempt<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("Connection attempt abandoned");
            if let Ok(mut active) = self.session.active.try_write() {
                *active = None;
            }
            self.session.state.send_replace(ConnectionState::Disconnected);
        }
        self.session.connecting.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakeConnector {
        kind: ConnectorKind,
        fail: bool,
        delay: Duration,
        connects: AtomicUsize,
        sent: Arc<Mutex<Vec<TransactionRequest>>>,
    }

    impl FakeConnector {
        fn new(kind: ConnectorKind) -> Self {
            Self {
                kind,
                fail: false,
                delay: Duration::ZERO,
                connects: AtomicUsize::new(0),
                sent: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl WalletConnector for FakeConnector {
        fn kind(&self) -> ConnectorKind {
            self.kind
        }

        async fn connect(&self) -> Result<Account, WalletError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(WalletError::Transport("popup closed".to_string()));
            }
            Ok(Account {
                address: Address::repeat_byte(0x42),
                chain_id: 8453,
            })
        }

        async fn disconnect(&self) {}

        async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError> {
            self.sent.lock().unwrap().push(tx);
            Ok(TxHash::repeat_byte(0x01))
        }

        async fn switch_chain(&self, _chain_id: u64) -> Result<(), WalletError> {
            Ok(())
        }
    }

    fn session(connectors: Vec<FakeConnector>, in_frame: bool) -> WalletSession {
        WalletSession::new(
            connectors
                .into_iter()
                .map(|c| Arc::new(c) as Arc<dyn WalletConnector>)
                .collect(),
            in_frame,
        )
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let session = session(vec![FakeConnector::new(ConnectorKind::Injected)], false);
        let mut updates = session.subscribe();

        let account = session.connect(ConnectorKind::Injected).await.unwrap();
        assert_eq!(account.chain_id, 8453);
        assert!(session.state().is_connected());
        assert!(updates.has_changed().unwrap());
        assert_eq!(*updates.borrow_and_update(), ConnectionState::from(account));

        session.disconnect().await;
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(session.active_kind().await.is_none());
    }

    #[tokio::test]
    async fn test_failed_connect_reports_message() {
        let mut failing = FakeConnector::new(ConnectorKind::WalletConnect);
        failing.fail = true;
        let session = session(vec![failing], false);

        let err = session.connect(ConnectorKind::WalletConnect).await.unwrap_err();
        assert_eq!(err.to_string(), "Connection failed: popup closed");
        assert_eq!(session.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_unconfigured_connector() {
        let session = session(vec![FakeConnector::new(ConnectorKind::Injected)], false);
        assert!(matches!(
            session.connect(ConnectorKind::FarcasterFrame).await,
            Err(SessionError::Unavailable(ConnectorKind::FarcasterFrame))
        ));
    }

    #[tokio::test]
    async fn test_single_connection_attempt() {
        let mut slow = FakeConnector::new(ConnectorKind::Injected);
        slow.delay = Duration::from_millis(100);
        let session = Arc::new(session(vec![slow], false));

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.connect(ConnectorKind::Injected).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(session.state(), ConnectionState::Connecting);
        assert!(matches!(
            session.connect(ConnectorKind::Injected).await,
            Err(SessionError::ConnectionInProgress)
        ));
        assert!(first.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_default_connector_prefers_frame_when_embedded() {
        let kinds = || {
            vec![
                FakeConnector::new(ConnectorKind::Injected),
                FakeConnector::new(ConnectorKind::CoinbaseWalletSdk),
                FakeConnector::new(ConnectorKind::FarcasterFrame),
            ]
        };
        assert_eq!(
            session(kinds(), true).default_connector(),
            Some(ConnectorKind::FarcasterFrame)
        );
        assert_eq!(
            session(kinds(), false).default_connector(),
            Some(ConnectorKind::CoinbaseWalletSdk)
        );
        assert_eq!(
            session(vec![FakeConnector::new(ConnectorKind::Injected)], false).default_connector(),
            Some(ConnectorKind::Injected)
        );
        assert!(matches!(
            session(vec![], false).connect_default().await,
            Err(SessionError::NoConnectors)
        ));
    }

    #[tokio::test]
    async fn test_switch_chain_updates_state() {
        let session = session(vec![FakeConnector::new(ConnectorKind::Injected)], false);
        assert!(matches!(
            session.switch_chain(84532).await,
            Err(SessionError::NotConnected)
        ));

        session.connect(ConnectorKind::Injected).await.unwrap();
        session.switch_chain(84532).await.unwrap();
        assert_eq!(session.state().chain_id(), Some(84532));

        assert!(matches!(
            session.switch_chain(137).await,
            Err(SessionError::UnsupportedChain(137))
        ));
    }

    #[tokio::test]
    async fn test_send_requires_connection() {
        let session = session(vec![FakeConnector::new(ConnectorKind::Injected)], false);
        assert!(matches!(
            session.send_transaction(TransactionRequest::default()).await,
            Err(SessionError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_send_fills_connected_sender() {
        let connector = FakeConnector::new(ConnectorKind::Injected);
        let sent = connector.sent.clone();
        let session = session(vec![connector], false);
        session.connect(ConnectorKind::Injected).await.unwrap();

        let to = Address::repeat_byte(0x07);
        session
            .send_transaction(TransactionRequest::default().with_to(to))
            .await
            .unwrap();

        let explicit = Address::repeat_byte(0x09);
        session
            .send_transaction(TransactionRequest::default().with_to(to).with_from(explicit))
            .await
            .unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].from, Some(Address::repeat_byte(0x42)));
        assert_eq!(sent[1].from, Some(explicit));
    }

    #[tokio::test]
    async fn test_cancelled_connect_can_be_retried() {
        let mut slow = FakeConnector::new(ConnectorKind::Injected);
        slow.delay = Duration::from_secs(60);
        let session = session(vec![slow, FakeConnector::new(ConnectorKind::WalletConnect)], false);

        let cancelled =
            tokio::time::timeout(Duration::from_millis(20), session.connect(ConnectorKind::Injected)).await;
        assert!(cancelled.is_err());
        assert_eq!(session.state(), ConnectionState::Disconnected);

        let account = session.connect(ConnectorKind::WalletConnect).await.unwrap();
        assert_eq!(session.state(), ConnectionState::from(account));
        assert_eq!(session.active_kind().await, Some(ConnectorKind::WalletConnect));
    }
}
