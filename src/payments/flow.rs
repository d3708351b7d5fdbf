//! Payment flow: draft → submit → watch.
//!
//! # Responsibilities
//! - Own the draft fields and the single tracked transaction
//! - Allow one submission at a time
//! - Start a confirmation watch for every accepted payment
//!
//! # Design Decisions
//! - A new payment replaces the tracked record without aborting the previous
//!   watch; stale watches are ignored through a generation counter
//! - Record changes are published on a watch channel
//! - The submit guard is a mutex taken with `try_lock`, so a dropped submit
//!   releases it

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::payments::draft::PaymentDraft;
use crate::payments::errors::SubmitError;
use crate::payments::submitter::PaymentSubmitter;
use crate::payments::types::{Submission, TransactionRecord, TxStatus};
use crate::payments::watcher::ConfirmationWatcher;
use crate::wallet::WalletSession;

pub struct PaymentFlow {
    submitter: PaymentSubmitter,
    watcher: ConfirmationWatcher,
    session: Arc<WalletSession>,
    default_chain_id: u64,
    draft: Mutex<PaymentDraft>,
    generation: Arc<AtomicU64>,
    record: Arc<watch::Sender<Option<TransactionRecord>>>,
    submitting: Mutex<()>,
}

impl PaymentFlow {
    pub fn new(
        submitter: PaymentSubmitter,
        watcher: ConfirmationWatcher,
        session: Arc<WalletSession>,
        default_chain_id: u64,
    ) -> Self {
        let (record, _) = watch::channel(None);
        Self {
            submitter,
            watcher,
            session,
            default_chain_id,
            draft: Mutex::new(PaymentDraft::default()),
            generation: Arc::new(AtomicU64::new(0)),
            record: Arc::new(record),
            submitting: Mutex::new(()),
        }
    }

    pub async fn set_recipient(&self, recipient: impl Into<String>) {
        self.draft.lock().await.recipient = recipient.into();
    }

    pub async fn set_amount(&self, amount: impl Into<String>) {
        self.draft.lock().await.amount = amount.into();
    }

    pub async fn draft(&self) -> PaymentDraft {
        self.draft.lock().await.clone()
    }

    /// Currently tracked transaction.
    pub fn current(&self) -> Option<TransactionRecord> {
        self.record.borrow().clone()
    }

    /// Observe the tracked transaction.
    pub fn subscribe(&self) -> watch::Receiver<Option<TransactionRecord>> {
        self.record.subscribe()
    }

    /// Stop tracking. A running watch keeps polling but its updates are
    /// dropped.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.record.send_replace(None);
    }

    /// Submit the current draft.
    ///
    /// On success the draft is cleared, the returned record becomes the
    /// tracked transaction and a watch is started in the background.
    pub async fn submit(&self) -> Result<TransactionRecord, SubmitError> {
        let _submitting = self.submitting.try_lock().map_err(|_| SubmitError::Busy)?;
        self.submit_current().await
    }

    async fn submit_current(&self) -> Result<TransactionRecord, SubmitError> {
        let draft = self.draft.lock().await.clone();
        let Submission { hash, .. } = self.submitter.submit(&draft).await?;
        self.draft.lock().await.clear();

        let chain_id = self
            .session
            .state()
            .chain_id()
            .unwrap_or(self.default_chain_id);
        let record = TransactionRecord::pending(hash, chain_id);

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.record.send_replace(Some(record.clone()));
        self.spawn_watch(record.clone(), generation);

        Ok(record)
    }

    fn spawn_watch(&self, record: TransactionRecord, generation: u64) {
        let watcher = self.watcher.for_chain(record.chain_id);
        let current = self.generation.clone();
        let sender = self.record.clone();
        let hash = record.hash;

        tokio::spawn(async move {
            watcher
                .watch(hash, move |status| {
                    if current.load(Ordering::Acquire) != generation {
                        return;
                    }
                    sender.send_if_modified(|tracked| match tracked {
                        Some(r) if r.hash == hash && r.status != status => {
                            r.status = status;
                            true
                        }
                        _ => false,
                    });
                })
                .await;
        });
    }

    /// Wait until the tracked transaction reaches a terminal status.
    ///
    /// Returns `None` if tracking is reset or replaced first.
    pub async fn wait_for_terminal(&self) -> Option<TxStatus> {
        let mut rx = self.subscribe();
        let hash = rx.borrow().as_ref()?.hash;
        loop {
            {
                let current = rx.borrow_and_update();
                match current.as_ref() {
                    Some(r) if r.hash != hash => return None,
                    Some(r) if r.status.is_terminal() => return Some(r.status.clone()),
                    Some(_) => {}
                    None => return None,
                }
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::{BlockchainResult, ReceiptOutcome};
    use crate::frame::FrameSession;
    use crate::payments::watcher::tests::{mined, ScriptedReceipts};
    use crate::wallet::eip1193::tests::ScriptedProvider;
    use crate::wallet::eip1193::{Eip1193Provider, ProviderRpcError};
    use crate::wallet::{ConnectorKind, RelayConnector, WalletConnector};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    const SENDER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
    const RECIPIENT: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

    fn wallet() -> ScriptedProvider {
        ScriptedProvider::new(vec![
            ("eth_requestAccounts", Ok(json!([SENDER]))),
            ("eth_chainId", Ok(json!("0x14a34"))),
            ("eth_sendTransaction", Ok(json!(format!("0x{}", "ef".repeat(32))))),
        ])
    }

    /// Wallet whose first `eth_sendTransaction` never answers.
    struct StallFirstSend {
        inner: ScriptedProvider,
        stalled: AtomicBool,
    }

    #[async_trait]
    impl Eip1193Provider for StallFirstSend {
        async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
            if method == "eth_sendTransaction" && !self.stalled.swap(true, Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            self.inner.request(method, params).await
        }
    }

    async fn flow_with(
        provider: Arc<dyn Eip1193Provider>,
        receipts: Vec<BlockchainResult<Option<ReceiptOutcome>>>,
    ) -> (PaymentFlow, Arc<ScriptedReceipts>) {
        let connector: Arc<dyn WalletConnector> =
            Arc::new(RelayConnector::new(ConnectorKind::Injected, provider));
        let session = Arc::new(WalletSession::new(vec![connector], false));
        session.connect(ConnectorKind::Injected).await.unwrap();

        let receipts = Arc::new(ScriptedReceipts::new(receipts));
        let submitter = PaymentSubmitter::new(session.clone(), FrameSession::standalone());
        let watcher = ConfirmationWatcher::new(receipts.clone(), 8453, Duration::from_millis(5), 3);
        (PaymentFlow::new(submitter, watcher, session, 8453), receipts)
    }

    async fn flow(
        receipts: Vec<BlockchainResult<Option<ReceiptOutcome>>>,
    ) -> (PaymentFlow, Arc<ScriptedProvider>) {
        let provider = Arc::new(wallet());
        let (flow, _) = flow_with(provider.clone(), receipts).await;
        (flow, provider)
    }

    #[tokio::test]
    async fn test_submit_tracks_and_confirms() {
        let provider = Arc::new(wallet());
        let (flow, receipts) = flow_with(provider.clone(), vec![Ok(None), mined(true)]).await;
        flow.set_recipient(RECIPIENT).await;
        flow.set_amount("0.25").await;

        let record = flow.submit().await.unwrap();
        assert_eq!(record.chain_id, 84532);
        assert_eq!(record.status, TxStatus::Pending);
        assert!(flow.draft().await.is_empty());

        let status = tokio::time::timeout(Duration::from_secs(5), flow.wait_for_terminal())
            .await
            .unwrap()
            .unwrap();
        match status {
            TxStatus::Success { explorer_url, .. } => {
                assert!(explorer_url.starts_with("https://sepolia.basescan.org/tx/"))
            }
            other => panic!("unexpected {:?}", other),
        }

        // The wallet is on Base Sepolia, so receipts are looked up there.
        assert!(receipts.chains.lock().unwrap().iter().all(|&id| id == 84532));

        let sent = provider.calls_to("eth_sendTransaction");
        assert!(sent[0][0]["from"].as_str().unwrap().eq_ignore_ascii_case(SENDER));
    }

    #[tokio::test]
    async fn test_cancelled_submit_releases_guard() {
        let provider = Arc::new(StallFirstSend {
            inner: wallet(),
            stalled: AtomicBool::new(false),
        });
        let (flow, _) = flow_with(provider, vec![mined(true)]).await;
        flow.set_recipient(RECIPIENT).await;
        flow.set_amount("1").await;

        let first = tokio::time::timeout(Duration::from_millis(50), flow.submit()).await;
        assert!(first.is_err());

        let second = tokio::time::timeout(Duration::from_secs(5), flow.submit())
            .await
            .unwrap();
        assert!(second.is_ok(), "{:?}", second.err());
    }

    #[tokio::test]
    async fn test_concurrent_submit_is_busy() {
        let provider = Arc::new(StallFirstSend {
            inner: wallet(),
            stalled: AtomicBool::new(false),
        });
        let (flow, _) = flow_with(provider, vec![mined(true)]).await;
        let flow = Arc::new(flow);
        flow.set_recipient(RECIPIENT).await;
        flow.set_amount("1").await;

        let stalled = tokio::spawn({
            let flow = flow.clone();
            async move { flow.submit().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(matches!(flow.submit().await, Err(SubmitError::Busy)));
        stalled.abort();
    }

    #[tokio::test]
    async fn test_invalid_draft_is_kept() {
        let (flow, provider) = flow(vec![mined(true)]).await;
        flow.set_recipient("not-an-address").await;
        flow.set_amount("1").await;

        assert!(matches!(flow.submit().await, Err(SubmitError::Draft(_))));
        assert_eq!(flow.draft().await.recipient, "not-an-address");
        assert!(flow.current().is_none());
        assert!(provider.calls_to("eth_sendTransaction").is_empty());
    }

    #[tokio::test]
    async fn test_reset_ignores_running_watch() {
        let (flow, _) = flow(vec![Ok(None), Ok(None), mined(true)]).await;
        flow.set_recipient(RECIPIENT).await;
        flow.set_amount("1").await;
        flow.submit().await.unwrap();

        flow.reset();
        assert!(flow.current().is_none());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(flow.current().is_none());
    }

    #[tokio::test]
    async fn test_new_payment_replaces_record() {
        let (flow, provider) = flow(vec![Ok(None)]).await;
        for _ in 0..2 {
            flow.set_recipient(RECIPIENT).await;
            flow.set_amount("1").await;
            flow.submit().await.unwrap();
        }
        assert_eq!(provider.calls_to("eth_sendTransaction").len(), 2);
        assert!(flow.current().is_some());
    }
}
