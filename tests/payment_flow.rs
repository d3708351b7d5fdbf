//! Wallet connection and payment submission against mock wallet bridges.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use crosspay::blockchain::{BlockchainResult, ReceiptOutcome};
use crosspay::frame::{FrameSession, HttpFrameHost};
use crosspay::payments::{
    ConfirmationWatcher, PaymentDraft, PaymentError, PaymentFlow, PaymentSubmitter, ReceiptSource,
    SubmissionPath, SubmitError, TxStatus,
};
use crosspay::wallet::{
    ConnectionState, ConnectorKind, HttpEip1193Provider, RelayConnector, WalletConnector,
    WalletSession,
};

mod common;

use common::{MockFrameHost, MockWallet, ACCOUNT, TX_HASH};

const RECIPIENT: &str = "0x000000000000000000000000000000000000dead";

async fn relay_session(wallet: &MockWallet, kind: ConnectorKind) -> Arc<WalletSession> {
    let url = common::start_wallet_bridge(wallet).await;
    let provider = HttpEip1193Provider::new(&url, Duration::from_secs(5)).unwrap();
    let connector: Arc<dyn WalletConnector> = Arc::new(RelayConnector::new(kind, Arc::new(provider)));
    Arc::new(WalletSession::new(vec![connector], false))
}

async fn embedded_frame(wallet: &MockWallet) -> (FrameSession, MockFrameHost) {
    let host = MockFrameHost::embedded(wallet.clone());
    let url = common::start_frame_host(&host).await;
    let bridge = HttpFrameHost::new(&url, Duration::from_secs(5), Duration::from_secs(5)).unwrap();
    (FrameSession::detect(&bridge).await, host)
}

/// Receipts that appear after a fixed number of lookups.
struct MinedAfter {
    remaining: Mutex<u32>,
    success: bool,
}

#[async_trait]
impl ReceiptSource for MinedAfter {
    async fn receipt_outcome(&self, _chain_id: u64, _hash: TxHash) -> BlockchainResult<Option<ReceiptOutcome>> {
        let mut remaining = self.remaining.lock().await;
        if *remaining > 0 {
            *remaining -= 1;
            return Ok(None);
        }
        Ok(Some(ReceiptOutcome {
            block_number: Some(21_000_000),
            success: self.success,
        }))
    }
}

fn watcher(success: bool) -> ConfirmationWatcher {
    ConfirmationWatcher::new(
        Arc::new(MinedAfter {
            remaining: Mutex::new(2),
            success,
        }),
        8453,
        Duration::from_millis(10),
        3,
    )
}

#[tokio::test]
async fn test_relay_connect_and_send() {
    let wallet = MockWallet::approving();
    let session = relay_session(&wallet, ConnectorKind::WalletConnect).await;

    let account = session.connect(ConnectorKind::WalletConnect).await.unwrap();
    assert_eq!(account.address, Address::from_str(ACCOUNT).unwrap());
    assert_eq!(account.chain_id, 8453);
    assert!(matches!(session.state(), ConnectionState::Connected { .. }));

    let submitter = PaymentSubmitter::new(session.clone(), FrameSession::standalone());
    assert_eq!(submitter.path(), SubmissionPath::Generic);

    let submission = submitter
        .submit(&PaymentDraft::new(RECIPIENT, "0.001"))
        .await
        .unwrap();
    assert_eq!(submission.hash, TxHash::from_str(TX_HASH).unwrap());

    let sent = wallet.calls_to("eth_sendTransaction");
    assert_eq!(sent.len(), 1);
    let tx = &sent[0][0];
    assert!(tx["from"].as_str().unwrap().eq_ignore_ascii_case(ACCOUNT));
    assert!(tx["to"].as_str().unwrap().eq_ignore_ascii_case(RECIPIENT));
    assert_eq!(tx["value"], "0x38d7ea4c68000");
}

#[tokio::test]
async fn test_generic_path_requires_connection() {
    let wallet = MockWallet::approving();
    let session = relay_session(&wallet, ConnectorKind::CoinbaseWalletSdk).await;
    let submitter = PaymentSubmitter::new(session, FrameSession::standalone());

    let err = submitter
        .submit(&PaymentDraft::new(RECIPIENT, "0.001"))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::NotConnected));
    assert!(wallet.calls_to("eth_sendTransaction").is_empty());
}

#[tokio::test]
async fn test_user_rejection_is_classified() {
    let wallet = MockWallet::approving();
    wallet.reply(
        "eth_sendTransaction",
        Err((4001, "User rejected the request.".into())),
    );
    let session = relay_session(&wallet, ConnectorKind::WalletConnect).await;
    session.connect_default().await.unwrap();

    let submitter = PaymentSubmitter::new(session, FrameSession::standalone());
    let err = submitter
        .submit(&PaymentDraft::new(RECIPIENT, "1"))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::Payment(PaymentError::UserRejected)));
    assert_eq!(err.code(), "USER_REJECTED");
}

#[tokio::test]
async fn test_insufficient_funds_is_classified() {
    let wallet = MockWallet::approving();
    wallet.reply(
        "eth_sendTransaction",
        Err((-32000, "insufficient funds for gas * price + value".into())),
    );
    let session = relay_session(&wallet, ConnectorKind::WalletConnect).await;
    session.connect_default().await.unwrap();

    let err = PaymentSubmitter::new(session, FrameSession::standalone())
        .submit(&PaymentDraft::new(RECIPIENT, "1"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_FUNDS");
}

#[tokio::test]
async fn test_frame_detection() {
    let wallet = MockWallet::approving();
    let (frame, host) = embedded_frame(&wallet).await;

    assert!(frame.is_in_frame());
    assert_eq!(frame.user().username.as_deref(), Some("dwr"));
    assert_eq!(frame.user().fid, Some(3));
    assert_eq!(frame.connected_address(), Some(Address::from_str(ACCOUNT).unwrap()));
    assert_eq!(host.ready_calls(), 1);
}

#[tokio::test]
async fn test_frame_absent_runs_standalone() {
    let host = MockFrameHost::absent();
    let url = common::start_frame_host(&host).await;
    let bridge = HttpFrameHost::new(&url, Duration::from_secs(5), Duration::from_secs(5)).unwrap();

    let frame = FrameSession::detect(&bridge).await;
    assert!(!frame.is_in_frame());
    assert!(frame.wallet_provider().is_none());
    assert_eq!(host.ready_calls(), 0);
}

#[tokio::test]
async fn test_host_path_sends_raw_transaction() {
    let wallet = MockWallet::approving();
    let (frame, _host) = embedded_frame(&wallet).await;

    // No connector is connected; the host wallet is used directly.
    let session = Arc::new(WalletSession::new(Vec::new(), true));
    let submitter = PaymentSubmitter::new(session, frame);
    assert_eq!(submitter.path(), SubmissionPath::Host);

    let submission = submitter
        .submit(&PaymentDraft::new(RECIPIENT, "0.001"))
        .await
        .unwrap();
    assert_eq!(submission.path, SubmissionPath::Host);

    let sent = wallet.calls_to("eth_sendTransaction");
    assert_eq!(
        sent,
        vec![json!([{
            "from": ACCOUNT,
            "to": RECIPIENT,
            "value": "0x38d7ea4c68000",
        }])]
    );
}

#[tokio::test]
async fn test_invalid_draft_sends_nothing() {
    let wallet = MockWallet::approving();
    let (frame, _host) = embedded_frame(&wallet).await;
    let submitter = PaymentSubmitter::new(Arc::new(WalletSession::new(Vec::new(), true)), frame);

    for (to, amount) in [("", "1"), (RECIPIENT, ""), ("0x1234", "1"), (RECIPIENT, "0"), (RECIPIENT, "abc")] {
        let err = submitter.submit(&PaymentDraft::new(to, amount)).await.unwrap_err();
        assert!(matches!(err, SubmitError::Draft(_)), "{} {}", to, amount);
    }
    assert!(wallet.calls_to("eth_sendTransaction").is_empty());
}

#[tokio::test]
async fn test_flow_tracks_payment_to_success() {
    let wallet = MockWallet::approving();
    let session = relay_session(&wallet, ConnectorKind::WalletConnect).await;
    session.connect_default().await.unwrap();

    let submitter = PaymentSubmitter::new(session.clone(), FrameSession::standalone());
    let flow = PaymentFlow::new(submitter, watcher(true), session, 8453);

    flow.set_recipient(RECIPIENT).await;
    flow.set_amount("0.25").await;
    let record = flow.submit().await.unwrap();
    assert_eq!(record.hash, TxHash::from_str(TX_HASH).unwrap());
    assert_eq!(record.chain_id, 8453);
    assert!(flow.draft().await.is_empty());

    let status = tokio::time::timeout(Duration::from_secs(5), flow.wait_for_terminal())
        .await
        .unwrap();
    match status {
        Some(TxStatus::Success {
            block_number,
            explorer_url,
        }) => {
            assert_eq!(block_number, Some(21_000_000));
            assert_eq!(explorer_url, format!("https://basescan.org/tx/{}", TX_HASH));
        }
        other => panic!("unexpected status {:?}", other),
    }
}

#[tokio::test]
async fn test_flow_reports_reverted_payment() {
    let wallet = MockWallet::approving();
    let session = relay_session(&wallet, ConnectorKind::WalletConnect).await;
    session.connect_default().await.unwrap();

    let submitter = PaymentSubmitter::new(session.clone(), FrameSession::standalone());
    let flow = PaymentFlow::new(submitter, watcher(false), session, 8453);

    flow.set_recipient(RECIPIENT).await;
    flow.set_amount("1").await;
    flow.submit().await.unwrap();

    let status = tokio::time::timeout(Duration::from_secs(5), flow.wait_for_terminal())
        .await
        .unwrap();
    assert_eq!(
        status,
        Some(TxStatus::Error {
            message: "Transaction reverted".into()
        })
    );
}
