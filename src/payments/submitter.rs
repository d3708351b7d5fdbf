//! Payment submission.
//!
//! # Responsibilities
//! - Validate the draft and convert the amount to wei
//! - Pick the submission path: the frame host's wallet when embedded,
//!   otherwise the session's active connector
//! - Classify failures
//!
//! # Design Decisions
//! - Both paths share validation and conversion; fee estimation is left to
//!   the wallet on either path
//! - Nothing is sent unless the draft validates

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::Address;
use alloy::rpc::types::TransactionRequest;
use serde_json::json;

use crate::frame::FrameSession;
use crate::observability::metrics;
use crate::payments::draft::{PaymentDraft, ValidatedPayment};
use crate::payments::errors::{PaymentError, SubmitError};
use crate::payments::types::{Submission, SubmissionPath};
use crate::wallet::eip1193::{self, Eip1193Provider};
use crate::wallet::WalletSession;

pub struct PaymentSubmitter {
    session: Arc<WalletSession>,
    frame: FrameSession,
}

impl PaymentSubmitter {
    pub fn new(session: Arc<WalletSession>, frame: FrameSession) -> Self {
        Self { session, frame }
    }

    /// Path the next submission will take.
    pub fn path(&self) -> SubmissionPath {
        if self.frame.wallet_provider().is_some() {
            SubmissionPath::Host
        } else {
            SubmissionPath::Generic
        }
    }

    /// Validate `draft` and hand it to a wallet.
    pub async fn submit(&self, draft: &PaymentDraft) -> Result<Submission, SubmitError> {
        let payment = draft.validate()?;
        let path = self.path();

        let result = match self.frame.wallet_provider() {
            Some(provider) => self.submit_via_host(provider.as_ref(), payment).await,
            None => self.submit_via_connector(payment).await,
        };

        match result {
            Ok(hash) => {
                metrics::record_payment_submitted(path.as_str());
                tracing::info!(
                    tx_hash = %hash,
                    path = path.as_str(),
                    to = %payment.to,
                    value = %payment.value,
                    "Payment submitted"
                );
                Ok(Submission {
                    hash,
                    path,
                    to: payment.to,
                    value: payment.value,
                })
            }
            Err(e) => {
                metrics::record_payment_failed(e.code());
                tracing::warn!(path = path.as_str(), code = e.code(), error = %e, "Payment failed");
                Err(e)
            }
        }
    }

    async fn submit_via_host(
        &self,
        provider: &dyn Eip1193Provider,
        payment: ValidatedPayment,
    ) -> Result<alloy::primitives::TxHash, SubmitError> {
        let from = match self.sender() {
            Some(address) => address,
            None => eip1193::request_account(provider)
                .await
                .map_err(|e| PaymentError::from_rpc(&e))?,
        };

        let transaction = json!({
            "from": alloy::hex::encode_prefixed(from),
            "to": alloy::hex::encode_prefixed(payment.to),
            "value": format!("0x{:x}", payment.value),
        });

        eip1193::send_transaction(provider, transaction)
            .await
            .map_err(|e| SubmitError::Payment(PaymentError::from_rpc(&e)))
    }

    async fn submit_via_connector(
        &self,
        payment: ValidatedPayment,
    ) -> Result<alloy::primitives::TxHash, SubmitError> {
        if !self.session.state().is_connected() {
            return Err(SubmitError::NotConnected);
        }
        let tx = TransactionRequest::default()
            .with_to(payment.to)
            .with_value(payment.value);
        Ok(self.session.send_transaction(tx).await?)
    }

    fn sender(&self) -> Option<Address> {
        self.frame
            .connected_address()
            .or_else(|| self.session.account().map(|a| a.address))
    }
}
