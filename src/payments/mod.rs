//! Payment subsystem.
//!
//! # Data Flow
//! ```text
//! PaymentDraft (recipient, amount)
//!     → draft.rs (address + amount validation, wei conversion)
//!     → submitter.rs (host wallet raw request | active connector send)
//!     → flow.rs (tracked TransactionRecord, generation counter)
//!     → watcher.rs (receipt polling → Success | Error)
//! ```
//!
//! `uri.rs` and `qr.rs` cover the receiving side.

pub mod draft;
pub mod errors;
pub mod flow;
pub mod qr;
pub mod submitter;
pub mod types;
pub mod uri;
pub mod watcher;

pub use draft::{DraftError, PaymentDraft, ValidatedPayment};
pub use errors::{PaymentError, SubmitError};
pub use flow::PaymentFlow;
pub use submitter::PaymentSubmitter;
pub use types::{Submission, SubmissionPath, TransactionRecord, TxStatus};
pub use uri::build_payment_uri;
pub use watcher::{ConfirmationWatcher, ReceiptSource};
