//! The [`Connection`] trait and confirmation polling.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sdk_core::{Address, Blockhash, Commitment, TxSignature};
use serde::{Deserialize, Serialize};

use crate::{HoldingAccount, TokenType, Transaction, TransactionError, TransportError};

// ---------------------------------------------------------------------------
// Status types
// ---------------------------------------------------------------------------

/// Ledger-reported state of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    /// Slot the transaction executed in.
    pub slot: u64,
    /// Current commitment of that slot.
    pub commitment: Commitment,
    /// Execution failure, if the transaction ran but was rolled back.
    pub err: Option<TransactionError>,
}

/// Result of waiting for a transaction to reach a commitment level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub signature: TxSignature,
    pub commitment: Commitment,
    pub err: Option<TransactionError>,
}

impl Confirmation {
    /// Returns `true` if the transaction executed without error.
    pub fn is_success(&self) -> bool {
        self.err.is_none()
    }
}

// ---------------------------------------------------------------------------
// Connection trait
// ---------------------------------------------------------------------------

/// Async access to a ledger node.
///
/// Every method is a single request except [`Connection::confirm_transaction`],
/// which waits. Submission never implies success: callers confirm and then
/// inspect [`Confirmation::err`].
pub trait Connection: Send + Sync {
    /// Ask the faucet to credit `amount` native units to `address`.
    fn request_funding(
        &self,
        address: &Address,
        amount: u64,
    ) -> impl Future<Output = Result<TxSignature, TransportError>> + Send;

    /// Fetch a blockhash recent enough to build a transaction against.
    fn latest_blockhash(&self) -> impl Future<Output = Result<Blockhash, TransportError>> + Send;

    /// Submit a signed transaction. Returns its signature once accepted.
    fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> impl Future<Output = Result<TxSignature, TransportError>> + Send;

    /// Look up the status of a submitted transaction. `None` if unknown.
    fn signature_status(
        &self,
        signature: &TxSignature,
    ) -> impl Future<Output = Result<Option<SignatureStatus>, TransportError>> + Send;

    /// Wait until `signature` reaches `commitment` or fails.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ConfirmationTimeout`] if the deadline passes.
    fn confirm_transaction(
        &self,
        signature: &TxSignature,
        commitment: Commitment,
    ) -> impl Future<Output = Result<Confirmation, TransportError>> + Send;

    /// Read a token type record.
    fn token_type(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Option<TokenType>, TransportError>> + Send;

    /// Read a holding account record.
    fn holding_account(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Option<HoldingAccount>, TransportError>> + Send;

    /// Native balance of an identity, in native units.
    fn balance(&self, address: &Address) -> impl Future<Output = Result<u64, TransportError>> + Send;
}

impl<C: Connection + ?Sized> Connection for Arc<C> {
    fn request_funding(
        &self,
        address: &Address,
        amount: u64,
    ) -> impl Future<Output = Result<TxSignature, TransportError>> + Send {
        (**self).request_funding(address, amount)
    }

    fn latest_blockhash(&self) -> impl Future<Output = Result<Blockhash, TransportError>> + Send {
        (**self).latest_blockhash()
    }

    fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> impl Future<Output = Result<TxSignature, TransportError>> + Send {
        (**self).send_transaction(transaction)
    }

    fn signature_status(
        &self,
        signature: &TxSignature,
    ) -> impl Future<Output = Result<Option<SignatureStatus>, TransportError>> + Send {
        (**self).signature_status(signature)
    }

    fn confirm_transaction(
        &self,
        signature: &TxSignature,
        commitment: Commitment,
    ) -> impl Future<Output = Result<Confirmation, TransportError>> + Send {
        (**self).confirm_transaction(signature, commitment)
    }

    fn token_type(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Option<TokenType>, TransportError>> + Send {
        (**self).token_type(address)
    }

    fn holding_account(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Option<HoldingAccount>, TransportError>> + Send {
        (**self).holding_account(address)
    }

    fn balance(&self, address: &Address) -> impl Future<Output = Result<u64, TransportError>> + Send {
        (**self).balance(address)
    }
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

/// Poll [`Connection::signature_status`] until the transaction reaches
/// `required`, reports an execution error, or `timeout` elapses.
///
/// Building block for [`Connection::confirm_transaction`] implementations.
pub async fn wait_for_commitment<C: Connection + ?Sized>(
    connection: &C,
    signature: &TxSignature,
    required: Commitment,
    timeout: Duration,
    interval: Duration,
) -> Result<Confirmation, TransportError> {
    let poll = async {
        loop {
            if let Some(status) = connection.signature_status(signature).await? {
                if status.err.is_some() || status.commitment.satisfies(required) {
                    return Ok::<_, TransportError>(Confirmation {
                        signature: *signature,
                        commitment: status.commitment,
                        err: status.err,
                    });
                }
            }
            tokio::time::sleep(interval).await;
        }
    };

    tokio::time::timeout(timeout, poll)
        .await
        .map_err(|_| TransportError::ConfirmationTimeout)?
}
