//! Build, sign, submit, and confirm a single transaction.

use sdk_core::Address;
use signer::Signer;
use tracing::debug;
use transport::{Confirmation, Connection, Instruction, Message, Transaction, TransportError};

use crate::Sdk;

impl<C: Connection> Sdk<C> {
    /// Submit `instructions` as one transaction paid by `fee_payer` and wait
    /// for the configured commitment.
    ///
    /// `signers` must include the fee payer and every instruction signer.
    /// An execution error reported by the confirmation is returned as
    /// [`TransportError::Rejected`], so callers see one failure shape
    /// whether the ledger refused the transaction up front or rolled it back.
    pub(crate) async fn submit(
        &self,
        fee_payer: Address,
        instructions: Vec<Instruction>,
        signers: &[&dyn Signer],
    ) -> Result<Confirmation, TransportError> {
        let connection = &self.inner.connection;

        let blockhash = connection.latest_blockhash().await?;
        let transaction =
            Transaction::new_signed(Message::new(fee_payer, blockhash, instructions), signers)?;

        let signature = connection.send_transaction(&transaction).await?;
        debug!(%signature, "transaction submitted");

        let confirmation = connection
            .confirm_transaction(&signature, self.inner.config.network.commitment)
            .await?;

        match confirmation.err {
            None => Ok(confirmation),
            Some(err) => Err(TransportError::Rejected(err)),
        }
    }
}
