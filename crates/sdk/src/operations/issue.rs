//! Supply issuance.

use sdk_core::{Address, TxSignature};
use signer::Signer;
use tracing::info;
use transport::{Connection, Instruction};

use crate::{Sdk, SdkError};

impl<C: Connection> Sdk<C> {
    /// Issue `amount` base units of `token_type` into the `destination`
    /// holding account. `authority` signs and pays.
    ///
    /// # Errors
    ///
    /// - [`SdkError::Unauthorized`] if `authority` is not the token type's
    ///   current issuance authority, including after revocation
    /// - [`SdkError::ConnectionFailed`] on any other ledger failure
    /// - [`SdkError::ConfirmationTimeout`] if unconfirmed in time
    pub async fn issue_supply(
        &self,
        authority: &impl Signer,
        token_type: &Address,
        destination: &Address,
        amount: u64,
    ) -> Result<TxSignature, SdkError> {
        let confirmation = self
            .submit(
                authority.address(),
                vec![Instruction::IssueSupply {
                    token_type: *token_type,
                    destination: *destination,
                    authority: authority.address(),
                    amount,
                }],
                &[authority],
            )
            .await
            .map_err(SdkError::transport("issue_supply"))?;

        info!(%token_type, %destination, amount, signature = %confirmation.signature, "supply issued");
        Ok(confirmation.signature)
    }
}
