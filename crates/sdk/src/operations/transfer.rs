//! Holding-to-holding token transfer.

use sdk_core::Address;
use signer::Signer;
use tracing::info;
use transport::{Confirmation, Connection, Instruction};

use crate::{Sdk, SdkError};

impl<C: Connection> Sdk<C> {
    /// Move `amount` base units from `source` to `destination` in a single
    /// transaction signed by `owner`, the owner of `source`.
    ///
    /// Both holding accounts must be of the same token type and `source`
    /// must hold at least `amount`.
    ///
    /// # Errors
    ///
    /// - [`SdkError::Unauthorized`] if `owner` does not own `source`
    /// - [`SdkError::ConnectionFailed`] on any other ledger failure,
    ///   including an insufficient source balance
    /// - [`SdkError::ConfirmationTimeout`] if unconfirmed in time
    pub async fn transfer(
        &self,
        owner: &impl Signer,
        source: &Address,
        destination: &Address,
        amount: u64,
    ) -> Result<Confirmation, SdkError> {
        let confirmation = self
            .submit(
                owner.address(),
                vec![Instruction::Transfer {
                    source: *source,
                    destination: *destination,
                    owner: owner.address(),
                    amount,
                }],
                &[owner],
            )
            .await
            .map_err(SdkError::transport("transfer"))?;

        info!(%source, %destination, amount, signature = %confirmation.signature, "transfer confirmed");
        Ok(confirmation)
    }
}
