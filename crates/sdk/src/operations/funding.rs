//! Faucet funding of an identity.

use config::constants::FUNDING_AMOUNT;
use sdk_core::Address;
use tracing::info;
use transport::{Confirmation, Connection, TransportError};

use crate::{Sdk, SdkError};

impl<C: Connection> Sdk<C> {
    /// Fund `address` with [`FUNDING_AMOUNT`] native units and wait for the
    /// credit to reach the configured commitment.
    ///
    /// Must complete before `address` pays for any transaction.
    ///
    /// # Errors
    ///
    /// - [`SdkError::ConnectionFailed`] if the faucet is unreachable or
    ///   refuses the request
    /// - [`SdkError::ConfirmationTimeout`] if the credit is not confirmed in time
    pub async fn fund_identity(&self, address: &Address) -> Result<Confirmation, SdkError> {
        let connection = &self.inner.connection;
        let to_sdk = SdkError::transport("fund_identity");

        let result: Result<Confirmation, TransportError> = async {
            let signature = connection.request_funding(address, FUNDING_AMOUNT).await?;
            let confirmation = connection
                .confirm_transaction(&signature, self.inner.config.network.commitment)
                .await?;
            match confirmation.err {
                None => Ok(confirmation),
                Some(err) => Err(TransportError::Rejected(err)),
            }
        }
        .await;

        let confirmation = result.map_err(to_sdk)?;
        info!(%address, amount = FUNDING_AMOUNT, signature = %confirmation.signature, "identity funded");
        Ok(confirmation)
    }
}
