//! Issuance authority revocation.

use sdk_core::{Address, TxSignature};
use signer::Signer;
use tracing::info;
use transport::{Connection, Instruction};

use crate::{Sdk, SdkError};

impl<C: Connection> Sdk<C> {
    /// Clear the issuance authority of `token_type`. Irreversible: no
    /// identity can issue supply afterwards.
    ///
    /// # Errors
    ///
    /// - [`SdkError::Unauthorized`] if `authority` is not the current
    ///   issuance authority or the authority is already cleared
    /// - [`SdkError::ConnectionFailed`] on any other ledger failure
    /// - [`SdkError::ConfirmationTimeout`] if unconfirmed in time
    pub async fn revoke_issuance_authority(
        &self,
        authority: &impl Signer,
        token_type: &Address,
    ) -> Result<TxSignature, SdkError> {
        let confirmation = self
            .submit(
                authority.address(),
                vec![Instruction::SetIssuanceAuthority {
                    token_type: *token_type,
                    current_authority: authority.address(),
                    new_authority: None,
                }],
                &[authority],
            )
            .await
            .map_err(SdkError::transport("revoke_issuance_authority"))?;

        info!(%token_type, signature = %confirmation.signature, "issuance authority revoked");
        Ok(confirmation.signature)
    }
}
