//! Token type creation.

use config::constants::TOKEN_DECIMALS;
use sdk_core::{Address, TxSignature};
use signer::{Keypair, Signer};
use tracing::info;
use transport::{Connection, Instruction};

use crate::{Sdk, SdkError};

/// Response from a create token type operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedTokenType {
    /// Address of the new token type.
    pub address: Address,
    /// Signature of the creating transaction.
    pub signature: TxSignature,
}

impl<C: Connection> Sdk<C> {
    /// Create a new token type with precision [`TOKEN_DECIMALS`] and no
    /// freeze authority.
    ///
    /// `payer` pays the fees and becomes the initial issuance authority. The
    /// token type address is a fresh key that co-signs its own creation.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::ConnectionFailed`] on broadcast or execution
    /// failure, [`SdkError::ConfirmationTimeout`] if unconfirmed in time.
    pub async fn create_token_type(&self, payer: &impl Signer) -> Result<CreatedTokenType, SdkError> {
        let token = Keypair::generate();
        let address = token.address();

        let confirmation = self
            .submit(
                payer.address(),
                vec![Instruction::CreateTokenType {
                    token_type: address,
                    decimals: TOKEN_DECIMALS,
                    issuance_authority: payer.address(),
                    freeze_authority: None,
                }],
                &[payer, &token],
            )
            .await
            .map_err(SdkError::transport("create_token_type"))?;

        info!(token_type = %address, signature = %confirmation.signature, "token type created");
        Ok(CreatedTokenType {
            address,
            signature: confirmation.signature,
        })
    }
}
