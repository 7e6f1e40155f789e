//! Holding account resolution.
//!
//! Every (owner, token type) pair has exactly one holding account at a
//! derived address. Resolution looks it up and creates it only if absent, so
//! calling it again with the same inputs is a plain read.

use sdk_core::Address;
use signer::Signer;
use tracing::{debug, info};
use transport::{
    Connection, Instruction, TransactionError, TransportError, holding_account_address,
};

use crate::{Sdk, SdkError};

/// Response from a holding account resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedHolding {
    /// Address of the holding account.
    pub address: Address,
    /// Whether this call created the account.
    pub created: bool,
}

impl<C: Connection> Sdk<C> {
    /// Return the holding account of `owner` for `token_type`, creating it
    /// (paid by `payer`) if it does not exist.
    ///
    /// If creation loses a race to another creator, the account is re-read
    /// and returned with `created == false`.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::ConnectionFailed`] if the lookup or creation
    /// fails, [`SdkError::ConfirmationTimeout`] if creation is unconfirmed.
    pub async fn resolve_holding_account(
        &self,
        payer: &impl Signer,
        owner: &Address,
        token_type: &Address,
    ) -> Result<ResolvedHolding, SdkError> {
        let to_sdk = SdkError::transport("resolve_holding_account");
        let address = holding_account_address(owner, token_type);

        if self.holding_exists(&address).await.map_err(to_sdk)? {
            debug!(%owner, %token_type, holding = %address, "holding account exists");
            return Ok(ResolvedHolding {
                address,
                created: false,
            });
        }

        let created = self
            .submit(
                payer.address(),
                vec![Instruction::CreateHoldingAccount {
                    owner: *owner,
                    token_type: *token_type,
                }],
                &[payer],
            )
            .await;

        match created {
            Ok(confirmation) => {
                info!(%owner, %token_type, holding = %address, signature = %confirmation.signature, "holding account created");
                Ok(ResolvedHolding {
                    address,
                    created: true,
                })
            }
            Err(TransportError::Rejected(TransactionError::AccountAlreadyExists)) => {
                let to_sdk = SdkError::transport("resolve_holding_account");
                if self.holding_exists(&address).await.map_err(to_sdk)? {
                    debug!(holding = %address, "holding account created concurrently");
                    Ok(ResolvedHolding {
                        address,
                        created: false,
                    })
                } else {
                    Err(SdkError::ConnectionFailed)
                }
            }
            Err(err) => Err(SdkError::transport("resolve_holding_account")(err)),
        }
    }

    async fn holding_exists(&self, address: &Address) -> Result<bool, TransportError> {
        Ok(self
            .inner
            .connection
            .holding_account(address)
            .await?
            .is_some())
    }
}
