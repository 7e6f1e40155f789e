//! The mint-drop workflow.
//!
//! # Flow
//!
//! 1. Return [`MintDropOutcome::NotAuthorized`] without any ledger call if
//!    no recipient is connected
//! 2. Generate an ephemeral identity and fund it
//! 3. Create a token type with the identity as issuance authority
//! 4. Resolve the identity's holding account and issue one token into it
//! 5. Revoke the issuance authority
//! 6. Resolve the recipient's holding account and transfer the token
//!
//! Each step starts only after the previous one is confirmed. The first
//! failure ends the run: no retry, no rollback, effects of completed steps
//! stay on the ledger. A failed run sends exactly one notification labelled
//! [`MINT_DROP_FAILED`] and logs the full diagnostic.

use config::constants::ISSUE_AMOUNT;
use config::labels::MINT_DROP_FAILED;
use sdk_core::{Address, Commitment, TxSignature};
use signer::Signer;
use tracing::{error, info};
use transport::Connection;

use crate::notify::Notification;
use crate::operations::tracking::{
    OperationError, OperationId, OperationStep, OperationTracker, StepFailure,
};
use crate::Sdk;

// ---------------------------------------------------------------------------
// Public result types
// ---------------------------------------------------------------------------

/// Everything a successful run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintDropReceipt {
    /// Tracking ID of the run.
    pub operation_id: OperationId,
    /// Ephemeral identity that created, issued, and sent the token.
    pub identity: Address,
    /// The new token type.
    pub token_type: Address,
    /// The identity's holding account (empty after the transfer).
    pub source: Address,
    /// The recipient's holding account.
    pub destination: Address,
    /// Base units delivered.
    pub amount: u64,
    /// Signature of the transfer transaction.
    pub signature: TxSignature,
    /// Commitment the transfer reached.
    pub commitment: Commitment,
}

/// Result of one activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintDropOutcome {
    /// No recipient was connected; nothing was done.
    NotAuthorized,
    /// The token was delivered.
    Transferred(MintDropReceipt),
}

// ---------------------------------------------------------------------------
// Sdk impl
// ---------------------------------------------------------------------------

impl<C: Connection> Sdk<C> {
    /// Run the workflow once for `recipient`.
    ///
    /// `None` models the absence of a connected wallet and yields
    /// [`MintDropOutcome::NotAuthorized`] with no ledger traffic and no
    /// notification.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError`] naming the failed step, its [`SdkError`](crate::SdkError)
    /// and the steps that completed before it.
    pub async fn mint_drop(&self, recipient: Option<&Address>) -> Result<MintDropOutcome, OperationError> {
        let Some(recipient) = recipient else {
            info!("no recipient connected, mint drop not authorized");
            return Ok(MintDropOutcome::NotAuthorized);
        };

        let mut tracker = self.tracker(*recipient);
        let op_id = tracker.id();
        info!(op_id = %op_id, %recipient, "mint drop started");

        let result = self.run_mint_drop(&mut tracker, recipient).await;
        match result {
            Ok(receipt) => {
                info!(
                    op_id = %op_id,
                    token_type = %receipt.token_type,
                    destination = %receipt.destination,
                    signature = %receipt.signature,
                    "mint drop transferred"
                );
                tracker.succeed();
                Ok(MintDropOutcome::Transferred(receipt))
            }
            Err((step, e)) => {
                let err = tracker.fail(step, e);
                error!(op_id = %op_id, "{err}");
                self.notifier()
                    .notify(Notification::error(MINT_DROP_FAILED).with_description(err.to_string()));
                Err(err)
            }
        }
    }

    async fn run_mint_drop(
        &self,
        tracker: &mut OperationTracker,
        recipient: &Address,
    ) -> Result<MintDropReceipt, StepFailure> {
        let identity = self.provision_identity();
        let payer = identity.address();

        tracker
            .run(OperationStep::Funding, self.fund_identity(&payer))
            .await?;

        let token_type = tracker
            .run(OperationStep::AssetCreation, self.create_token_type(&identity))
            .await?
            .address;

        let source = tracker
            .run(
                OperationStep::SourceResolution,
                self.resolve_holding_account(&identity, &payer, &token_type),
            )
            .await?
            .address;

        tracker
            .run(
                OperationStep::Issuance,
                self.issue_supply(&identity, &token_type, &source, ISSUE_AMOUNT),
            )
            .await?;

        tracker
            .run(
                OperationStep::AuthorityRevocation,
                self.revoke_issuance_authority(&identity, &token_type),
            )
            .await?;

        let destination = tracker
            .run(
                OperationStep::DestinationResolution,
                self.resolve_holding_account(&identity, recipient, &token_type),
            )
            .await?
            .address;

        let confirmation = tracker
            .run(
                OperationStep::Transfer,
                self.transfer(&identity, &source, &destination, ISSUE_AMOUNT),
            )
            .await?;

        Ok(MintDropReceipt {
            operation_id: tracker.id(),
            identity: payer,
            token_type,
            source,
            destination,
            amount: ISSUE_AMOUNT,
            signature: confirmation.signature,
            commitment: confirmation.commitment,
        })
    }
}
