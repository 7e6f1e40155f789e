//! Tests for the individual workflow steps, driven one at a time.

mod common;

use common::{Fault, Harness, random_recipient};
use config::constants::{FUNDING_AMOUNT, ISSUE_AMOUNT, TOKEN_DECIMALS};
use sdk::SdkError;
use sdk_core::Address;
use signer::{Keypair, Signer};
use transport::Connection;

/// A funded identity with a fresh token type and an empty own holding.
struct Minted {
    identity: Keypair,
    token_type: Address,
    source: Address,
}

async fn minted(h: &Harness) -> Minted {
    let identity = h.sdk.provision_identity();
    h.sdk.fund_identity(&identity.address()).await.unwrap();
    let token_type = h.sdk.create_token_type(&identity).await.unwrap().address;
    let source = h
        .sdk
        .resolve_holding_account(&identity, &identity.address(), &token_type)
        .await
        .unwrap()
        .address;
    Minted {
        identity,
        token_type,
        source,
    }
}

// ---------------------------------------------------------------------------
// Identity and funding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn provisioned_identities_are_unique_and_offline() {
    let h = Harness::new();

    let a = h.sdk.provision_identity();
    let b = h.sdk.provision_identity();

    assert_ne!(a.address(), b.address());
    assert_eq!(h.connection.calls(), 0);
}

#[tokio::test]
async fn funding_credits_the_identity() {
    let h = Harness::new();
    let identity = h.sdk.provision_identity();

    let confirmation = h.sdk.fund_identity(&identity.address()).await.unwrap();

    assert!(confirmation.is_success());
    assert_eq!(h.ledger().balance(&identity.address()).await.unwrap(), FUNDING_AMOUNT);
}

#[tokio::test]
async fn unreachable_faucet_is_a_connection_failure() {
    let h = Harness::with_fault(Fault::FundingUnavailable);
    let identity = h.sdk.provision_identity();

    let err = h.sdk.fund_identity(&identity.address()).await.unwrap_err();

    assert_eq!(err, SdkError::ConnectionFailed);
}

#[tokio::test]
async fn unfunded_payer_cannot_create_a_token_type() {
    let h = Harness::new();
    let identity = h.sdk.provision_identity();

    let err = h.sdk.create_token_type(&identity).await.unwrap_err();

    assert_eq!(err, SdkError::ConnectionFailed);
    assert_eq!(h.ledger().transaction_count(), 0);
}

// ---------------------------------------------------------------------------
// Token type creation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn created_token_type_has_fixed_precision_and_payer_authority() {
    let h = Harness::new();
    let identity = h.sdk.provision_identity();
    h.sdk.fund_identity(&identity.address()).await.unwrap();

    let created = h.sdk.create_token_type(&identity).await.unwrap();

    let token = h.ledger().token_type(&created.address).await.unwrap().unwrap();
    assert_eq!(token.decimals, TOKEN_DECIMALS);
    assert_eq!(token.supply, 0);
    assert_eq!(token.issuance_authority, Some(identity.address()));
    assert_eq!(token.freeze_authority, None);
    assert_ne!(created.address, identity.address());
}

// ---------------------------------------------------------------------------
// Holding account resolution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolution_is_idempotent() {
    let h = Harness::new();
    let m = minted(&h).await;
    let recipient = random_recipient();

    let first = h
        .sdk
        .resolve_holding_account(&m.identity, &recipient, &m.token_type)
        .await
        .unwrap();
    let second = h
        .sdk
        .resolve_holding_account(&m.identity, &recipient, &m.token_type)
        .await
        .unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.address, second.address);
    // One for the source in `minted`, one for the recipient.
    assert_eq!(h.connection.holding_creations(), 2);

    let holding = h.ledger().holding_account(&first.address).await.unwrap().unwrap();
    assert_eq!(holding.owner, recipient);
    assert_eq!(holding.token_type, m.token_type);
    assert_eq!(holding.amount, 0);
}

#[tokio::test]
async fn resolution_for_distinct_owners_yields_distinct_accounts() {
    let h = Harness::new();
    let m = minted(&h).await;

    let other = h
        .sdk
        .resolve_holding_account(&m.identity, &random_recipient(), &m.token_type)
        .await
        .unwrap();

    assert_ne!(other.address, m.source);
}

#[tokio::test]
async fn resolution_recovers_from_a_lost_creation_race() {
    let h = Harness::new();
    let m = minted(&h).await;
    let recipient = random_recipient();
    let existing = h
        .sdk
        .resolve_holding_account(&m.identity, &recipient, &m.token_type)
        .await
        .unwrap();

    // The lookup misses, so creation is attempted and rejected as a duplicate.
    h.connection.set_fault(Fault::StaleHoldingRead);
    let resolved = h
        .sdk
        .resolve_holding_account(&m.identity, &recipient, &m.token_type)
        .await
        .unwrap();

    assert_eq!(resolved.address, existing.address);
    assert!(!resolved.created);
    assert_eq!(h.ledger().holdings_of(&m.token_type).len(), 2);
}

#[tokio::test]
async fn resolution_for_unknown_token_type_fails() {
    let h = Harness::new();
    let identity = h.sdk.provision_identity();
    h.sdk.fund_identity(&identity.address()).await.unwrap();

    let err = h
        .sdk
        .resolve_holding_account(&identity, &identity.address(), &random_recipient())
        .await
        .unwrap_err();

    assert_eq!(err, SdkError::ConnectionFailed);
}

// ---------------------------------------------------------------------------
// Issuance and revocation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn issuance_credits_destination_and_supply() {
    let h = Harness::new();
    let m = minted(&h).await;

    h.sdk
        .issue_supply(&m.identity, &m.token_type, &m.source, ISSUE_AMOUNT)
        .await
        .unwrap();

    let token = h.ledger().token_type(&m.token_type).await.unwrap().unwrap();
    assert_eq!(token.supply, ISSUE_AMOUNT);
    assert_eq!(h.token_balance(&m.identity.address(), &m.token_type).await, ISSUE_AMOUNT);
}

#[tokio::test]
async fn issuance_by_a_non_authority_is_unauthorized() {
    let h = Harness::new();
    let m = minted(&h).await;
    let intruder = h.sdk.provision_identity();
    h.sdk.fund_identity(&intruder.address()).await.unwrap();

    let err = h
        .sdk
        .issue_supply(&intruder, &m.token_type, &m.source, 1)
        .await
        .unwrap_err();

    assert_eq!(err, SdkError::Unauthorized);
}

#[tokio::test]
async fn issuance_after_revocation_is_unauthorized() {
    let h = Harness::new();
    let m = minted(&h).await;

    h.sdk
        .revoke_issuance_authority(&m.identity, &m.token_type)
        .await
        .unwrap();
    let err = h
        .sdk
        .issue_supply(&m.identity, &m.token_type, &m.source, 1)
        .await
        .unwrap_err();

    assert_eq!(err, SdkError::Unauthorized);
    let token = h.ledger().token_type(&m.token_type).await.unwrap().unwrap();
    assert_eq!(token.issuance_authority, None);
    assert_eq!(token.supply, 0);
}

#[tokio::test]
async fn revoking_twice_is_unauthorized() {
    let h = Harness::new();
    let m = minted(&h).await;

    h.sdk
        .revoke_issuance_authority(&m.identity, &m.token_type)
        .await
        .unwrap();
    let err = h
        .sdk
        .revoke_issuance_authority(&m.identity, &m.token_type)
        .await
        .unwrap_err();

    assert_eq!(err, SdkError::Unauthorized);
}

#[tokio::test]
async fn issuance_timeout_is_reported() {
    let h = Harness::new();
    let m = minted(&h).await;
    // Funding, creation and source resolution consumed confirmations 0..=2.
    h.connection.set_fault(Fault::ConfirmTimeout(3));

    let err = h
        .sdk
        .issue_supply(&m.identity, &m.token_type, &m.source, 1)
        .await
        .unwrap_err();

    assert_eq!(err, SdkError::ConfirmationTimeout);
}

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transfer_moves_the_full_amount() {
    let h = Harness::new();
    let m = minted(&h).await;
    let recipient = random_recipient();
    h.sdk
        .issue_supply(&m.identity, &m.token_type, &m.source, ISSUE_AMOUNT)
        .await
        .unwrap();
    let destination = h
        .sdk
        .resolve_holding_account(&m.identity, &recipient, &m.token_type)
        .await
        .unwrap()
        .address;

    let confirmation = h
        .sdk
        .transfer(&m.identity, &m.source, &destination, ISSUE_AMOUNT)
        .await
        .unwrap();

    assert!(confirmation.is_success());
    assert_eq!(h.token_balance(&recipient, &m.token_type).await, ISSUE_AMOUNT);
    assert_eq!(h.token_balance(&m.identity.address(), &m.token_type).await, 0);
}

#[tokio::test]
async fn transfer_beyond_balance_fails_without_effect() {
    let h = Harness::new();
    let m = minted(&h).await;
    let recipient = random_recipient();
    h.sdk
        .issue_supply(&m.identity, &m.token_type, &m.source, ISSUE_AMOUNT)
        .await
        .unwrap();
    let destination = h
        .sdk
        .resolve_holding_account(&m.identity, &recipient, &m.token_type)
        .await
        .unwrap()
        .address;

    let err = h
        .sdk
        .transfer(&m.identity, &m.source, &destination, ISSUE_AMOUNT + 1)
        .await
        .unwrap_err();

    assert_eq!(err, SdkError::ConnectionFailed);
    assert_eq!(h.token_balance(&recipient, &m.token_type).await, 0);
    assert_eq!(h.token_balance(&m.identity.address(), &m.token_type).await, ISSUE_AMOUNT);
}

#[tokio::test]
async fn transfer_by_a_non_owner_is_unauthorized() {
    let h = Harness::new();
    let m = minted(&h).await;
    h.sdk
        .issue_supply(&m.identity, &m.token_type, &m.source, ISSUE_AMOUNT)
        .await
        .unwrap();
    let thief = h.sdk.provision_identity();
    h.sdk.fund_identity(&thief.address()).await.unwrap();
    let destination = h
        .sdk
        .resolve_holding_account(&thief, &thief.address(), &m.token_type)
        .await
        .unwrap()
        .address;

    let err = h
        .sdk
        .transfer(&thief, &m.source, &destination, ISSUE_AMOUNT)
        .await
        .unwrap_err();

    assert_eq!(err, SdkError::Unauthorized);
    assert_eq!(h.token_balance(&m.identity.address(), &m.token_type).await, ISSUE_AMOUNT);
}
