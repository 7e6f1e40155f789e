//! SDK operations: the workflow steps and their orchestrator.
//!
//! Each submodule implements one step as an `Sdk` method. Steps that write
//! to the ledger follow the same pattern:
//!
//! 1. Fetch a recent blockhash
//! 2. Build and sign a single-transaction message
//! 3. Submit, then wait for the configured commitment
//! 4. Treat an execution error in the confirmation as a failure

pub mod asset;
pub mod funding;
pub mod holding;
pub mod identity;
pub mod issue;
pub mod mint_drop;
pub mod revoke;
pub(crate) mod submit;
pub mod tracking;
pub mod transfer;
