//! Ledger transport for the mint-drop client.
//!
//! This crate provides:
//!
//! - [`ledger`] -- wire model: instructions, messages, signed transactions,
//!   and the token type / holding account records the ledger stores
//! - [`Connection`] -- async access to a ledger node (funding, blockhash,
//!   submission, confirmation, account reads)
//! - [`RpcConnection`] -- JSON-RPC 2.0 over HTTP implementation
//! - [`LocalLedger`] -- in-process ledger that enforces the same rules, for
//!   tests and offline runs
//!
//! # Feature flags
//!
//! - **`rpc`** (default): Enables [`RpcConnection`] and pulls in `reqwest`.
//! - **`local`**: Enables [`LocalLedger`].

pub mod connection;
pub mod error;
pub mod ledger;

#[cfg(feature = "rpc")]
pub mod rpc;

#[cfg(feature = "local")]
pub mod local;

pub use connection::{Confirmation, Connection, SignatureStatus, wait_for_commitment};
pub use error::{TransactionError, TransportError};
pub use ledger::{
    HoldingAccount, Instruction, Message, TokenType, Transaction, holding_account_address,
};

#[cfg(feature = "rpc")]
pub use rpc::RpcConnection;

#[cfg(feature = "local")]
pub use local::LocalLedger;
