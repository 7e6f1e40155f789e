//! Transport and ledger error types.

use std::fmt;

use sdk_core::Address;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TransactionError
// ---------------------------------------------------------------------------

/// A ledger rule violated by a transaction.
///
/// Carried on the wire (snake_case names) both in rejected submissions and
/// in the status of executed-but-failed transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionError {
    /// The referenced blockhash is unknown or too old.
    BlockhashNotFound,
    /// Fewer signatures than required signers.
    MissingSignature,
    /// A signature does not verify against its signer address.
    InvalidSignature,
    /// The fee payer cannot cover the transaction fee.
    InsufficientFunds,
    /// The account to create already exists.
    AccountAlreadyExists,
    /// A referenced account does not exist.
    AccountNotFound,
    /// The signer is not the authority or owner the instruction requires.
    Unauthorized,
    /// The token type's issuance authority has been cleared.
    IssuanceDisabled,
    /// The source holding account balance is below the amount.
    InsufficientTokenBalance,
    /// Holding accounts of different token types were combined.
    TokenTypeMismatch,
    /// A transaction with this signature was already processed.
    AlreadyProcessed,
    /// An amount or supply computation overflowed.
    Overflow,
    /// The funding request exceeds the faucet limit.
    FundingLimitExceeded,
}

impl TransactionError {
    /// Returns `true` if the failure is an authority or ownership mismatch.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::IssuanceDisabled)
    }
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockhashNotFound => write!(f, "blockhash not found"),
            Self::MissingSignature => write!(f, "missing required signature"),
            Self::InvalidSignature => write!(f, "invalid signature"),
            Self::InsufficientFunds => write!(f, "insufficient funds for fee"),
            Self::AccountAlreadyExists => write!(f, "account already exists"),
            Self::AccountNotFound => write!(f, "account not found"),
            Self::Unauthorized => write!(f, "signer is not the required authority"),
            Self::IssuanceDisabled => write!(f, "issuance authority has been revoked"),
            Self::InsufficientTokenBalance => write!(f, "insufficient token balance"),
            Self::TokenTypeMismatch => write!(f, "token type mismatch"),
            Self::AlreadyProcessed => write!(f, "transaction already processed"),
            Self::Overflow => write!(f, "arithmetic overflow"),
            Self::FundingLimitExceeded => write!(f, "funding request exceeds limit"),
        }
    }
}

impl std::error::Error for TransactionError {}

// ---------------------------------------------------------------------------
// TransportError
// ---------------------------------------------------------------------------

/// Errors from a ledger [`Connection`](crate::Connection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The HTTP request could not be completed (connect, timeout, status).
    Http(String),

    /// The node answered with a JSON-RPC error.
    Rpc { code: i64, message: String },

    /// The node's response could not be decoded.
    InvalidResponse(String),

    /// The node refused the transaction before execution.
    Rejected(TransactionError),

    /// The transaction did not reach the requested commitment in time.
    ConfirmationTimeout,

    /// A required signer was not supplied when signing a transaction.
    MissingSigner(Address),

    /// The message carries more than
    /// [`MAX_INSTRUCTIONS`](crate::ledger::MAX_INSTRUCTIONS) instructions.
    MessageTooLarge(usize),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(reason) => write!(f, "http error: {reason}"),
            Self::Rpc { code, message } => write!(f, "rpc error ({code}): {message}"),
            Self::InvalidResponse(reason) => write!(f, "invalid response: {reason}"),
            Self::Rejected(err) => write!(f, "transaction rejected: {err}"),
            Self::ConfirmationTimeout => write!(f, "confirmation timed out"),
            Self::MissingSigner(address) => write!(f, "missing signer: {address}"),
            Self::MessageTooLarge(count) => write!(f, "message has {count} instructions"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<TransactionError> for TransportError {
    fn from(err: TransactionError) -> Self {
        Self::Rejected(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_snake_case() {
        let json = serde_json::to_string(&TransactionError::IssuanceDisabled).unwrap();
        assert_eq!(json, "\"issuance_disabled\"");

        let back: TransactionError = serde_json::from_str("\"insufficient_token_balance\"").unwrap();
        assert_eq!(back, TransactionError::InsufficientTokenBalance);
    }

    #[test]
    fn authorization_failures() {
        assert!(TransactionError::Unauthorized.is_authorization_failure());
        assert!(TransactionError::IssuanceDisabled.is_authorization_failure());
        assert!(!TransactionError::InsufficientFunds.is_authorization_failure());
    }

    #[test]
    fn rejected_display_includes_cause() {
        let err = TransportError::from(TransactionError::AccountNotFound);
        assert_eq!(err.to_string(), "transaction rejected: account not found");
    }
}
