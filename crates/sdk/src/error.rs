//! SDK error types.
//!
//! [`SdkError`] is the unified error type for all SDK operations. Variants
//! are zero-size discriminants -- no string payloads. Transport detail is
//! logged where the conversion happens.

use std::fmt;

use tracing::debug;
use transport::TransportError;

// ---------------------------------------------------------------------------
// SdkError
// ---------------------------------------------------------------------------

/// Errors from SDK operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkError {
    /// The ledger could not be reached, rejected the request, or the
    /// transaction executed with an error other than an authority mismatch.
    ConnectionFailed,

    /// A transaction was not confirmed within the network's window.
    ConfirmationTimeout,

    /// The signer is not the required authority, or the authority has been
    /// revoked.
    Unauthorized,

    /// A transaction could not be signed (a required signer was missing).
    SigningFailed,
}

impl fmt::Display for SdkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed => write!(f, "ledger connection failed"),
            Self::ConfirmationTimeout => write!(f, "transaction confirmation timed out"),
            Self::Unauthorized => write!(f, "signer is not authorized"),
            Self::SigningFailed => write!(f, "signing operation failed"),
        }
    }
}

impl std::error::Error for SdkError {}

impl From<TransportError> for SdkError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Rejected(e) if e.is_authorization_failure() => Self::Unauthorized,
            TransportError::ConfirmationTimeout => Self::ConfirmationTimeout,
            TransportError::MissingSigner(_) => Self::SigningFailed,
            _ => Self::ConnectionFailed,
        }
    }
}

impl SdkError {
    /// Returns a `map_err` adapter that logs `err` under `context` before
    /// converting it. Logged at debug: the workflow reports the failure once.
    pub(crate) fn transport(context: &'static str) -> impl FnOnce(TransportError) -> SdkError {
        move |err| {
            debug!("{context} failed: {err}");
            SdkError::from(err)
        }
    }
}
