//! Core types for the mint-drop ledger client.
//!
//! This crate provides foundational value types used across the workspace:
//!
//! - [`Address`] -- 32-byte account address, Bech32m text form
//! - [`TxSignature`] -- fee payer signature, doubling as the transaction id
//! - [`Blockhash`] -- recent ledger state reference carried by transactions
//! - [`Commitment`] -- confirmation strength a client waits for
//! - [`hex`] -- allocation-light hex helpers

pub mod address;
pub mod hex;

pub use address::{Address, AddressError};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Commitment
// ---------------------------------------------------------------------------

/// Confirmation strength of a transaction, weakest first.
///
/// Ordering follows strength: `Processed < Confirmed < Finalized`, so a
/// status satisfies a requested level when `status >= requested`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    /// Executed by the node that received it.
    Processed,

    /// Voted on by a supermajority.
    Confirmed,

    /// Rooted; cannot be rolled back.
    Finalized,
}

impl Commitment {
    /// Returns `true` if `self` is at least as strong as `required`.
    pub fn satisfies(self, required: Commitment) -> bool {
        self >= required
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processed => write!(f, "processed"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Finalized => write!(f, "finalized"),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixed-size hex newtypes
// ---------------------------------------------------------------------------

/// Error returned when parsing a hex-encoded fixed-size value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidHex;

impl fmt::Display for InvalidHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid hex encoding")
    }
}

impl std::error::Error for InvalidHex {}

macro_rules! hex_newtype {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Wraps raw bytes.
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Returns the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                hex::write(f, &self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({self})", stringify!($name))
            }
        }

        impl FromStr for $name {
            type Err = InvalidHex;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                hex::decode_array::<$len>(s).map(Self).ok_or(InvalidHex)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = std::borrow::Cow::<'de, str>::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_newtype!(
    /// 64-byte Schnorr signature of a transaction's fee payer.
    ///
    /// The first signature of a transaction identifies it on the ledger.
    TxSignature,
    64
);

hex_newtype!(
    /// 32-byte reference to a recent ledger state.
    ///
    /// Transactions must carry a blockhash the ledger still remembers.
    Blockhash,
    32
);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
