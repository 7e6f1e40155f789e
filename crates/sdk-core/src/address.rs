//! Ledger address encoding and decoding.
//!
//! Every account on the ledger (identities, token types, holding accounts)
//! is named by a 32-byte address. The human-readable form is Bech32m with a
//! fixed HRP.
//!
//! # Format
//!
//! | Part | Content |
//! |------|---------|
//! | HRP | `ldg` |
//! | Separator | `1` |
//! | Data | the 32 address bytes |
//! | Checksum | 6 characters (Bech32m) |
//!
//! # Heap Allocations
//!
//! | Operation | Allocations |
//! |-----------|-------------|
//! | `Display::fmt()` | 0 |
//! | `encode()` | 1 (String via `to_string()`) |
//! | `parse()` (lowercase input) | 0 |
//! | `parse()` (mixed-case input) | 1 (`to_lowercase()`) |
//!
//! # Example
//!
//! ```rust
//! use sdk_core::Address;
//!
//! let address = Address::from_bytes([0x11; 32]);
//! let encoded = address.encode();
//! assert!(encoded.starts_with("ldg1"));
//!
//! let parsed: Address = encoded.parse().unwrap();
//! assert_eq!(parsed, address);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32m, Hrp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 32;

/// Human-readable part for ledger addresses.
pub const HRP: &str = "ldg";

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 32-byte ledger account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Wraps raw address bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw address bytes.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Encodes this address as a Bech32m string.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parses an address from its Bech32m string form.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The string is not valid Bech32m
    /// - The HRP is not `ldg`
    /// - The payload is not exactly 32 bytes
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        // Bech32m is case-insensitive; only allocate for mixed-case input.
        let normalized: Cow<'_, str> = if s.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(s.to_lowercase())
        } else {
            Cow::Borrowed(s)
        };

        let checked = CheckedHrpstring::new::<Bech32m>(&normalized)
            .map_err(|e| AddressError::Bech32(e.to_string()))?;

        if checked.hrp().as_str() != HRP {
            return Err(AddressError::UnknownPrefix(checked.hrp().to_string()));
        }

        let mut buf = [0u8; ADDRESS_LEN];
        let mut len = 0;
        for byte in checked.byte_iter() {
            if len >= ADDRESS_LEN {
                return Err(AddressError::BadLength);
            }
            buf[len] = byte;
            len += 1;
        }
        if len != ADDRESS_LEN {
            return Err(AddressError::BadLength);
        }

        Ok(Self(buf))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hrp = Hrp::parse(HRP).map_err(|_| fmt::Error)?;
        bech32::encode_lower_to_fmt::<Bech32m, _>(f, hrp, &self.0).map_err(|_| fmt::Error)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = Cow::<'de, str>::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors that can occur when parsing addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Bech32m decoding failed.
    Bech32(String),

    /// The HRP is not the ledger prefix.
    UnknownPrefix(String),

    /// The payload is not 32 bytes.
    BadLength,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bech32(e) => write!(f, "bech32 error: {e}"),
            Self::UnknownPrefix(hrp) => write!(f, "unknown address prefix: {hrp}"),
            Self::BadLength => write!(f, "address payload must be 32 bytes"),
        }
    }
}

impl std::error::Error for AddressError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
