//! Signing abstractions and ephemeral identities for the ledger.
//!
//! This crate provides:
//!
//! - [`Signer`] trait -- address + digest signing (no crypto dependencies)
//! - [`schnorr`] module -- BIP340 Schnorr sign/verify primitives over secp256k1
//! - [`Keypair`] -- an in-memory identity, generated fresh per workflow run
//!
//! # Feature flags
//!
//! - **`schnorr`** (default): Enables the concrete implementations and pulls
//!   in `bitcoin` and `rand_core`.
//!
//! # Design
//!
//! The base [`Signer`] trait depends only on [`sdk_core`]. Transaction
//! construction signs through this trait, so an HSM- or wallet-backed signer
//! can stand in for [`Keypair`] without touching the transport.

#[cfg(feature = "schnorr")]
pub mod schnorr;

#[cfg(feature = "schnorr")]
mod keypair;

#[cfg(feature = "schnorr")]
pub use keypair::Keypair;

#[cfg(feature = "schnorr")]
pub use schnorr::SchnorrError;

use sdk_core::Address;

/// Signing capability for ledger transactions.
///
/// Implementations must produce BIP340 Schnorr signatures that verify
/// against [`Signer::address`] interpreted as an x-only public key.
pub trait Signer: Send + Sync {
    /// Returns the identity address (x-only public key bytes).
    fn address(&self) -> Address;

    /// Sign a 32-byte message digest, returning the 64-byte signature.
    fn sign_digest(&self, digest: &[u8; 32]) -> [u8; 64];
}

impl<S: Signer + ?Sized> Signer for &S {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn sign_digest(&self, digest: &[u8; 32]) -> [u8; 64] {
        (**self).sign_digest(digest)
    }
}
