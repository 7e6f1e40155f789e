//! BIP340 Schnorr signing and verification over secp256k1.
//!
//! Provides thin wrappers around `bitcoin::secp256k1` with a unified error
//! type. Ledger identities are x-only public keys, so an [`Address`] of an
//! identity converts directly into a verification key.
//!
//! # Operations
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`sign_digest`] | Schnorr-sign a 32-byte digest |
//! | [`verify_digest`] | Verify a signature against a 32-byte digest |
//! | [`verify_for_address`] | Verify raw signature bytes against an identity address |
//!
//! All functions accept a `Secp256k1` context as parameter so callers can
//! share a single context across operations.

use std::fmt;

use bitcoin::secp256k1::schnorr::Signature;
use bitcoin::secp256k1::{Keypair, Message, Secp256k1, Signing, Verification, XOnlyPublicKey};
use sdk_core::Address;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors returned by Schnorr operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchnorrError {
    /// The signature does not verify against the given key and digest.
    VerificationFailed,
    /// The provided bytes are not a valid 64-byte Schnorr signature.
    InvalidSignature,
    /// The address is not a valid x-only public key.
    InvalidPublicKey,
    /// The provided bytes are not a valid secret key.
    InvalidSecretKey,
}

impl fmt::Display for SchnorrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VerificationFailed => write!(f, "Schnorr signature verification failed"),
            Self::InvalidSignature => write!(f, "invalid Schnorr signature encoding"),
            Self::InvalidPublicKey => write!(f, "address is not a valid x-only public key"),
            Self::InvalidSecretKey => write!(f, "invalid secret key"),
        }
    }
}

impl std::error::Error for SchnorrError {}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

/// Schnorr-sign a 32-byte digest.
///
/// Deterministic: no auxiliary randomness is mixed in, so the same key and
/// digest always produce the same signature.
pub fn sign_digest(
    secp: &Secp256k1<impl Signing>,
    keypair: &Keypair,
    digest: &[u8; 32],
) -> Signature {
    let msg = Message::from_digest(*digest);
    secp.sign_schnorr_no_aux_rand(&msg, keypair)
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify a Schnorr signature against a 32-byte digest.
///
/// # Errors
///
/// Returns [`SchnorrError::VerificationFailed`] if the signature is invalid.
pub fn verify_digest(
    secp: &Secp256k1<impl Verification>,
    public_key: &XOnlyPublicKey,
    digest: &[u8; 32],
    signature: &Signature,
) -> Result<(), SchnorrError> {
    let msg = Message::from_digest(*digest);
    secp.verify_schnorr(signature, &msg, public_key)
        .map_err(|_| SchnorrError::VerificationFailed)
}

/// Verify raw signature bytes produced by the identity named by `address`.
///
/// # Errors
///
/// - [`SchnorrError::InvalidPublicKey`] if `address` is not a key (e.g. a
///   derived holding account address)
/// - [`SchnorrError::InvalidSignature`] if the bytes do not decode
/// - [`SchnorrError::VerificationFailed`] if the signature is wrong
pub fn verify_for_address(
    secp: &Secp256k1<impl Verification>,
    address: &Address,
    digest: &[u8; 32],
    signature: &[u8; 64],
) -> Result<(), SchnorrError> {
    let public_key = public_key_from_address(address)?;
    let signature = signature_from_bytes(signature)?;
    verify_digest(secp, &public_key, digest, &signature)
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Interpret an identity address as an x-only public key.
///
/// # Errors
///
/// Returns [`SchnorrError::InvalidPublicKey`] if the bytes are not on the curve.
pub fn public_key_from_address(address: &Address) -> Result<XOnlyPublicKey, SchnorrError> {
    XOnlyPublicKey::from_slice(address.as_bytes()).map_err(|_| SchnorrError::InvalidPublicKey)
}

/// Decode a 64-byte Schnorr signature.
///
/// # Errors
///
/// Returns [`SchnorrError::InvalidSignature`] if the bytes are not valid.
pub fn signature_from_bytes(bytes: &[u8]) -> Result<Signature, SchnorrError> {
    Signature::from_slice(bytes).map_err(|_| SchnorrError::InvalidSignature)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::secp256k1::SecretKey;

    fn test_keypair(byte: u8) -> Keypair {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[byte; 32]).expect("valid secret key");
        Keypair::from_secret_key(&secp, &sk)
    }

    fn address_of(keypair: &Keypair) -> Address {
        Address::from_bytes(keypair.x_only_public_key().0.serialize())
    }

    #[test]
    fn sign_and_verify_digest() {
        let secp = Secp256k1::new();
        let keypair = test_keypair(0xcd);
        let digest = [0xab; 32];

        let sig = sign_digest(&secp, &keypair, &digest);
        verify_digest(&secp, &keypair.x_only_public_key().0, &digest, &sig)
            .expect("should verify");
    }

    #[test]
    fn signing_is_deterministic() {
        let secp = Secp256k1::new();
        let keypair = test_keypair(0xcd);

        let a = sign_digest(&secp, &keypair, &[0x01; 32]);
        let b = sign_digest(&secp, &keypair, &[0x01; 32]);
        assert_eq!(a, b);
    }

    #[test]
    fn wrong_digest_fails_verification() {
        let secp = Secp256k1::new();
        let keypair = test_keypair(0xcd);

        let sig = sign_digest(&secp, &keypair, &[0x01; 32]);
        let result = verify_digest(&secp, &keypair.x_only_public_key().0, &[0x02; 32], &sig);

        assert_eq!(result, Err(SchnorrError::VerificationFailed));
    }

    #[test]
    fn verify_for_address_accepts_owner() {
        let secp = Secp256k1::new();
        let keypair = test_keypair(0x11);
        let digest = [0x33; 32];

        let sig = sign_digest(&secp, &keypair, &digest).serialize();
        verify_for_address(&secp, &address_of(&keypair), &digest, &sig).expect("should verify");
    }

    #[test]
    fn verify_for_address_rejects_other_identity() {
        let secp = Secp256k1::new();
        let signer = test_keypair(0x11);
        let other = test_keypair(0x22);
        let digest = [0x33; 32];

        let sig = sign_digest(&secp, &signer, &digest).serialize();
        let result = verify_for_address(&secp, &address_of(&other), &digest, &sig);

        assert_eq!(result, Err(SchnorrError::VerificationFailed));
    }

    #[test]
    fn off_curve_address_is_not_a_key() {
        // Larger than the field prime, so not an x coordinate.
        let address = Address::from_bytes([0xff; 32]);
        assert_eq!(
            public_key_from_address(&address),
            Err(SchnorrError::InvalidPublicKey)
        );
    }

    #[test]
    fn invalid_signature_rejected() {
        assert_eq!(
            signature_from_bytes(b"too short"),
            Err(SchnorrError::InvalidSignature)
        );
    }

    #[test]
    fn error_display() {
        assert_eq!(
            SchnorrError::VerificationFailed.to_string(),
            "Schnorr signature verification failed"
        );
    }
}
