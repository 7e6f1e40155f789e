//! Schnorr keypair backed by `bitcoin::secp256k1`.

use std::fmt;

use bitcoin::secp256k1::{self, Secp256k1, SecretKey, SignOnly};
use sdk_core::Address;

use crate::Signer;
use crate::schnorr::{self, SchnorrError};

/// A ledger identity: secp256k1 keypair whose x-only public key is its address.
///
/// Holds the pre-computed address so [`Signer::address`] is a simple copy.
/// The [`Secp256k1<SignOnly>`] context avoids carrying verification tables.
///
/// Never serialized and never exposes its secret through `Debug`: ephemeral
/// identities live only in the memory of the run that generated them.
pub struct Keypair {
    keypair: secp256k1::Keypair,
    address: Address,
    secp: Secp256k1<SignOnly>,
}

impl Keypair {
    /// Generates a fresh random keypair from the OS RNG.
    ///
    /// Infallible: re-draws in the (astronomically unlikely) event that 32
    /// random bytes fall outside the valid secret key range.
    pub fn generate() -> Self {
        loop {
            let mut bytes = [0u8; 32];
            rand_core::RngCore::fill_bytes(&mut rand_core::OsRng, &mut bytes);
            if let Ok(keypair) = Self::from_secret_bytes(&bytes) {
                return keypair;
            }
        }
    }

    /// Builds a keypair from raw secret key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SchnorrError::InvalidSecretKey`] if the bytes are zero or
    /// not below the curve order.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self, SchnorrError> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|_| SchnorrError::InvalidSecretKey)?;
        let secp = Secp256k1::signing_only();
        let keypair = secp256k1::Keypair::from_secret_key(&secp, &secret_key);
        let (xonly, _parity) = keypair.x_only_public_key();
        Ok(Self {
            keypair,
            address: Address::from_bytes(xonly.serialize()),
            secp,
        })
    }
}

impl Signer for Keypair {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_digest(&self, digest: &[u8; 32]) -> [u8; 64] {
        schnorr::sign_digest(&self.secp, &self.keypair, digest).serialize()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
