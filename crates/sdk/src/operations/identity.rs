//! Ephemeral identity provisioning.

use signer::{Keypair, Signer};
use tracing::debug;
use transport::Connection;

use crate::Sdk;

impl<C: Connection> Sdk<C> {
    /// Generate a fresh identity for one workflow run.
    ///
    /// Never persisted and never reused. Makes no network calls and cannot
    /// fail.
    pub fn provision_identity(&self) -> Keypair {
        let identity = Keypair::generate();
        debug!(address = %identity.address(), "ephemeral identity generated");
        identity
    }
}
