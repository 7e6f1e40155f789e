//! Static network configuration for the mint-drop workflow.
//!
//! This crate provides compile-time configuration:
//!
//! - [`NetworkConfig`] -- RPC endpoint, commitment level, and confirmation timing
//! - [`constants`] -- protocol-level parameters (precision, amounts, fees)
//! - [`labels`] -- fixed operator-facing messages
//!
//! All data is compile-time constant. Types are `Copy`. The target network is
//! fixed; there is no runtime override.
//!
//! `config` depends only on [`sdk_core`], so it can be used freely as a leaf
//! dependency.

pub mod constants;
pub mod labels;

use std::time::Duration;

use sdk_core::Commitment;

// ---------------------------------------------------------------------------
// NetworkConfig
// ---------------------------------------------------------------------------

/// Connection parameters for the ledger network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint of the ledger node.
    pub rpc_url: &'static str,

    /// Commitment level every workflow step waits for.
    pub commitment: Commitment,

    /// How long a confirmation wait may take before giving up.
    pub confirmation_timeout: Duration,

    /// Delay between signature status polls while waiting for confirmation.
    pub poll_interval: Duration,

    /// TCP connect timeout for RPC requests.
    pub connect_timeout: Duration,

    /// Overall timeout for a single RPC request.
    pub request_timeout: Duration,
}

impl NetworkConfig {
    /// Local validator configuration.
    pub const LOCALNET: Self = Self {
        rpc_url: "http://127.0.0.1:8899",
        commitment: Commitment::Confirmed,
        confirmation_timeout: Duration::from_millis(constants::DEFAULT_CONFIRMATION_TIMEOUT_MS),
        poll_interval: Duration::from_millis(constants::DEFAULT_POLL_INTERVAL_MS),
        connect_timeout: Duration::from_millis(constants::DEFAULT_CONNECT_TIMEOUT_MS),
        request_timeout: Duration::from_millis(constants::DEFAULT_REQUEST_TIMEOUT_MS),
    };
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::LOCALNET
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
