//! Operator-facing labels.

/// Message carried by the single failure notification of a mint drop.
pub const MINT_DROP_FAILED: &str = "Mint failed.";
