//! Protocol constants.
//!
//! Fixed parameters of the ledger and of the mint-drop workflow. None of
//! these are configurable at runtime.

/// Fractional-unit precision of every token type the workflow creates.
pub const TOKEN_DECIMALS: u8 = 9;

/// Base units in one whole token (`10^TOKEN_DECIMALS`).
pub const BASE_UNITS_PER_TOKEN: u64 = 10u64.pow(TOKEN_DECIMALS as u32);

/// Quantity issued and then transferred: exactly one whole token.
pub const ISSUE_AMOUNT: u64 = BASE_UNITS_PER_TOKEN;

/// Native units in one coin of the ledger's native currency.
pub const NATIVE_UNITS_PER_COIN: u64 = 1_000_000_000;

/// Native units requested for the ephemeral identity.
pub const FUNDING_AMOUNT: u64 = NATIVE_UNITS_PER_COIN;

/// Largest single funding request the faucet honours.
pub const MAX_FUNDING_REQUEST: u64 = 2 * NATIVE_UNITS_PER_COIN;

/// Fee charged to the fee payer per required signature.
pub const FEE_PER_SIGNATURE: u64 = 5_000;

/// Number of recent blockhashes a transaction may reference.
pub const RECENT_BLOCKHASH_WINDOW: usize = 150;

/// Slots after which a confirmed transaction becomes finalized.
pub const FINALITY_DEPTH: u64 = 32;

/// Default confirmation wait in milliseconds.
pub const DEFAULT_CONFIRMATION_TIMEOUT_MS: u64 = 30_000;

/// Default delay between signature status polls in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 400;

/// Default connection timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Default request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
