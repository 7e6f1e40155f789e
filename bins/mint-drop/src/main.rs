//! One-shot mint drop.
//!
//! Runs the workflow once against the local validator: creates a fresh token
//! type, issues one token, fixes the supply, and delivers the token to the
//! connected recipient. Exits non-zero if the run fails.
//!
//! # Configuration
//!
//! Set `MINT_DROP_RECIPIENT` to the bech32m address of the connected wallet.
//! If unset, no wallet is connected: the run returns without touching the
//! network and without error.
//!
//! ```bash
//! export MINT_DROP_RECIPIENT="ldg1..."
//! RUST_LOG=info cargo run --release -p mint-drop
//! ```

use std::env;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use config::NetworkConfig;
use sdk::tracking::OperationError;
use sdk::{MintDropOutcome, Sdk, SdkConfig};
use sdk_core::Address;
use transport::RpcConnection;

const NETWORK: NetworkConfig = NetworkConfig::LOCALNET;
const RECIPIENT_VAR: &str = "MINT_DROP_RECIPIENT";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!(rpc_url = NETWORK.rpc_url, "mint-drop starting");

    let recipient = match resolve_recipient() {
        Ok(recipient) => recipient,
        Err(e) => {
            tracing::error!("{RECIPIENT_VAR} is not a valid address: {e}");
            return ExitCode::FAILURE;
        }
    };

    // -----------------------------------------------------------------------
    // SDK init
    // -----------------------------------------------------------------------

    let connection = match RpcConnection::new(&NETWORK) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::error!("failed to build rpc client: {e}");
            return ExitCode::FAILURE;
        }
    };
    let sdk = Sdk::new(SdkConfig { network: NETWORK }, connection);

    // -----------------------------------------------------------------------
    // Run
    // -----------------------------------------------------------------------

    let result = sdk.mint_drop(recipient.as_ref()).await;
    if report(&result) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Logs the outcome of a run. Returns `true` unless the run failed.
fn report(result: &Result<MintDropOutcome, OperationError>) -> bool {
    match result {
        Ok(MintDropOutcome::Transferred(receipt)) => {
            tracing::info!(
                op_id = %receipt.operation_id,
                token_type = %receipt.token_type,
                destination = %receipt.destination,
                amount = receipt.amount,
                commitment = %receipt.commitment,
                "token delivered"
            );
            println!("{}", receipt.signature);
            true
        }
        Ok(MintDropOutcome::NotAuthorized) => {
            tracing::warn!("no wallet connected, set {RECIPIENT_VAR} to run the mint drop");
            true
        }
        // Already logged and notified by the SDK.
        Err(_) => false,
    }
}

/// Reads the connected wallet from the environment. `Ok(None)` if unset.
fn resolve_recipient() -> Result<Option<Address>, sdk_core::AddressError> {
    parse_recipient(env::var(RECIPIENT_VAR).ok().as_deref())
}

fn parse_recipient(raw: Option<&str>) -> Result<Option<Address>, sdk_core::AddressError> {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw.parse().map(Some),
        _ => Ok(None),
    }
}
