//! JSON-RPC 2.0 [`Connection`] over HTTP.
//!
//! Provides [`RpcConnection`] -- a pooled `reqwest` client bound to one ledger
//! node. Construction does no network I/O; the first request opens the
//! connection.
//!
//! # Wire format
//!
//! Every call is a POST of `{"jsonrpc":"2.0","id":N,"method":M,"params":[..]}`.
//! Addresses travel in their bech32m text form, signatures and blockhashes as
//! hex, transactions as hex of [`Transaction::encode`]. A transaction refused
//! before execution comes back as error code [`TRANSACTION_REJECTED`] whose
//! `data` is the [`TransactionError`] wire name.
//!
//! # Example
//!
//! ```no_run
//! use config::NetworkConfig;
//! use transport::{Connection, RpcConnection};
//!
//! # async fn example() -> Result<(), transport::TransportError> {
//! let connection = RpcConnection::new(&NetworkConfig::LOCALNET)?;
//! let blockhash = connection.latest_blockhash().await?;
//! println!("{blockhash}");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use config::NetworkConfig;
use sdk_core::{Address, Blockhash, Commitment, TxSignature, hex};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Confirmation, Connection, HoldingAccount, SignatureStatus, TokenType, Transaction,
    TransactionError, TransportError, wait_for_commitment,
};

/// Error code a node uses for a transaction refused before execution.
pub const TRANSACTION_REJECTED: i64 = -32002;

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct Response<R> {
    result: Option<R>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl RpcErrorObject {
    fn into_error(self) -> TransportError {
        if self.code == TRANSACTION_REJECTED {
            if let Some(err) = self
                .data
                .and_then(|data| serde_json::from_value::<TransactionError>(data).ok())
            {
                return TransportError::Rejected(err);
            }
        }
        TransportError::Rpc {
            code: self.code,
            message: self.message,
        }
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// Ledger connection speaking JSON-RPC 2.0 over HTTP.
///
/// `RpcConnection` is `Send + Sync`; the underlying `reqwest::Client` pools
/// connections, so one instance serves concurrent workflows.
pub struct RpcConnection {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl fmt::Debug for RpcConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcConnection")
            .field("url", &self.url)
            .field("confirmation_timeout", &self.confirmation_timeout)
            .finish_non_exhaustive()
    }
}

impl RpcConnection {
    /// Creates a connection to `config.rpc_url` with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialize).
    pub fn new(config: &NetworkConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            client,
            url: config.rpc_url.to_owned(),
            next_id: AtomicU64::new(1),
            confirmation_timeout: config.confirmation_timeout,
            poll_interval: config.poll_interval,
        })
    }

    /// Endpoint URL this connection posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Posts one request and returns its `result`, `None` when it is `null`.
    async fn request<P, R>(&self, method: &str, params: P) -> Result<Option<R>, TransportError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(id, method, "rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&Request {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let body: Response<R> = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        if let Some(error) = body.error {
            debug!(id, method, code = error.code, "rpc error");
            return Err(error.into_error());
        }
        debug!(id, method, "rpc response");
        Ok(body.result)
    }

    async fn call<P, R>(&self, method: &str, params: P) -> Result<R, TransportError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        self.request(method, params)
            .await?
            .ok_or_else(|| TransportError::InvalidResponse(format!("{method}: missing result")))
    }
}

impl Connection for RpcConnection {
    async fn request_funding(&self, address: &Address, amount: u64) -> Result<TxSignature, TransportError> {
        self.call("requestFunding", (address, amount)).await
    }

    async fn latest_blockhash(&self) -> Result<Blockhash, TransportError> {
        self.call("getLatestBlockhash", [(); 0]).await
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<TxSignature, TransportError> {
        let encoded = hex::encode(&transaction.encode());
        self.call("sendTransaction", (encoded,)).await
    }

    async fn signature_status(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<SignatureStatus>, TransportError> {
        self.request("getSignatureStatus", (signature,)).await
    }

    async fn confirm_transaction(
        &self,
        signature: &TxSignature,
        commitment: Commitment,
    ) -> Result<Confirmation, TransportError> {
        wait_for_commitment(
            self,
            signature,
            commitment,
            self.confirmation_timeout,
            self.poll_interval,
        )
        .await
    }

    async fn token_type(&self, address: &Address) -> Result<Option<TokenType>, TransportError> {
        self.request("getTokenType", (address,)).await
    }

    async fn holding_account(&self, address: &Address) -> Result<Option<HoldingAccount>, TransportError> {
        self.request("getHoldingAccount", (address,)).await
    }

    async fn balance(&self, address: &Address) -> Result<u64, TransportError> {
        self.call("getBalance", (address,)).await
    }
}
