//! Mint-drop SDK: create a token, issue one unit, and deliver it.
//!
//! The SDK orchestrates ledger operations by combining:
//! - **Connection** ([`transport::Connection`]) for every ledger interaction
//! - **Signing** ([`signer::Keypair`]) for the per-run ephemeral identity
//! - **Tracking** ([`tracking::OperationStore`]) for step-level observability
//! - **Notifications** ([`notify::NotificationSink`]) for the operator
//!
//! # Workflow
//!
//! [`Sdk::mint_drop`] runs the seven steps in strict sequence, each waiting
//! for confirmation before the next starts:
//!
//! 1. Generate and fund an ephemeral identity
//! 2. Create a token type (precision 9, no freeze authority)
//! 3. Resolve the identity's holding account
//! 4. Issue one whole token into it
//! 5. Revoke the issuance authority, fixing the supply forever
//! 6. Resolve the recipient's holding account
//! 7. Transfer the full amount to the recipient
//!
//! Each step is also a public method so it can be driven on its own.
//!
//! # Usage
//!
//! ```no_run
//! use config::NetworkConfig;
//! use sdk::{MintDropOutcome, Sdk, SdkConfig};
//! use sdk_core::Address;
//! use transport::RpcConnection;
//!
//! # async fn example(recipient: Address) -> Result<(), Box<dyn std::error::Error>> {
//! let network = NetworkConfig::LOCALNET;
//! let sdk = Sdk::new(SdkConfig { network }, RpcConnection::new(&network)?);
//!
//! // SDK is Clone -- share across tasks.
//! let sdk2 = sdk.clone();
//!
//! match sdk2.mint_drop(Some(&recipient)).await? {
//!     MintDropOutcome::Transferred(receipt) => println!("{}", receipt.signature),
//!     MintDropOutcome::NotAuthorized => println!("no wallet connected"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod notify;
pub mod operations;

pub use error::SdkError;
pub use operations::mint_drop::{MintDropOutcome, MintDropReceipt};
pub use operations::tracking;

use std::sync::{Arc, RwLock};

use config::NetworkConfig;
use sdk_core::Address;
use transport::Connection;

use crate::notify::{NotificationSink, TracingNotifier};
use crate::operations::tracking::{NoopOperationStore, OperationStore, OperationTracker};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// SDK configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdkConfig {
    /// Ledger endpoint, commitment level, and confirmation timing.
    pub network: NetworkConfig,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::LOCALNET,
        }
    }
}

// ---------------------------------------------------------------------------
// Sdk
// ---------------------------------------------------------------------------

/// Shared state across all SDK operations.
pub(crate) struct SdkInner<C> {
    pub config: SdkConfig,
    pub connection: C,
    pub operation_store: RwLock<Arc<dyn OperationStore>>,
    pub notifier: RwLock<Arc<dyn NotificationSink>>,
}

/// The mint-drop SDK entry point.
///
/// `Clone`-able (wraps an `Arc<SdkInner>`). Runs share the connection and
/// nothing else: every run generates its own identity and token type.
///
/// # Type Parameters
///
/// - `C`: Ledger connection ([`transport::RpcConnection`] in production,
///   [`transport::LocalLedger`] in tests)
pub struct Sdk<C> {
    pub(crate) inner: Arc<SdkInner<C>>,
}

// Manual Clone: we don't require C to be Clone.
impl<C> Clone for Sdk<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: std::fmt::Debug> std::fmt::Debug for Sdk<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sdk")
            .field("connection", &self.inner.connection)
            .finish()
    }
}

impl<C: Connection> Sdk<C> {
    /// Creates a new SDK instance over `connection`.
    ///
    /// No network I/O happens during construction.
    pub fn new(config: SdkConfig, connection: C) -> Self {
        Self {
            inner: Arc::new(SdkInner {
                config,
                connection,
                operation_store: RwLock::new(Arc::new(NoopOperationStore)),
                notifier: RwLock::new(Arc::new(TracingNotifier)),
            }),
        }
    }

    /// Returns a reference to the SDK configuration.
    pub fn config(&self) -> &SdkConfig {
        &self.inner.config
    }

    /// Returns a reference to the ledger connection.
    pub fn connection(&self) -> &C {
        &self.inner.connection
    }

    // -----------------------------------------------------------------------
    // Operation tracking
    // -----------------------------------------------------------------------

    /// Replace the operation store at runtime.
    ///
    /// Use [`tracking::InMemoryOperationStore`] for observability.
    pub fn set_operation_store(&self, store: Arc<dyn OperationStore>) {
        *self.inner.operation_store.write().unwrap() = store;
    }

    /// Get the current operation store (cheap `Arc` clone).
    pub fn operation_store(&self) -> Arc<dyn OperationStore> {
        self.inner.operation_store.read().unwrap().clone()
    }

    /// Start tracking a new run.
    pub(crate) fn tracker(&self, recipient: Address) -> OperationTracker {
        OperationTracker::start(self.operation_store(), recipient)
    }

    /// Query a tracked run by ID.
    ///
    /// Returns `None` if the run was not found (e.g. using
    /// [`tracking::NoopOperationStore`]).
    pub fn query_operation(&self, id: tracking::OperationId) -> Option<tracking::Operation> {
        self.operation_store().get(id)
    }

    /// List all runs still in progress.
    pub fn active_operations(&self) -> Vec<tracking::Operation> {
        self.operation_store().list_active()
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    /// Replace the notification sink at runtime.
    pub fn set_notifier(&self, notifier: Arc<dyn NotificationSink>) {
        *self.inner.notifier.write().unwrap() = notifier;
    }

    /// Get the current notification sink (cheap `Arc` clone).
    pub fn notifier(&self) -> Arc<dyn NotificationSink> {
        self.inner.notifier.read().unwrap().clone()
    }
}
