//! Shared fixtures for the SDK integration tests.
//!
//! [`FaultyLedger`] wraps a [`LocalLedger`], counts every call, keeps every
//! submitted transaction, and can be told to fail a specific call.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use config::NetworkConfig;
use sdk::notify::RecordingNotifier;
use sdk::tracking::InMemoryOperationStore;
use sdk::{Sdk, SdkConfig};
use sdk_core::{Address, Blockhash, Commitment, TxSignature};
use transport::{
    Confirmation, Connection, HoldingAccount, Instruction, LocalLedger, SignatureStatus, TokenType,
    Transaction, TransportError,
};

// ---------------------------------------------------------------------------
// Faults
// ---------------------------------------------------------------------------

/// A single injected failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The faucet is unreachable.
    FundingUnavailable,
    /// The `n`th transaction submission (0-based) fails at the transport.
    SendUnavailable(usize),
    /// The `n`th confirmation wait (0-based, funding included) times out.
    ConfirmTimeout(usize),
    /// The first holding account read reports "absent" even if it exists.
    StaleHoldingRead,
}

// ---------------------------------------------------------------------------
// FaultyLedger
// ---------------------------------------------------------------------------

/// Counting, fault-injecting [`Connection`] over a [`LocalLedger`].
pub struct FaultyLedger {
    pub ledger: Arc<LocalLedger>,
    fault: Mutex<Option<Fault>>,
    calls: AtomicUsize,
    sends: AtomicUsize,
    confirms: AtomicUsize,
    sent: Mutex<Vec<Transaction>>,
}

impl FaultyLedger {
    pub fn new() -> Self {
        Self::over(Arc::new(LocalLedger::new()))
    }

    pub fn over(ledger: Arc<LocalLedger>) -> Self {
        Self {
            ledger,
            fault: Mutex::new(None),
            calls: AtomicUsize::new(0),
            sends: AtomicUsize::new(0),
            confirms: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_fault(self, fault: Fault) -> Self {
        self.set_fault(fault);
        self
    }

    /// Arm `fault`, replacing any fault not yet triggered.
    pub fn set_fault(&self, fault: Fault) {
        *self.fault.lock().unwrap() = Some(fault);
    }

    /// Total number of connection calls of any kind.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of transaction submissions attempted, failed ones included.
    pub fn send_attempts(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    /// Transactions that reached the ledger.
    pub fn sent(&self) -> Vec<Transaction> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of submitted `CreateHoldingAccount` instructions.
    pub fn holding_creations(&self) -> usize {
        self.sent()
            .iter()
            .flat_map(|tx| tx.message.instructions.iter())
            .filter(|i| matches!(i, Instruction::CreateHoldingAccount { .. }))
            .count()
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn fault(&self) -> Option<Fault> {
        *self.fault.lock().unwrap()
    }

    fn take_fault_if(&self, wanted: Fault) -> bool {
        let mut fault = self.fault.lock().unwrap();
        if *fault == Some(wanted) {
            *fault = None;
            true
        } else {
            false
        }
    }
}

impl Connection for FaultyLedger {
    async fn request_funding(&self, address: &Address, amount: u64) -> Result<TxSignature, TransportError> {
        self.tick();
        if self.fault() == Some(Fault::FundingUnavailable) {
            return Err(TransportError::Http("faucet unreachable".into()));
        }
        self.ledger.request_funding(address, amount).await
    }

    async fn latest_blockhash(&self) -> Result<Blockhash, TransportError> {
        self.tick();
        self.ledger.latest_blockhash().await
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<TxSignature, TransportError> {
        self.tick();
        let n = self.sends.fetch_add(1, Ordering::SeqCst);
        if self.fault() == Some(Fault::SendUnavailable(n)) {
            return Err(TransportError::Http("connection reset".into()));
        }
        self.sent.lock().unwrap().push(transaction.clone());
        self.ledger.send_transaction(transaction).await
    }

    async fn signature_status(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<SignatureStatus>, TransportError> {
        self.tick();
        self.ledger.signature_status(signature).await
    }

    async fn confirm_transaction(
        &self,
        signature: &TxSignature,
        commitment: Commitment,
    ) -> Result<Confirmation, TransportError> {
        self.tick();
        let n = self.confirms.fetch_add(1, Ordering::SeqCst);
        if self.fault() == Some(Fault::ConfirmTimeout(n)) {
            return Err(TransportError::ConfirmationTimeout);
        }
        self.ledger.confirm_transaction(signature, commitment).await
    }

    async fn token_type(&self, address: &Address) -> Result<Option<TokenType>, TransportError> {
        self.tick();
        self.ledger.token_type(address).await
    }

    async fn holding_account(&self, address: &Address) -> Result<Option<HoldingAccount>, TransportError> {
        self.tick();
        if self.take_fault_if(Fault::StaleHoldingRead) {
            return Ok(None);
        }
        self.ledger.holding_account(address).await
    }

    async fn balance(&self, address: &Address) -> Result<u64, TransportError> {
        self.tick();
        self.ledger.balance(address).await
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// An SDK over a [`FaultyLedger`], with recording store and notifier attached.
pub struct Harness {
    pub sdk: Sdk<Arc<FaultyLedger>>,
    pub connection: Arc<FaultyLedger>,
    pub store: Arc<InMemoryOperationStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(FaultyLedger::new())
    }

    pub fn with_fault(fault: Fault) -> Self {
        Self::with(FaultyLedger::new().with_fault(fault))
    }

    pub fn with(connection: FaultyLedger) -> Self {
        let connection = Arc::new(connection);
        let sdk = Sdk::new(test_config(), Arc::clone(&connection));

        let store = Arc::new(InMemoryOperationStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        sdk.set_operation_store(store.clone());
        sdk.set_notifier(notifier.clone());

        Self {
            sdk,
            connection,
            store,
            notifier,
        }
    }

    pub fn ledger(&self) -> &LocalLedger {
        &self.connection.ledger
    }

    /// Token balance of `owner` for `token_type`, 0 if no holding account.
    pub async fn token_balance(&self, owner: &Address, token_type: &Address) -> u64 {
        let address = transport::holding_account_address(owner, token_type);
        self.ledger()
            .holding_account(&address)
            .await
            .unwrap()
            .map_or(0, |h| h.amount)
    }
}

/// Localnet settings with a short confirmation window.
pub fn test_config() -> SdkConfig {
    SdkConfig {
        network: NetworkConfig {
            confirmation_timeout: Duration::from_secs(2),
            poll_interval: Duration::from_millis(5),
            ..NetworkConfig::LOCALNET
        },
    }
}

/// A random address that nobody holds a key for in the test.
pub fn random_recipient() -> Address {
    use signer::Signer;
    signer::Keypair::generate().address()
}

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

/// Counts `ERROR` events seen by the subscriber it is installed in.
#[derive(Clone, Default)]
pub struct ErrorEvents(Arc<AtomicUsize>);

impl ErrorEvents {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Install as the thread's default subscriber for the guard's lifetime.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        use tracing_subscriber::layer::SubscriberExt;
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ErrorEvents {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}
