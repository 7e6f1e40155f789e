//! In-process ledger implementing [`Connection`].
//!
//! [`LocalLedger`] executes the full instruction set with the same rules a
//! node applies, so workflows can be exercised without a network:
//!
//! 1. **Admission** (failure rejects the submission, nothing is recorded):
//!    recent blockhash, one valid signature per required signer, not already
//!    processed, fee payer can cover the fee.
//! 2. **Execution** (failure is recorded in the signature status): all
//!    instructions run against a copy of the account state, which replaces
//!    the live state only if every instruction succeeds.
//!
//! The fee is charged for every admitted transaction, successful or not.
//! Each admitted transaction or funding request occupies one slot; a slot
//! record is confirmed immediately and finalized after
//! [`FINALITY_DEPTH`](config::constants::FINALITY_DEPTH) further slots.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use bitcoin::hashes::{Hash, HashEngine, sha256};
use bitcoin::secp256k1::{Secp256k1, VerifyOnly};
use config::NetworkConfig;
use config::constants::{
    FEE_PER_SIGNATURE, FINALITY_DEPTH, MAX_FUNDING_REQUEST, RECENT_BLOCKHASH_WINDOW,
};
use sdk_core::{Address, Blockhash, Commitment, TxSignature};
use signer::schnorr;
use tracing::debug;

use crate::{
    Confirmation, Connection, HoldingAccount, Instruction, SignatureStatus, TokenType,
    Transaction, TransactionError, TransportError, holding_account_address, wait_for_commitment,
};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Record {
    slot: u64,
    err: Option<TransactionError>,
}

/// Token accounts, copied wholesale for atomic execution.
#[derive(Debug, Clone, Default)]
struct Accounts {
    token_types: HashMap<Address, TokenType>,
    holdings: HashMap<Address, HoldingAccount>,
}

#[derive(Debug)]
struct LedgerState {
    slot: u64,
    recent_blockhashes: VecDeque<Blockhash>,
    balances: HashMap<Address, u64>,
    accounts: Accounts,
    records: HashMap<TxSignature, Record>,
}

impl LedgerState {
    fn genesis() -> Self {
        let genesis = Blockhash::from_bytes(sha256::Hash::hash(b"local-ledger/genesis").to_byte_array());
        Self {
            slot: 0,
            recent_blockhashes: VecDeque::from([genesis]),
            balances: HashMap::new(),
            accounts: Accounts::default(),
            records: HashMap::new(),
        }
    }

    fn latest_blockhash(&self) -> Blockhash {
        // The deque is never empty: genesis is pushed at construction.
        self.recent_blockhashes
            .back()
            .copied()
            .unwrap_or(Blockhash::from_bytes([0; 32]))
    }

    /// Closes the current slot and opens the next with a fresh blockhash.
    fn advance_slot(&mut self) {
        self.slot += 1;
        let mut engine = sha256::Hash::engine();
        engine.input(self.latest_blockhash().as_bytes());
        engine.input(&self.slot.to_be_bytes());
        let next = Blockhash::from_bytes(sha256::Hash::from_engine(engine).to_byte_array());

        self.recent_blockhashes.push_back(next);
        while self.recent_blockhashes.len() > RECENT_BLOCKHASH_WINDOW {
            self.recent_blockhashes.pop_front();
        }
    }

    fn record(&mut self, signature: TxSignature, err: Option<TransactionError>) {
        self.records.insert(
            signature,
            Record {
                slot: self.slot,
                err,
            },
        );
        self.advance_slot();
    }

    fn status(&self, signature: &TxSignature) -> Option<SignatureStatus> {
        self.records.get(signature).map(|record| {
            let depth = self.slot.saturating_sub(record.slot);
            let commitment = if depth >= FINALITY_DEPTH {
                Commitment::Finalized
            } else {
                Commitment::Confirmed
            };
            SignatureStatus {
                slot: record.slot,
                commitment,
                err: record.err,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

impl Accounts {
    fn execute(&mut self, instruction: &Instruction) -> Result<(), TransactionError> {
        match instruction {
            Instruction::CreateTokenType {
                token_type,
                decimals,
                issuance_authority,
                freeze_authority,
            } => {
                if self.token_types.contains_key(token_type) || self.holdings.contains_key(token_type) {
                    return Err(TransactionError::AccountAlreadyExists);
                }
                self.token_types.insert(
                    *token_type,
                    TokenType {
                        address: *token_type,
                        decimals: *decimals,
                        supply: 0,
                        issuance_authority: Some(*issuance_authority),
                        freeze_authority: *freeze_authority,
                    },
                );
            }

            Instruction::CreateHoldingAccount { owner, token_type } => {
                if !self.token_types.contains_key(token_type) {
                    return Err(TransactionError::AccountNotFound);
                }
                let address = holding_account_address(owner, token_type);
                if self.holdings.contains_key(&address) {
                    return Err(TransactionError::AccountAlreadyExists);
                }
                self.holdings.insert(
                    address,
                    HoldingAccount {
                        address,
                        owner: *owner,
                        token_type: *token_type,
                        amount: 0,
                    },
                );
            }

            Instruction::IssueSupply {
                token_type,
                destination,
                authority,
                amount,
            } => {
                let token = self
                    .token_types
                    .get_mut(token_type)
                    .ok_or(TransactionError::AccountNotFound)?;
                match token.issuance_authority {
                    None => return Err(TransactionError::IssuanceDisabled),
                    Some(current) if current != *authority => {
                        return Err(TransactionError::Unauthorized);
                    }
                    Some(_) => {}
                }
                let holding = self
                    .holdings
                    .get_mut(destination)
                    .ok_or(TransactionError::AccountNotFound)?;
                if holding.token_type != *token_type {
                    return Err(TransactionError::TokenTypeMismatch);
                }
                token.supply = token
                    .supply
                    .checked_add(*amount)
                    .ok_or(TransactionError::Overflow)?;
                holding.amount = holding
                    .amount
                    .checked_add(*amount)
                    .ok_or(TransactionError::Overflow)?;
            }

            Instruction::SetIssuanceAuthority {
                token_type,
                current_authority,
                new_authority,
            } => {
                let token = self
                    .token_types
                    .get_mut(token_type)
                    .ok_or(TransactionError::AccountNotFound)?;
                match token.issuance_authority {
                    None => return Err(TransactionError::IssuanceDisabled),
                    Some(current) if current != *current_authority => {
                        return Err(TransactionError::Unauthorized);
                    }
                    Some(_) => token.issuance_authority = *new_authority,
                }
            }

            Instruction::Transfer {
                source,
                destination,
                owner,
                amount,
            } => {
                let from = self
                    .holdings
                    .get(source)
                    .ok_or(TransactionError::AccountNotFound)?;
                let to = self
                    .holdings
                    .get(destination)
                    .ok_or(TransactionError::AccountNotFound)?;
                if from.token_type != to.token_type {
                    return Err(TransactionError::TokenTypeMismatch);
                }
                if from.owner != *owner {
                    return Err(TransactionError::Unauthorized);
                }
                if from.amount < *amount {
                    return Err(TransactionError::InsufficientTokenBalance);
                }
                if source == destination {
                    return Ok(());
                }
                let credited = to
                    .amount
                    .checked_add(*amount)
                    .ok_or(TransactionError::Overflow)?;

                if let Some(from) = self.holdings.get_mut(source) {
                    from.amount -= *amount;
                }
                if let Some(to) = self.holdings.get_mut(destination) {
                    to.amount = credited;
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LocalLedger
// ---------------------------------------------------------------------------

/// In-process ledger for tests and offline runs.
///
/// Thread-safe; every operation takes a short internal lock and never holds
/// it across an await.
pub struct LocalLedger {
    state: Mutex<LedgerState>,
    secp: Secp256k1<VerifyOnly>,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl std::fmt::Debug for LocalLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("LocalLedger")
            .field("slot", &state.slot)
            .field("transactions", &state.records.len())
            .finish_non_exhaustive()
    }
}

impl Default for LocalLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalLedger {
    /// Creates an empty ledger using the localnet confirmation timing.
    pub fn new() -> Self {
        let network = NetworkConfig::LOCALNET;
        Self {
            state: Mutex::new(LedgerState::genesis()),
            secp: Secp256k1::verification_only(),
            confirmation_timeout: network.confirmation_timeout,
            poll_interval: network.poll_interval,
        }
    }

    /// Overrides how long [`Connection::confirm_transaction`] waits for an
    /// unknown signature.
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self.poll_interval = self.poll_interval.min(timeout);
        self
    }

    /// Advance the ledger by `n` empty slots.
    ///
    /// Ages blockhashes out of the recent window and moves records toward
    /// finality.
    pub fn advance_slots(&self, n: u64) {
        let mut state = self.state.lock().unwrap();
        for _ in 0..n {
            state.advance_slot();
        }
    }

    /// Number of admitted transactions and funding requests.
    pub fn transaction_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    /// Every holding account of `token_type`.
    pub fn holdings_of(&self, token_type: &Address) -> Vec<HoldingAccount> {
        self.state
            .lock()
            .unwrap()
            .accounts
            .holdings
            .values()
            .filter(|h| h.token_type == *token_type)
            .cloned()
            .collect()
    }

    fn fund(&self, address: &Address, amount: u64) -> Result<TxSignature, TransactionError> {
        if amount > MAX_FUNDING_REQUEST {
            return Err(TransactionError::FundingLimitExceeded);
        }
        let mut state = self.state.lock().unwrap();

        let balance = state.balances.entry(*address).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(TransactionError::Overflow)?;

        let signature = funding_signature(address, state.slot);
        state.record(signature, None);
        debug!(%address, amount, %signature, "funded");
        Ok(signature)
    }

    fn process(&self, transaction: &Transaction) -> Result<TxSignature, TransactionError> {
        let message = &transaction.message;
        let required = message.required_signers();
        let digest = message.digest();

        let mut state = self.state.lock().unwrap();

        if !state.recent_blockhashes.contains(&message.recent_blockhash) {
            return Err(TransactionError::BlockhashNotFound);
        }
        if transaction.signatures.len() != required.len() {
            return Err(TransactionError::MissingSignature);
        }
        for (address, signature) in required.iter().zip(&transaction.signatures) {
            schnorr::verify_for_address(&self.secp, address, &digest, signature)
                .map_err(|_| TransactionError::InvalidSignature)?;
        }
        let signature = transaction
            .signature()
            .ok_or(TransactionError::MissingSignature)?;
        if state.records.contains_key(&signature) {
            return Err(TransactionError::AlreadyProcessed);
        }

        let fee = FEE_PER_SIGNATURE * transaction.signatures.len() as u64;
        let payer_balance = state.balances.get(&message.fee_payer).copied().unwrap_or(0);
        if payer_balance < fee {
            return Err(TransactionError::InsufficientFunds);
        }

        let mut accounts = state.accounts.clone();
        let outcome = message
            .instructions
            .iter()
            .try_for_each(|instruction| accounts.execute(instruction));

        state.balances.insert(message.fee_payer, payer_balance - fee);
        let err = match outcome {
            Ok(()) => {
                state.accounts = accounts;
                None
            }
            Err(err) => Some(err),
        };
        state.record(signature, err);
        debug!(%signature, ?err, slot = state.slot, "processed transaction");
        Ok(signature)
    }
}

/// Synthetic id for a faucet credit. Unique per (address, slot).
fn funding_signature(address: &Address, slot: u64) -> TxSignature {
    let half = |domain: &[u8]| {
        let mut engine = sha256::Hash::engine();
        engine.input(domain);
        engine.input(address.as_bytes());
        engine.input(&slot.to_be_bytes());
        sha256::Hash::from_engine(engine).to_byte_array()
    };
    let mut bytes = [0u8; 64];
    bytes[..32].copy_from_slice(&half(b"local-ledger/funding/0"));
    bytes[32..].copy_from_slice(&half(b"local-ledger/funding/1"));
    TxSignature::from_bytes(bytes)
}

impl Connection for LocalLedger {
    async fn request_funding(&self, address: &Address, amount: u64) -> Result<TxSignature, TransportError> {
        Ok(self.fund(address, amount)?)
    }

    async fn latest_blockhash(&self) -> Result<Blockhash, TransportError> {
        Ok(self.state.lock().unwrap().latest_blockhash())
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<TxSignature, TransportError> {
        Ok(self.process(transaction)?)
    }

    async fn signature_status(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<SignatureStatus>, TransportError> {
        Ok(self.state.lock().unwrap().status(signature))
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
        Ok(self.state.lock().unwrap().accounts.token_types.get(address).cloned())
    }

    async fn holding_account(&self, address: &Address) -> Result<Option<HoldingAccount>, TransportError> {
        Ok(self.state.lock().unwrap().accounts.holdings.get(address).cloned())
    }

    async fn balance(&self, address: &Address) -> Result<u64, TransportError> {
        Ok(self.state.lock().unwrap().balances.get(address).copied().unwrap_or(0))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
