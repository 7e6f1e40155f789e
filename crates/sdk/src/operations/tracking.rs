//! Operation tracking: structured observability for the mint-drop workflow.
//!
//! Every workflow run creates an [`Operation`] record that captures:
//! - A unique [`OperationId`] for log correlation
//! - The recipient and the current [`WorkflowState`]
//! - A sequence of [`StepRecord`]s with timestamps, durations, and outcomes
//!
//! The [`OperationStore`] trait provides pluggable persistence. The default
//! [`NoopOperationStore`] discards everything; [`InMemoryOperationStore`]
//! keeps records for inspection.
//!
//! There is no retry: the first failed step ends the run in
//! [`WorkflowState::Failed`].

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use sdk_core::Address;

use crate::SdkError;

// ---------------------------------------------------------------------------
// OperationId
// ---------------------------------------------------------------------------

/// Unique identifier for a workflow run.
///
/// Monotonically increasing u64 -- cheap to create, copy, and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(u64);

impl OperationId {
    /// Generate the next unique operation ID.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// WorkflowState
// ---------------------------------------------------------------------------

/// Position of a run in the workflow state machine.
///
/// ```text
/// Init -> Funded -> AssetCreated -> SourceReady -> Issued
///      -> AuthorityRevoked -> DestinationReady -> Transferred
/// ```
///
/// Any non-terminal state moves to `Failed` on the first error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowState {
    Init,
    Funded,
    AssetCreated,
    SourceReady,
    Issued,
    AuthorityRevoked,
    DestinationReady,
    Transferred,
    Failed,
}

impl WorkflowState {
    /// Returns `true` for `Transferred` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Transferred | Self::Failed)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Funded => write!(f, "funded"),
            Self::AssetCreated => write!(f, "asset_created"),
            Self::SourceReady => write!(f, "source_ready"),
            Self::Issued => write!(f, "issued"),
            Self::AuthorityRevoked => write!(f, "authority_revoked"),
            Self::DestinationReady => write!(f, "destination_ready"),
            Self::Transferred => write!(f, "transferred"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// OperationStep
// ---------------------------------------------------------------------------

/// A network-facing step of the workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationStep {
    /// Faucet credit of the ephemeral identity.
    Funding,
    /// Creation of the token type.
    AssetCreation,
    /// Resolution of the ephemeral identity's holding account.
    SourceResolution,
    /// Issuance of the supply into the source holding account.
    Issuance,
    /// Clearing of the issuance authority.
    AuthorityRevocation,
    /// Resolution of the recipient's holding account.
    DestinationResolution,
    /// Transfer of the issued supply to the recipient.
    Transfer,
}

impl OperationStep {
    /// Every step, in workflow order.
    pub const ALL: [OperationStep; 7] = [
        Self::Funding,
        Self::AssetCreation,
        Self::SourceResolution,
        Self::Issuance,
        Self::AuthorityRevocation,
        Self::DestinationResolution,
        Self::Transfer,
    ];

    /// The state a run is in once this step has succeeded.
    pub fn reached(&self) -> WorkflowState {
        match self {
            Self::Funding => WorkflowState::Funded,
            Self::AssetCreation => WorkflowState::AssetCreated,
            Self::SourceResolution => WorkflowState::SourceReady,
            Self::Issuance => WorkflowState::Issued,
            Self::AuthorityRevocation => WorkflowState::AuthorityRevoked,
            Self::DestinationResolution => WorkflowState::DestinationReady,
            Self::Transfer => WorkflowState::Transferred,
        }
    }
}

impl fmt::Display for OperationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Funding => write!(f, "funding"),
            Self::AssetCreation => write!(f, "asset_creation"),
            Self::SourceResolution => write!(f, "source_resolution"),
            Self::Issuance => write!(f, "issuance"),
            Self::AuthorityRevocation => write!(f, "authority_revocation"),
            Self::DestinationResolution => write!(f, "destination_resolution"),
            Self::Transfer => write!(f, "transfer"),
        }
    }
}

// ---------------------------------------------------------------------------
// StepOutcome
// ---------------------------------------------------------------------------

/// Outcome of a single step execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step succeeded.
    Ok,
    /// Step failed with the given error.
    Failed(SdkError),
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Failed(e) => write!(f, "failed({e})"),
        }
    }
}

// ---------------------------------------------------------------------------
// StepRecord
// ---------------------------------------------------------------------------

/// A timestamped record of a step execution.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Which step was executed.
    pub step: OperationStep,
    /// What happened.
    pub outcome: StepOutcome,
    /// When the step finished.
    pub timestamp: Instant,
    /// How long it took.
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// Full record of one workflow run.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Unique identifier.
    pub id: OperationId,
    /// Recipient of the transfer.
    pub recipient: Address,
    /// Current state.
    pub state: WorkflowState,
    /// Ordered list of step records.
    pub steps: Vec<StepRecord>,
    /// When the run started.
    pub created_at: Instant,
    /// When the run reached a terminal state.
    pub completed_at: Option<Instant>,
}

impl Operation {
    /// Create a new run in [`WorkflowState::Init`].
    pub(crate) fn new(recipient: Address) -> Self {
        Self {
            id: OperationId::next(),
            recipient,
            state: WorkflowState::Init,
            steps: Vec::new(),
            created_at: Instant::now(),
            completed_at: None,
        }
    }

    /// Append a step record, advancing the state if the step succeeded.
    pub(crate) fn apply(&mut self, record: StepRecord) {
        if record.outcome == StepOutcome::Ok {
            self.state = record.step.reached();
        }
        self.steps.push(record);
    }

    /// Move to a terminal state.
    pub(crate) fn complete(&mut self, state: WorkflowState) {
        self.state = state;
        self.completed_at = Some(Instant::now());
    }

    /// Steps that succeeded, in order.
    pub fn completed_steps(&self) -> Vec<OperationStep> {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Ok)
            .map(|s| s.step)
            .collect()
    }

    /// Returns `true` if any step failed.
    pub fn has_failures(&self) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(s.outcome, StepOutcome::Failed(_)))
    }
}

// ---------------------------------------------------------------------------
// OperationError
// ---------------------------------------------------------------------------

/// Rich error returned by a failed workflow run.
///
/// Wraps the base [`SdkError`] with the run context: which run failed, at
/// which step, and what had already completed. Effects of completed steps
/// remain on the ledger.
#[derive(Debug, Clone)]
pub struct OperationError {
    /// The tracked operation ID.
    pub operation_id: OperationId,
    /// The base SDK error.
    pub error: SdkError,
    /// The step that failed.
    pub failed_step: OperationStep,
    /// Steps that completed before the failure.
    pub completed_steps: Vec<StepRecord>,
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] mint drop failed at {}: {}",
            self.operation_id, self.failed_step, self.error
        )?;
        if !self.completed_steps.is_empty() {
            let done: Vec<String> = self
                .completed_steps
                .iter()
                .filter(|s| s.outcome == StepOutcome::Ok)
                .map(|s| s.step.to_string())
                .collect();
            write!(f, " (completed: {})", done.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for OperationError {}

impl From<OperationError> for SdkError {
    fn from(e: OperationError) -> Self {
        e.error
    }
}

// ---------------------------------------------------------------------------
// OperationStore trait
// ---------------------------------------------------------------------------

/// Pluggable storage for operation tracking records.
///
/// The SDK calls into this store at run start, after each step, and at
/// completion.
pub trait OperationStore: Send + Sync {
    /// Record a new run (state = Init).
    fn record(&self, op: &Operation);

    /// Retrieve a run by ID.
    fn get(&self, id: OperationId) -> Option<Operation>;

    /// List all runs that have not reached a terminal state.
    fn list_active(&self) -> Vec<Operation>;

    /// Append a step record to an existing run.
    fn update_step(&self, id: OperationId, step: StepRecord);

    /// Mark a run as terminal with the given state.
    fn complete(&self, id: OperationId, state: WorkflowState);
}

// ---------------------------------------------------------------------------
// NoopOperationStore
// ---------------------------------------------------------------------------

/// A no-op store that discards all records.
///
/// Used as the default when no tracking is configured.
pub struct NoopOperationStore;

impl OperationStore for NoopOperationStore {
    #[inline]
    fn record(&self, _op: &Operation) {}
    #[inline]
    fn get(&self, _id: OperationId) -> Option<Operation> {
        None
    }
    #[inline]
    fn list_active(&self) -> Vec<Operation> {
        Vec::new()
    }
    #[inline]
    fn update_step(&self, _id: OperationId, _step: StepRecord) {}
    #[inline]
    fn complete(&self, _id: OperationId, _state: WorkflowState) {}
}

// ---------------------------------------------------------------------------
// InMemoryOperationStore
// ---------------------------------------------------------------------------

/// Thread-safe in-memory operation store.
///
/// Uses `RwLock<HashMap>` for concurrent read access with exclusive writes.
/// Records are lost on process restart.
pub struct InMemoryOperationStore {
    ops: RwLock<HashMap<OperationId, Operation>>,
}

impl InMemoryOperationStore {
    pub fn new() -> Self {
        Self {
            ops: RwLock::new(HashMap::new()),
        }
    }

    /// Every recorded run, in no particular order.
    pub fn list_all(&self) -> Vec<Operation> {
        self.ops.read().unwrap().values().cloned().collect()
    }
}

impl Default for InMemoryOperationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationStore for InMemoryOperationStore {
    fn record(&self, op: &Operation) {
        self.ops.write().unwrap().insert(op.id, op.clone());
    }

    fn get(&self, id: OperationId) -> Option<Operation> {
        self.ops.read().unwrap().get(&id).cloned()
    }

    fn list_active(&self) -> Vec<Operation> {
        self.ops
            .read()
            .unwrap()
            .values()
            .filter(|op| !op.state.is_terminal())
            .cloned()
            .collect()
    }

    fn update_step(&self, id: OperationId, step: StepRecord) {
        if let Some(op) = self.ops.write().unwrap().get_mut(&id) {
            op.apply(step);
        }
    }

    fn complete(&self, id: OperationId, state: WorkflowState) {
        if let Some(op) = self.ops.write().unwrap().get_mut(&id) {
            op.complete(state);
        }
    }
}

// ---------------------------------------------------------------------------
// OperationTracker
// ---------------------------------------------------------------------------

/// Step that failed, paired with its error. Carried out of a running
/// workflow so the tracker can close the run.
pub(crate) type StepFailure = (OperationStep, SdkError);

/// Convenience wrapper around a store reference and a live run.
pub(crate) struct OperationTracker {
    store: Arc<dyn OperationStore>,
    pub op: Operation,
}

impl OperationTracker {
    /// Start tracking a new run.
    pub fn start(store: Arc<dyn OperationStore>, recipient: Address) -> Self {
        let op = Operation::new(recipient);
        store.record(&op);
        Self { store, op }
    }

    /// The operation ID.
    pub fn id(&self) -> OperationId {
        self.op.id
    }

    fn push(&mut self, step: OperationStep, outcome: StepOutcome, duration: Duration) {
        let record = StepRecord {
            step,
            outcome,
            timestamp: Instant::now(),
            duration,
        };
        self.op.apply(record.clone());
        self.store.update_step(self.op.id, record);
    }

    /// Record a successful step.
    pub fn step_ok(&mut self, step: OperationStep, duration: Duration) {
        self.push(step, StepOutcome::Ok, duration);
    }

    /// Record a failed step.
    pub fn step_failed(&mut self, step: OperationStep, error: SdkError, duration: Duration) {
        self.push(step, StepOutcome::Failed(error), duration);
    }

    /// Run `fut` as `step`, timing it and recording the outcome.
    pub async fn run<T>(
        &mut self,
        step: OperationStep,
        fut: impl Future<Output = Result<T, SdkError>>,
    ) -> Result<T, StepFailure> {
        let t = Instant::now();
        match fut.await {
            Ok(value) => {
                self.step_ok(step, t.elapsed());
                Ok(value)
            }
            Err(e) => {
                self.step_failed(step, e, t.elapsed());
                Err((step, e))
            }
        }
    }

    /// Mark the run as transferred and persist.
    pub fn succeed(mut self) {
        self.op.complete(WorkflowState::Transferred);
        self.store.complete(self.op.id, WorkflowState::Transferred);
    }

    /// Mark as failed, returning an [`OperationError`].
    pub fn fail(mut self, failed_step: OperationStep, error: SdkError) -> OperationError {
        self.op.complete(WorkflowState::Failed);
        self.store.complete(self.op.id, WorkflowState::Failed);
        OperationError {
            operation_id: self.op.id,
            error,
            failed_step,
            completed_steps: self
                .op
                .steps
                .into_iter()
                .filter(|s| s.outcome == StepOutcome::Ok)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient() -> Address {
        Address::from_bytes([0x42; 32])
    }

    #[test]
    fn operation_ids_increase() {
        let a = OperationId::next();
        let b = OperationId::next();
        assert_ne!(a, b);
        assert!(b.to_string().starts_with("op-"));
    }

    #[test]
    fn successful_steps_walk_the_state_machine() {
        let mut op = Operation::new(recipient());
        let mut expected = vec![WorkflowState::Init];
        for step in OperationStep::ALL {
            op.apply(StepRecord {
                step,
                outcome: StepOutcome::Ok,
                timestamp: Instant::now(),
                duration: Duration::ZERO,
            });
            expected.push(op.state);
        }
        assert_eq!(
            expected,
            vec![
                WorkflowState::Init,
                WorkflowState::Funded,
                WorkflowState::AssetCreated,
                WorkflowState::SourceReady,
                WorkflowState::Issued,
                WorkflowState::AuthorityRevoked,
                WorkflowState::DestinationReady,
                WorkflowState::Transferred,
            ]
        );
    }

    #[test]
    fn failed_step_does_not_advance_state() {
        let mut op = Operation::new(recipient());
        op.apply(StepRecord {
            step: OperationStep::Funding,
            outcome: StepOutcome::Failed(SdkError::ConnectionFailed),
            timestamp: Instant::now(),
            duration: Duration::ZERO,
        });
        assert_eq!(op.state, WorkflowState::Init);
        assert!(op.has_failures());
    }

    #[tokio::test]
    async fn tracker_records_into_store() {
        let store = Arc::new(InMemoryOperationStore::new());
        let mut tracker = OperationTracker::start(store.clone(), recipient());
        let id = tracker.id();

        let value = tracker
            .run(OperationStep::Funding, async { Ok::<_, SdkError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(store.list_active().len(), 1);

        let failure = tracker
            .run(OperationStep::AssetCreation, async {
                Err::<(), _>(SdkError::ConnectionFailed)
            })
            .await
            .unwrap_err();
        assert_eq!(failure, (OperationStep::AssetCreation, SdkError::ConnectionFailed));

        let err = tracker.fail(failure.0, failure.1);
        assert_eq!(err.completed_steps.len(), 1);
        assert_eq!(err.completed_steps[0].step, OperationStep::Funding);

        let op = store.get(id).unwrap();
        assert_eq!(op.state, WorkflowState::Failed);
        assert_eq!(op.completed_steps(), vec![OperationStep::Funding]);
        assert!(op.completed_at.is_some());
        assert!(store.list_active().is_empty());
    }

    #[test]
    fn error_display_lists_completed_steps() {
        let err = OperationError {
            operation_id: OperationId(9),
            error: SdkError::Unauthorized,
            failed_step: OperationStep::Issuance,
            completed_steps: vec![StepRecord {
                step: OperationStep::Funding,
                outcome: StepOutcome::Ok,
                timestamp: Instant::now(),
                duration: Duration::ZERO,
            }],
        };
        assert_eq!(
            err.to_string(),
            "[op-9] mint drop failed at issuance: signer is not authorized (completed: funding)"
        );
    }

    #[test]
    fn noop_store_keeps_nothing() {
        let store = NoopOperationStore;
        let op = Operation::new(recipient());
        store.record(&op);
        assert!(store.get(op.id).is_none());
    }
}
