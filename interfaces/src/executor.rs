//! The delayed executor: a time-locked relay that performs proposal actions.

use agora_types::{Action, Address, Digest32, OperationId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Roles on the delayed executor. The governor must be the only holder of each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExecutorRole {
    Proposer,
    Executor,
    Canceller,
}

impl ExecutorRole {
    pub const ALL: [ExecutorRole; 3] = [Self::Proposer, Self::Executor, Self::Canceller];
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("{caller} lacks executor role {role:?}")]
    Unauthorized { caller: Address, role: ExecutorRole },

    #[error("operation {0} is already scheduled")]
    AlreadyScheduled(OperationId),

    #[error("operation {0} is not ready")]
    NotReady(OperationId),

    #[error("operation {0} is not pending")]
    NotPending(OperationId),

    #[error("delay {requested}s is below the minimum {minimum}s")]
    InsufficientDelay { requested: u64, minimum: u64 },

    #[error("call to {target} failed: {reason}")]
    CallFailed { target: Address, reason: String },
}

pub trait DelayedExecutor: Send + Sync {
    fn address(&self) -> Address;

    /// Minimum delay in seconds between scheduling and execution.
    fn min_delay(&self) -> u64;

    fn schedule_batch(
        &self,
        caller: &Address,
        actions: &[Action],
        predecessor: &Digest32,
        salt: &Digest32,
        delay: u64,
    ) -> Result<OperationId, ExecutorError>;

    fn execute_batch(
        &self,
        caller: &Address,
        actions: &[Action],
        predecessor: &Digest32,
        salt: &Digest32,
    ) -> Result<(), ExecutorError>;

    fn cancel(&self, caller: &Address, id: &OperationId) -> Result<(), ExecutorError>;

    fn is_operation_pending(&self, id: &OperationId) -> bool;

    fn is_operation_ready(&self, id: &OperationId) -> bool;

    fn is_operation_done(&self, id: &OperationId) -> bool;

    /// Every account currently holding `role`.
    fn role_members(&self, role: ExecutorRole) -> Vec<Address>;
}
