use agora_interfaces::{ExecutorError, ExecutorRole, TokenError};
use agora_store::StoreError;
use agora_types::{Address, ProposalId, RoundId};
use thiserror::Error;

use crate::access::Role;
use crate::config::ConfigError;
use crate::proposal::ProposalState;

/// Coarse classification of a [`GovernanceError`], for callers that only
/// need to know which kind of rule was broken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authorization,
    State,
    Resource,
    NotFound,
    Storage,
}

#[derive(Debug, Error)]
pub enum GovernanceError {
    // -- validation --
    #[error("proposal length mismatch: {targets} targets, {values} values, {calldatas} calldatas")]
    InvalidProposalLength {
        targets: usize,
        values: usize,
        calldatas: usize,
    },

    #[error("invalid proposal type {0}")]
    InvalidProposalType(u8),

    #[error("round {target} cannot be targeted from round {current}: voting would start at block {snapshot}, current block {block}")]
    InvalidTargetRound {
        target: RoundId,
        current: RoundId,
        snapshot: u64,
        block: u64,
    },

    #[error("deposit amount must be greater than zero")]
    ZeroDeposit,

    #[error("deposit threshold {0} basis points exceeds 10000")]
    InvalidDepositThreshold(u32),

    #[error("quorum numerator {0} exceeds the denominator 100")]
    InvalidQuorumNumerator(u128),

    #[error("level {level} exceeds the oracle maximum {max}")]
    LevelExceedsMax { level: u8, max: u8 },

    #[error("invalid vote type {0}")]
    InvalidVoteType(u8),

    #[error("function {selector} on {target} is not whitelisted")]
    FunctionNotWhitelisted { target: Address, selector: String },

    #[error("calldata for {0} is too short to carry a function selector")]
    MissingSelector(Address),

    #[error("proposal already exists: {0}")]
    AlreadyExists(ProposalId),

    #[error("executor role {role:?} must be held by the governor alone, held by {holders:?}")]
    ExecutorRolesNotExclusive {
        role: ExecutorRole,
        holders: Vec<Address>,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    // -- authorization --
    #[error("{account} is missing role {role:?}")]
    MissingRole { role: Role, account: Address },

    #[error("{proposer} holds level {level}, level {required} is required to propose")]
    InsufficientProposerLevel {
        proposer: Address,
        level: u8,
        required: u8,
    },

    #[error("only the proposer or an admin may cancel a pending proposal")]
    NotProposerOrAdmin,

    // -- state --
    #[error("proposal is {actual:?}, expected {expected}")]
    UnexpectedState {
        expected: &'static str,
        actual: ProposalState,
    },

    #[error("{0} has already voted on this proposal")]
    AlreadyVoted(Address),

    #[error("voting power {power} is below the voting threshold {threshold}")]
    VotingThresholdNotMet { power: u128, threshold: u128 },

    #[error("development tracking is not available for grant proposals")]
    GrantDevelopmentUnsupported,

    #[error("delayed execution of {0} is not ready yet")]
    ExecutionNotReady(ProposalId),

    // -- resource --
    #[error("no deposit to withdraw")]
    NothingToWithdraw,

    #[error("deposit total overflow")]
    DepositOverflow,

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("delayed executor error: {0}")]
    Executor(#[from] ExecutorError),

    // -- lookup --
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    // -- persistence --
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("record encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        use GovernanceError::*;
        match self {
            InvalidProposalLength { .. }
            | InvalidProposalType(_)
            | InvalidTargetRound { .. }
            | ZeroDeposit
            | InvalidDepositThreshold(_)
            | InvalidQuorumNumerator(_)
            | LevelExceedsMax { .. }
            | InvalidVoteType(_)
            | FunctionNotWhitelisted { .. }
            | MissingSelector(_)
            | AlreadyExists(_)
            | ExecutorRolesNotExclusive { .. }
            | Config(_) => ErrorKind::Validation,
            MissingRole { .. } | InsufficientProposerLevel { .. } | NotProposerOrAdmin => {
                ErrorKind::Authorization
            }
            UnexpectedState { .. }
            | AlreadyVoted(_)
            | VotingThresholdNotMet { .. }
            | GrantDevelopmentUnsupported
            | ExecutionNotReady(_) => ErrorKind::State,
            NothingToWithdraw | DepositOverflow | Token(_) | Executor(_) => ErrorKind::Resource,
            ProposalNotFound(_) => ErrorKind::NotFound,
            Store(StoreError::NotFound(_)) => ErrorKind::NotFound,
            Store(_) | Encoding(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn unexpected(expected: &'static str, actual: ProposalState) -> Self {
        Self::UnexpectedState { expected, actual }
    }
}
