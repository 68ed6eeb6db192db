//! Proposals and their derived lifecycle state.
//!
//! Nothing here stores a state enum. [`derive_state`] computes it on every
//! read from a handful of flags, the clock and the tally, so a transition can
//! never drift from the facts it depends on.

use agora_types::{Action, Address, BlockNumber, Digest32, ProposalId, RoundId, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::config::ProposalType;

/// Public lifecycle state of a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    /// Waiting for the target round's snapshot. Deposits are accepted.
    Pending,
    /// Deposit threshold met; votes are accepted until the deadline.
    Active,
    /// Withdrawn by the proposer or an administrator. Overrides every
    /// other state.
    Cancelled,
    /// Deadline passed without quorum, or against >= for.
    Defeated,
    /// Deadline passed with quorum and for > against. Ready to queue.
    Succeeded,
    /// Scheduled on the delayed executor.
    Queued,
    /// Operation ran on the delayed executor.
    Executed,
    /// Snapshot reached before the deposit threshold. Final for this round.
    DepositNotMet,
    /// Executed standard proposal whose work has started.
    InDevelopment,
    /// Executed standard proposal whose work is done.
    Completed,
}

/// Post-execution tracking for standard proposals.
///
/// One enum rather than two flags: a proposal is never both in development
/// and completed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevelopmentStatus {
    #[default]
    None,
    InDevelopment,
    Completed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalFlags {
    pub cancelled: bool,
    pub executed: bool,
    pub development: DevelopmentStatus,
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: Address,
    pub proposal_type: ProposalType,
    /// Calls to make on execution, in order.
    pub actions: Vec<Action>,
    pub description: String,
    pub description_hash: Digest32,
    /// Round whose snapshot opens voting.
    pub start_round: RoundId,
    /// Frozen at creation; later setting changes do not move it.
    pub deposit_threshold: TokenAmount,
    pub created_at: BlockNumber,
    pub flags: ProposalFlags,
    /// When the proposal was handed to the delayed executor.
    pub queued_at: Option<Timestamp>,
    /// Earliest execution time reported at queue time.
    pub eta: Option<Timestamp>,
}

impl Proposal {
    pub fn targets(&self) -> Vec<Address> {
        self.actions.iter().map(|a| a.target).collect()
    }

    pub fn values(&self) -> Vec<u128> {
        self.actions.iter().map(|a| a.value).collect()
    }

    pub fn calldatas(&self) -> Vec<Vec<u8>> {
        self.actions.iter().map(|a| a.calldata.clone()).collect()
    }
}

/// Everything [`derive_state`] looks at.
#[derive(Clone, Copy, Debug)]
pub struct StateInputs {
    pub flags: ProposalFlags,
    pub queued: bool,
    pub current_block: BlockNumber,
    pub snapshot: BlockNumber,
    pub deadline: BlockNumber,
    pub deposit_reached: bool,
    /// Only consulted once the deadline has passed.
    pub quorum_reached: bool,
    /// For strictly greater than against. Only consulted after the deadline.
    pub vote_succeeded: bool,
}

/// Resolve the public state from proposal facts. Priority, highest first:
/// cancelled, completed, in development, executed, queued, then the voting
/// window.
pub fn derive_state(inputs: &StateInputs) -> ProposalState {
    let flags = &inputs.flags;
    if flags.cancelled {
        return ProposalState::Cancelled;
    }
    match flags.development {
        DevelopmentStatus::Completed => return ProposalState::Completed,
        DevelopmentStatus::InDevelopment => return ProposalState::InDevelopment,
        DevelopmentStatus::None => {}
    }
    if flags.executed {
        return ProposalState::Executed;
    }
    if inputs.queued {
        return ProposalState::Queued;
    }
    if inputs.current_block <= inputs.snapshot {
        return ProposalState::Pending;
    }
    if inputs.current_block <= inputs.deadline {
        return if inputs.deposit_reached {
            ProposalState::Active
        } else {
            ProposalState::DepositNotMet
        };
    }
    if !inputs.deposit_reached {
        return ProposalState::DepositNotMet;
    }
    if inputs.quorum_reached && inputs.vote_succeeded {
        ProposalState::Succeeded
    } else {
        ProposalState::Defeated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(block: BlockNumber) -> StateInputs {
        StateInputs {
            flags: ProposalFlags::default(),
            queued: false,
            current_block: block,
            snapshot: 100,
            deadline: 110,
            deposit_reached: true,
            quorum_reached: true,
            vote_succeeded: true,
        }
    }

    #[test]
    fn voting_window_boundaries() {
        assert_eq!(derive_state(&inputs(99)), ProposalState::Pending);
        assert_eq!(derive_state(&inputs(100)), ProposalState::Pending);
        assert_eq!(derive_state(&inputs(101)), ProposalState::Active);
        assert_eq!(derive_state(&inputs(110)), ProposalState::Active);
        assert_eq!(derive_state(&inputs(111)), ProposalState::Succeeded);
    }

    #[test]
    fn deposit_not_met_survives_deadline() {
        let mut i = inputs(105);
        i.deposit_reached = false;
        assert_eq!(derive_state(&i), ProposalState::DepositNotMet);
        i.current_block = 500;
        assert_eq!(derive_state(&i), ProposalState::DepositNotMet);
    }

    #[test]
    fn outcome_needs_quorum_and_majority() {
        let mut i = inputs(200);
        i.quorum_reached = false;
        assert_eq!(derive_state(&i), ProposalState::Defeated);
        i.quorum_reached = true;
        i.vote_succeeded = false;
        assert_eq!(derive_state(&i), ProposalState::Defeated);
    }

    #[test]
    fn flags_take_priority() {
        let mut i = inputs(200);
        i.queued = true;
        assert_eq!(derive_state(&i), ProposalState::Queued);
        i.flags.executed = true;
        assert_eq!(derive_state(&i), ProposalState::Executed);
        i.flags.development = DevelopmentStatus::InDevelopment;
        assert_eq!(derive_state(&i), ProposalState::InDevelopment);
        i.flags.development = DevelopmentStatus::Completed;
        assert_eq!(derive_state(&i), ProposalState::Completed);
        i.flags.cancelled = true;
        assert_eq!(derive_state(&i), ProposalState::Cancelled);
    }

    #[test]
    fn cancelled_state_matches_flag_spelling() {
        assert_eq!(format!("{:?}", ProposalState::Cancelled), "Cancelled");
    }

    #[test]
    fn cancelled_pending_proposal() {
        let mut i = inputs(50);
        i.flags.cancelled = true;
        assert_eq!(derive_state(&i), ProposalState::Cancelled);
    }
}
