use agora_types::{Address, ProposalId};
use tracing::info;

use super::Governor;
use crate::error::GovernanceError;
use crate::proposal::ProposalState;
use crate::tally::{weigh, VoteReceipt, VoteType};

impl Governor {
    /// Cast a vote on an active proposal. Returns the weight recorded.
    pub fn cast_vote(&mut self, caller: &Address, id: &ProposalId, support: VoteType) -> Result<u128, GovernanceError> {
        self.record_vote(caller, id, support, None)
    }

    pub fn cast_vote_with_reason(
        &mut self,
        caller: &Address,
        id: &ProposalId,
        support: VoteType,
        reason: impl Into<String>,
    ) -> Result<u128, GovernanceError> {
        self.record_vote(caller, id, support, Some(reason.into()))
    }

    fn record_vote(
        &mut self,
        caller: &Address,
        id: &ProposalId,
        support: VoteType,
        reason: Option<String>,
    ) -> Result<u128, GovernanceError> {
        let state = self.state(id)?;
        if state != ProposalState::Active {
            return Err(GovernanceError::unexpected("Active", state));
        }
        if self.state.tally.has_voted(id, caller) {
            return Err(GovernanceError::AlreadyVoted(*caller));
        }

        let proposal = self.get(id)?;
        let snapshot = self.window(proposal).snapshot;
        let mode = self.mode_of(proposal);
        let threshold = self.state.types.get(proposal.proposal_type).voting_threshold;

        let power = self.ext.rounds.get_votes(caller, snapshot);
        if power.is_zero() || power < threshold {
            return Err(GovernanceError::VotingThresholdNotMet {
                power: power.raw(),
                threshold: threshold.raw(),
            });
        }
        let weight = weigh(power, mode, self.ext.token.decimals());

        self.state.tally.record(
            *id,
            *caller,
            VoteReceipt {
                support,
                weight,
                power,
                reason,
            },
        )?;

        info!(
            proposal = %id,
            voter = %caller,
            support = ?support,
            ?mode,
            %power,
            weight,
            "vote cast"
        );
        Ok(weight)
    }
}
