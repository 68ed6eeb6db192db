//! Proposal creation, cancellation, queueing, execution and development tracking.

use agora_types::{Action, Address, ProposalId, RoundId, Timestamp, TokenAmount};
use tracing::{info, warn};

use super::Governor;
use crate::access::Role;
use crate::config::ProposalType;
use crate::error::GovernanceError;
use crate::gate::NO_PREDECESSOR;
use crate::proposal::{DevelopmentStatus, Proposal, ProposalFlags, ProposalState};

/// Arguments to [`Governor::propose`].
///
/// Targets, values and calldatas are parallel lists, as callers usually
/// hold them; `propose` rejects lists of unequal length.
#[derive(Clone, Debug)]
pub struct NewProposal {
    pub proposal_type: ProposalType,
    pub targets: Vec<Address>,
    pub values: Vec<u128>,
    pub calldatas: Vec<Vec<u8>>,
    pub description: String,
    pub target_round: RoundId,
    pub initial_deposit: TokenAmount,
}

impl NewProposal {
    pub fn new(proposal_type: ProposalType, description: impl Into<String>, target_round: RoundId) -> Self {
        Self {
            proposal_type,
            targets: Vec::new(),
            values: Vec::new(),
            calldatas: Vec::new(),
            description: description.into(),
            target_round,
            initial_deposit: TokenAmount::ZERO,
        }
    }

    pub fn standard(description: impl Into<String>, target_round: RoundId) -> Self {
        Self::new(ProposalType::Standard, description, target_round)
    }

    pub fn grant(description: impl Into<String>, target_round: RoundId) -> Self {
        Self::new(ProposalType::Grant, description, target_round)
    }

    pub fn with_action(mut self, target: Address, value: u128, calldata: Vec<u8>) -> Self {
        self.targets.push(target);
        self.values.push(value);
        self.calldatas.push(calldata);
        self
    }

    pub fn with_deposit(mut self, amount: TokenAmount) -> Self {
        self.initial_deposit = amount;
        self
    }

    fn into_actions(self) -> Result<(Vec<Action>, String, RoundId, TokenAmount, ProposalType), GovernanceError> {
        let (targets, values, calldatas) = (self.targets.len(), self.values.len(), self.calldatas.len());
        if targets != values || targets != calldatas {
            return Err(GovernanceError::InvalidProposalLength {
                targets,
                values,
                calldatas,
            });
        }
        let actions = self
            .targets
            .into_iter()
            .zip(self.values)
            .zip(self.calldatas)
            .map(|((target, value), calldata)| Action::new(target, value, calldata))
            .collect();
        Ok((
            actions,
            self.description,
            self.target_round,
            self.initial_deposit,
            self.proposal_type,
        ))
    }
}

impl Governor {
    /// Create a proposal, optionally staking `initial_deposit` on it in the
    /// same step. Nothing is stored if the initial deposit fails.
    pub fn propose(&mut self, caller: &Address, request: NewProposal) -> Result<ProposalId, GovernanceError> {
        let (actions, description, target_round, initial_deposit, proposal_type) = request.into_actions()?;

        let type_config = *self.state.types.get(proposal_type);
        let level = self.ext.levels.level_of(caller);
        if level < type_config.required_proposer_level {
            return Err(GovernanceError::InsufficientProposerLevel {
                proposer: *caller,
                level,
                required: type_config.required_proposer_level,
            });
        }

        self.state.gate.check_actions(&actions)?;

        let current_block = self.ext.chain.current_block();
        let window = self
            .estimator()
            .validate_target(target_round, current_block, self.state.min_voting_delay)?;

        let description_hash = agora_crypto::hash_description(&description);
        let id = agora_crypto::proposal_id(&actions, &description_hash, caller);
        if self.state.proposals.contains_key(&id) {
            return Err(GovernanceError::AlreadyExists(id));
        }

        let deposit_threshold = type_config.deposit_threshold(self.ext.token.total_supply());
        let action_count = actions.len();
        self.state.proposals.insert(
            id,
            Proposal {
                id,
                proposer: *caller,
                proposal_type,
                actions,
                description,
                description_hash,
                start_round: target_round,
                deposit_threshold,
                created_at: current_block,
                flags: ProposalFlags::default(),
                queued_at: None,
                eta: None,
            },
        );

        if !initial_deposit.is_zero() {
            if let Err(e) = self.deposit(caller, initial_deposit, &id) {
                self.state.proposals.remove(&id);
                warn!(proposal = %id, error = %e, "initial deposit failed, proposal discarded");
                return Err(e);
            }
        }

        info!(
            proposal = %id,
            proposer = %caller,
            proposal_type = %proposal_type,
            target_round,
            estimated_snapshot = window.snapshot,
            deposit_threshold = %deposit_threshold,
            actions = action_count,
            "proposal created"
        );
        Ok(id)
    }

    /// Cancel a proposal. From Pending the proposer or an admin may cancel;
    /// from Active, Succeeded or Queued only an admin. A queued proposal's
    /// executor operation is cancelled too.
    pub fn cancel(&mut self, caller: &Address, id: &ProposalId) -> Result<(), GovernanceError> {
        let state = self.state(id)?;
        let proposer = self.get(id)?.proposer;
        match state {
            ProposalState::Pending => {
                if *caller != proposer && !self.state.access.has_role(Role::Admin, caller) {
                    return Err(GovernanceError::NotProposerOrAdmin);
                }
            }
            ProposalState::Active | ProposalState::Succeeded | ProposalState::Queued => {
                self.state.access.check(Role::Admin, caller)?;
            }
            other => {
                return Err(GovernanceError::unexpected(
                    "Pending, Active, Succeeded or Queued",
                    other,
                ))
            }
        }

        let operation = self.operation_id(id)?;
        self.get_mut(id)?.flags.cancelled = true;
        if state == ProposalState::Queued {
            if let Err(e) = self.ext.executor.cancel(&self.address, &operation) {
                self.get_mut(id)?.flags.cancelled = false;
                warn!(proposal = %id, error = %e, "executor refused cancellation");
                return Err(e.into());
            }
        }

        info!(proposal = %id, caller = %caller, from = ?state, "proposal cancelled");
        Ok(())
    }

    /// Schedule a succeeded proposal on the delayed executor. Returns the
    /// earliest execution time.
    pub fn queue(&mut self, caller: &Address, id: &ProposalId) -> Result<Timestamp, GovernanceError> {
        let state = self.state(id)?;
        if state != ProposalState::Succeeded {
            return Err(GovernanceError::unexpected("Succeeded", state));
        }

        let proposal = self.get(id)?;
        let actions = proposal.actions.clone();
        let salt = agora_crypto::timelock_salt(&proposal.description_hash, &self.address);
        let delay = self.ext.executor.min_delay();
        let now = self.ext.chain.timestamp();
        let eta = now.plus_secs(delay);

        {
            let proposal = self.get_mut(id)?;
            proposal.queued_at = Some(now);
            proposal.eta = Some(eta);
        }
        if let Err(e) = self
            .ext
            .executor
            .schedule_batch(&self.address, &actions, &NO_PREDECESSOR, &salt, delay)
        {
            let proposal = self.get_mut(id)?;
            proposal.queued_at = None;
            proposal.eta = None;
            warn!(proposal = %id, error = %e, "executor refused to schedule");
            return Err(e.into());
        }

        info!(proposal = %id, caller = %caller, eta = eta.as_secs(), "proposal queued");
        Ok(eta)
    }

    /// Execute a queued proposal once the executor's delay has elapsed.
    pub fn execute(&mut self, caller: &Address, id: &ProposalId) -> Result<(), GovernanceError> {
        self.state.access.check(Role::Executor, caller)?;
        let state = self.state(id)?;
        if state != ProposalState::Queued {
            return Err(GovernanceError::unexpected("Queued", state));
        }
        let operation = self.operation_id(id)?;
        if !self.ext.executor.is_operation_ready(&operation) {
            return Err(GovernanceError::ExecutionNotReady(*id));
        }

        let proposal = self.get(id)?;
        let actions = proposal.actions.clone();
        let salt = agora_crypto::timelock_salt(&proposal.description_hash, &self.address);

        self.get_mut(id)?.flags.executed = true;
        if let Err(e) = self
            .ext
            .executor
            .execute_batch(&self.address, &actions, &NO_PREDECESSOR, &salt)
        {
            self.get_mut(id)?.flags.executed = false;
            warn!(proposal = %id, error = %e, "execution failed");
            return Err(e.into());
        }

        info!(proposal = %id, caller = %caller, operation = %operation, "proposal executed");
        Ok(())
    }

    pub fn mark_as_in_development(&mut self, caller: &Address, id: &ProposalId) -> Result<(), GovernanceError> {
        self.set_development(
            caller,
            id,
            &[ProposalState::Executed],
            "Executed",
            DevelopmentStatus::InDevelopment,
        )
    }

    pub fn mark_as_completed(&mut self, caller: &Address, id: &ProposalId) -> Result<(), GovernanceError> {
        self.set_development(
            caller,
            id,
            &[ProposalState::InDevelopment],
            "InDevelopment",
            DevelopmentStatus::Completed,
        )
    }

    /// Clear development tracking; the proposal reads as Executed again.
    pub fn reset_development_state(&mut self, caller: &Address, id: &ProposalId) -> Result<(), GovernanceError> {
        self.set_development(
            caller,
            id,
            &[ProposalState::InDevelopment, ProposalState::Completed],
            "InDevelopment or Completed",
            DevelopmentStatus::None,
        )
    }

    fn set_development(
        &mut self,
        caller: &Address,
        id: &ProposalId,
        allowed: &[ProposalState],
        expected: &'static str,
        next: DevelopmentStatus,
    ) -> Result<(), GovernanceError> {
        self.state.access.check(Role::ProposalStateManager, caller)?;
        if self.get(id)?.proposal_type == ProposalType::Grant {
            return Err(GovernanceError::GrantDevelopmentUnsupported);
        }
        let state = self.state(id)?;
        if !allowed.contains(&state) {
            return Err(GovernanceError::unexpected(expected, state));
        }
        self.get_mut(id)?.flags.development = next;
        info!(proposal = %id, caller = %caller, from = ?state, to = ?next, "development status changed");
        Ok(())
    }
}
