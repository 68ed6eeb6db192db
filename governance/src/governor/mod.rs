//! The governor: one shared state struct, operated on by the services in
//! the sibling modules.
//!
//! Every mutating operation takes `&mut self` and is all-or-nothing:
//! validation first, ledger writes next, calls out to the token or the
//! delayed executor last, with an explicit undo if such a call fails.

mod deposits;
mod lifecycle;
mod settings;
mod voting;

use std::collections::BTreeMap;
use std::sync::Arc;

use agora_interfaces::{ChainClock, DelayedExecutor, GovernanceToken, LevelOracle, RoundClock};
use agora_types::{Address, BlockNumber, OperationId, ProposalId, RoundId, Selector, TokenAmount};
use tracing::info;

use crate::access::{AccessControl, Role};
use crate::config::{GovernorConfig, ProposalType, ProposalTypeConfig, TypeConfigs};
use crate::error::GovernanceError;
use crate::escrow::DepositEscrow;
use crate::gate::{verify_executor_roles, ExecutionGate};
use crate::proposal::{derive_state, Proposal, ProposalState, StateInputs};
use crate::snapshot::{SnapshotEstimator, VotingWindow};
use crate::tally::{quadratic_weight, ProposalVotes, VoteReceipt, VoteTally, WeightingMode, QUORUM_DENOMINATOR};

pub use lifecycle::NewProposal;

/// Handles to every external system the governor talks to.
#[derive(Clone)]
pub struct Externals {
    pub chain: Arc<dyn ChainClock>,
    pub rounds: Arc<dyn RoundClock>,
    pub token: Arc<dyn GovernanceToken>,
    pub levels: Arc<dyn LevelOracle>,
    pub executor: Arc<dyn DelayedExecutor>,
}

/// All governor-owned data. Persisted as a unit by [`Governor::persist`].
#[derive(Clone, Debug)]
pub(crate) struct GovernorState {
    pub(crate) proposals: BTreeMap<ProposalId, Proposal>,
    pub(crate) escrow: DepositEscrow,
    pub(crate) tally: VoteTally,
    pub(crate) gate: ExecutionGate,
    pub(crate) types: TypeConfigs,
    pub(crate) min_voting_delay: u64,
    pub(crate) access: AccessControl,
}

pub struct Governor {
    pub(crate) address: Address,
    pub(crate) ext: Externals,
    pub(crate) state: GovernorState,
}

impl Governor {
    /// Build a fresh governor from configuration.
    ///
    /// Fails if the configuration is invalid or the delayed executor's roles
    /// are not held by this governor alone.
    pub fn new(config: &GovernorConfig, ext: Externals) -> Result<Self, GovernanceError> {
        config.validate()?;
        let types = config.proposal_types;
        for proposal_type in ProposalType::ALL {
            let level = types.get(proposal_type).required_proposer_level;
            let max = ext.levels.max_level();
            if level > max {
                return Err(GovernanceError::LevelExceedsMax { level, max });
            }
        }

        let mut access = AccessControl::new();
        let roles = &config.roles;
        for (role, holders) in [
            (Role::Admin, &roles.admins),
            (Role::SettingsManager, &roles.settings_managers),
            (Role::ProposalStateManager, &roles.proposal_state_managers),
            (Role::Executor, &roles.executors),
        ] {
            for holder in holders {
                access.grant(role, *holder);
            }
        }

        let state = GovernorState {
            proposals: BTreeMap::new(),
            escrow: DepositEscrow::new(),
            tally: VoteTally::new(
                config.quorum_numerator as u128,
                config.quadratic_voting_disabled,
                ext.chain.current_block(),
            ),
            gate: ExecutionGate::new(config.function_restriction_enabled),
            types,
            min_voting_delay: config.min_voting_delay,
            access,
        };
        let governor = Self::from_state(config.governor_address, ext, state)?;
        info!(
            address = %governor.address,
            executor = %governor.ext.executor.address(),
            quorum_numerator = config.quorum_numerator,
            "governor initialized"
        );
        Ok(governor)
    }

    pub(crate) fn from_state(address: Address, ext: Externals, state: GovernorState) -> Result<Self, GovernanceError> {
        verify_executor_roles(ext.executor.as_ref(), &address)?;
        Ok(Self { address, ext, state })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    // ── Internal helpers ───────────────────────────────────────────────

    fn get(&self, id: &ProposalId) -> Result<&Proposal, GovernanceError> {
        self.state
            .proposals
            .get(id)
            .ok_or(GovernanceError::ProposalNotFound(*id))
    }

    fn get_mut(&mut self, id: &ProposalId) -> Result<&mut Proposal, GovernanceError> {
        self.state
            .proposals
            .get_mut(id)
            .ok_or(GovernanceError::ProposalNotFound(*id))
    }

    fn estimator(&self) -> SnapshotEstimator<'_> {
        SnapshotEstimator::new(self.ext.rounds.as_ref())
    }

    fn window(&self, proposal: &Proposal) -> VotingWindow {
        self.estimator()
            .window(proposal.start_round, self.ext.chain.current_block())
    }

    fn mode_of(&self, proposal: &Proposal) -> WeightingMode {
        self.state.tally.mode_for_round(proposal.start_round)
    }

    /// A zero threshold is met before any deposit arrives.
    fn deposit_reached(&self, proposal: &Proposal) -> bool {
        proposal.deposit_threshold.is_zero() || self.state.escrow.is_reached(&proposal.id)
    }

    fn state_of(&self, proposal: &Proposal) -> ProposalState {
        let window = self.window(proposal);
        let current_block = self.ext.chain.current_block();
        let (quorum_reached, vote_succeeded) = if current_block > window.deadline {
            (
                self.state
                    .tally
                    .quorum_reached(&proposal.id, self.quorum(window.snapshot)),
                self.state.tally.vote_succeeded(&proposal.id),
            )
        } else {
            (false, false)
        };
        derive_state(&StateInputs {
            flags: proposal.flags,
            queued: proposal.queued_at.is_some(),
            current_block,
            snapshot: window.snapshot,
            deadline: window.deadline,
            deposit_reached: self.deposit_reached(proposal),
            quorum_reached,
            vote_succeeded,
        })
    }

    // ── Reads ──────────────────────────────────────────────────────────

    /// Current lifecycle state, derived fresh on every call.
    pub fn state(&self, id: &ProposalId) -> Result<ProposalState, GovernanceError> {
        Ok(self.state_of(self.get(id)?))
    }

    pub fn proposal(&self, id: &ProposalId) -> Result<&Proposal, GovernanceError> {
        self.get(id)
    }

    /// All proposals, ordered by id.
    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.state.proposals.values()
    }

    pub fn proposal_snapshot(&self, id: &ProposalId) -> Result<BlockNumber, GovernanceError> {
        Ok(self.window(self.get(id)?).snapshot)
    }

    pub fn proposal_deadline(&self, id: &ProposalId) -> Result<BlockNumber, GovernanceError> {
        Ok(self.window(self.get(id)?).deadline)
    }

    pub fn proposal_votes(&self, id: &ProposalId) -> Result<ProposalVotes, GovernanceError> {
        self.get(id)?;
        Ok(self.state.tally.proposal_votes(id))
    }

    pub fn proposal_deposit_threshold(&self, id: &ProposalId) -> Result<TokenAmount, GovernanceError> {
        Ok(self.get(id)?.deposit_threshold)
    }

    pub fn proposal_deposit_reached(&self, id: &ProposalId) -> Result<bool, GovernanceError> {
        Ok(self.deposit_reached(self.get(id)?))
    }

    pub fn get_proposal_deposits(&self, id: &ProposalId) -> Result<TokenAmount, GovernanceError> {
        self.get(id)?;
        Ok(self.state.escrow.total(id))
    }

    pub fn get_user_deposit(&self, id: &ProposalId, account: &Address) -> Result<TokenAmount, GovernanceError> {
        self.get(id)?;
        Ok(self.state.escrow.user_deposit(id, account))
    }

    /// `past_total_supply(block) * numerator(block) / 100`.
    pub fn quorum(&self, block: BlockNumber) -> TokenAmount {
        self.ext
            .token
            .past_total_supply(block)
            .mul_div(self.state.tally.quorum_numerator_at(block), QUORUM_DENOMINATOR)
    }

    pub fn quorum_numerator(&self) -> u128 {
        self.state.tally.quorum_numerator()
    }

    pub fn quorum_numerator_at(&self, block: BlockNumber) -> u128 {
        self.state.tally.quorum_numerator_at(block)
    }

    pub fn quorum_reached(&self, id: &ProposalId) -> Result<bool, GovernanceError> {
        let proposal = self.get(id)?;
        let snapshot = self.window(proposal).snapshot;
        Ok(self
            .state
            .tally
            .quorum_reached(id, self.quorum(snapshot)))
    }

    /// Raw voting power cast on `id` so far.
    pub fn proposal_turnout(&self, id: &ProposalId) -> Result<TokenAmount, GovernanceError> {
        self.get(id)?;
        Ok(self.state.tally.turnout(id))
    }

    pub fn has_voted(&self, id: &ProposalId, account: &Address) -> Result<bool, GovernanceError> {
        self.get(id)?;
        Ok(self.state.tally.has_voted(id, account))
    }

    pub fn receipt(&self, id: &ProposalId, account: &Address) -> Result<Option<&VoteReceipt>, GovernanceError> {
        self.get(id)?;
        Ok(self.state.tally.receipt(id, account))
    }

    /// Raw voting power: token balance plus active deposits, per the round clock.
    pub fn get_votes(&self, account: &Address, block: BlockNumber) -> TokenAmount {
        self.ext.rounds.get_votes(account, block)
    }

    /// Quadratic weight a vote by `account` measured at `block` would carry.
    pub fn get_quadratic_voting_power(&self, account: &Address, block: BlockNumber) -> u128 {
        quadratic_weight(self.get_votes(account, block), self.ext.token.decimals())
    }

    pub fn deposit_voting_power(&self, account: &Address, block: BlockNumber) -> TokenAmount {
        self.state.escrow.deposit_voting_power(account, block)
    }

    pub fn is_quadratic_voting_disabled_for_round(&self, round: RoundId) -> bool {
        self.state.tally.is_quadratic_disabled_for_round(round)
    }

    pub fn is_quadratic_voting_disabled(&self) -> bool {
        self.state.tally.is_quadratic_disabled()
    }

    pub fn is_function_whitelisted(&self, target: &Address, selector: &Selector) -> bool {
        self.state.gate.is_whitelisted(target, selector)
    }

    pub fn is_function_restriction_enabled(&self) -> bool {
        self.state.gate.is_restriction_enabled()
    }

    pub fn min_voting_delay(&self) -> u64 {
        self.state.min_voting_delay
    }

    pub fn proposal_type_config(&self, proposal_type: ProposalType) -> ProposalTypeConfig {
        *self.state.types.get(proposal_type)
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.state.access.has_role(role, account)
    }

    /// Id of the proposal's batch on the delayed executor.
    pub fn operation_id(&self, id: &ProposalId) -> Result<OperationId, GovernanceError> {
        let proposal = self.get(id)?;
        Ok(ExecutionGate::operation_id(
            &proposal.actions,
            &proposal.description_hash,
            &self.address,
        ))
    }
}
