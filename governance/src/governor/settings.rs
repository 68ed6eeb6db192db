//! Role-gated administration.

use agora_interfaces::RoundState;
use agora_types::{Address, Selector, TokenAmount};
use tracing::info;

use super::Governor;
use crate::access::Role;
use crate::config::{ProposalType, BPS_DENOMINATOR};
use crate::error::GovernanceError;

impl Governor {
    /// Flip quadratic weighting. Applies to the current round if it has
    /// not started yet, otherwise from the next round on; proposals whose
    /// round is already running keep their mode. Returns the new disabled flag.
    pub fn toggle_quadratic_voting(&mut self, caller: &Address) -> Result<bool, GovernanceError> {
        self.state.access.check(Role::SettingsManager, caller)?;
        let current = self.ext.rounds.current_round_id();
        let effective = match self.ext.rounds.round_state(current) {
            RoundState::NotStarted => current,
            RoundState::Active | RoundState::Ended => current + 1,
        };
        let disabled = self.state.tally.toggle_quadratic(effective);
        info!(caller = %caller, effective_round = effective, disabled, "quadratic voting toggled");
        Ok(disabled)
    }

    pub fn set_whitelist_function(
        &mut self,
        caller: &Address,
        target: Address,
        selector: Selector,
        allowed: bool,
    ) -> Result<(), GovernanceError> {
        self.set_whitelist_functions(caller, target, &[selector], allowed)
    }

    pub fn set_whitelist_functions(
        &mut self,
        caller: &Address,
        target: Address,
        selectors: &[Selector],
        allowed: bool,
    ) -> Result<(), GovernanceError> {
        self.state.access.check(Role::SettingsManager, caller)?;
        for selector in selectors {
            self.state.gate.set_whitelisted(target, *selector, allowed);
            info!(contract = %target, selector = %selector, allowed, "function whitelist updated");
        }
        Ok(())
    }

    pub fn set_is_function_restriction_enabled(&mut self, caller: &Address, enabled: bool) -> Result<(), GovernanceError> {
        self.state.access.check(Role::SettingsManager, caller)?;
        self.state.gate.set_restriction_enabled(enabled);
        info!(enabled, "function restriction updated");
        Ok(())
    }

    /// Deposit threshold in basis points of total supply. Affects only
    /// proposals created afterwards.
    pub fn set_deposit_threshold_percentage(
        &mut self,
        caller: &Address,
        proposal_type: ProposalType,
        bps: u32,
    ) -> Result<(), GovernanceError> {
        self.state.access.check(Role::SettingsManager, caller)?;
        if bps > BPS_DENOMINATOR {
            return Err(GovernanceError::InvalidDepositThreshold(bps));
        }
        self.state.types.get_mut(proposal_type).deposit_threshold_bps = bps;
        info!(%proposal_type, bps, "deposit threshold percentage updated");
        Ok(())
    }

    pub fn set_deposit_threshold_cap(
        &mut self,
        caller: &Address,
        proposal_type: ProposalType,
        cap: TokenAmount,
    ) -> Result<(), GovernanceError> {
        self.state.access.check(Role::SettingsManager, caller)?;
        self.state.types.get_mut(proposal_type).deposit_threshold_cap = cap;
        info!(%proposal_type, %cap, "deposit threshold cap updated");
        Ok(())
    }

    pub fn set_voting_threshold(
        &mut self,
        caller: &Address,
        proposal_type: ProposalType,
        threshold: TokenAmount,
    ) -> Result<(), GovernanceError> {
        self.state.access.check(Role::SettingsManager, caller)?;
        self.state.types.get_mut(proposal_type).voting_threshold = threshold;
        info!(%proposal_type, %threshold, "voting threshold updated");
        Ok(())
    }

    pub fn set_min_voting_delay(&mut self, caller: &Address, blocks: u64) -> Result<(), GovernanceError> {
        self.state.access.check(Role::SettingsManager, caller)?;
        self.state.min_voting_delay = blocks;
        info!(blocks, "min voting delay updated");
        Ok(())
    }

    pub fn set_required_proposer_level(
        &mut self,
        caller: &Address,
        proposal_type: ProposalType,
        level: u8,
    ) -> Result<(), GovernanceError> {
        self.state.access.check(Role::SettingsManager, caller)?;
        let max = self.ext.levels.max_level();
        if level > max {
            return Err(GovernanceError::LevelExceedsMax { level, max });
        }
        self.state.types.get_mut(proposal_type).required_proposer_level = level;
        info!(%proposal_type, level, "required proposer level updated");
        Ok(())
    }

    /// New quorum numerator, effective for snapshots from the current block on.
    pub fn update_quorum_numerator(&mut self, caller: &Address, numerator: u128) -> Result<(), GovernanceError> {
        self.state.access.check(Role::SettingsManager, caller)?;
        let block = self.ext.chain.current_block();
        let old = self.state.tally.quorum_numerator();
        self.state.tally.update_quorum_numerator(block, numerator)?;
        info!(old, new = numerator, block, "quorum numerator updated");
        Ok(())
    }

    pub fn grant_role(&mut self, caller: &Address, role: Role, account: Address) -> Result<(), GovernanceError> {
        self.state.access.check(Role::Admin, caller)?;
        if self.state.access.grant(role, account) {
            info!(%role, account = %account, granted_by = %caller, "role granted");
        }
        Ok(())
    }

    pub fn revoke_role(&mut self, caller: &Address, role: Role, account: &Address) -> Result<(), GovernanceError> {
        self.state.access.check(Role::Admin, caller)?;
        if self.state.access.revoke(role, account) {
            info!(%role, account = %account, revoked_by = %caller, "role revoked");
        }
        Ok(())
    }
}
