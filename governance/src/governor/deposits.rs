//! Deposit and withdrawal of proposal stake.
//!
//! The escrow ledger is updated before the token moves, and rolled back if
//! the transfer fails. After a successful transfer the account's new active
//! figure is pushed to the round clock so both sides agree on deposit
//! voting power at every block.

use agora_types::{Address, ProposalId, TokenAmount};
use tracing::{info, warn};

use super::Governor;
use crate::error::GovernanceError;
use crate::escrow::EscrowChange;
use crate::proposal::ProposalState;

impl Governor {
    /// Stake `amount` on a pending proposal. The caller must have approved
    /// the governor for at least `amount`.
    pub fn deposit(&mut self, caller: &Address, amount: TokenAmount, id: &ProposalId) -> Result<(), GovernanceError> {
        if amount.is_zero() {
            return Err(GovernanceError::ZeroDeposit);
        }
        let state = self.state(id)?;
        if state != ProposalState::Pending {
            return Err(GovernanceError::unexpected("Pending", state));
        }
        let threshold = self.get(id)?.deposit_threshold;
        let block = self.ext.chain.current_block();

        let change = self
            .state
            .escrow
            .credit(*id, *caller, amount, threshold, block)?;
        if let Err(e) = self
            .ext
            .token
            .transfer_from(&self.address, caller, &self.address, amount)
        {
            self.state.escrow.revert(change);
            warn!(proposal = %id, depositor = %caller, %amount, error = %e, "deposit transfer failed");
            return Err(e.into());
        }
        self.sync_deposit_power(&change);

        info!(
            proposal = %id,
            depositor = %caller,
            %amount,
            total = %self.state.escrow.total(id),
            reached = self.state.escrow.is_reached(id),
            "deposit received"
        );
        Ok(())
    }

    /// Return the caller's whole stake on a proposal that has left Pending.
    /// Returns the amount sent to `recipient`.
    pub fn withdraw(
        &mut self,
        caller: &Address,
        id: &ProposalId,
        recipient: &Address,
    ) -> Result<TokenAmount, GovernanceError> {
        let state = self.state(id)?;
        if state == ProposalState::Pending {
            return Err(GovernanceError::unexpected("any state but Pending", state));
        }
        if self.state.escrow.user_deposit(id, caller).is_zero() {
            return Err(GovernanceError::NothingToWithdraw);
        }
        if self.ext.token.paused() {
            return Err(GovernanceError::Token(agora_interfaces::TokenError::Paused));
        }
        let block = self.ext.chain.current_block();

        let change = self.state.escrow.debit_all(*id, *caller, block)?;
        if let Err(e) = self.ext.token.transfer(&self.address, recipient, change.amount) {
            self.state.escrow.revert(change);
            warn!(proposal = %id, depositor = %caller, error = %e, "withdrawal transfer failed");
            return Err(e.into());
        }
        self.sync_deposit_power(&change);

        info!(
            proposal = %id,
            depositor = %caller,
            recipient = %recipient,
            amount = %change.amount,
            "deposit withdrawn"
        );
        Ok(change.amount)
    }

    fn sync_deposit_power(&self, change: &EscrowChange) {
        self.ext.rounds.record_deposit_voting_power(
            &change.account,
            self.ext.chain.current_block(),
            change.active_after,
        );
    }
}
