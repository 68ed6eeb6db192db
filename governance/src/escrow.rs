//! Multi-party deposit escrow.
//!
//! Tracks who staked how much on which proposal, the per-proposal totals,
//! whether each proposal's threshold was reached, and a per-account history
//! of active (deposited and not yet withdrawn) stake used as voting power.
//! The history is mirrored into the round clock by the governor.
//!
//! Every mutation returns an [`EscrowChange`] that can be handed back to
//! [`DepositEscrow::revert`] if the token transfer that follows it fails.

use std::collections::{BTreeMap, BTreeSet};

use agora_types::{Address, BlockNumber, ProposalId, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::checkpoint::{Checkpoints, PushUndo};
use crate::error::GovernanceError;

/// A ledger mutation, with enough context to roll it back.
#[derive(Clone, Copy, Debug)]
#[must_use]
pub struct EscrowChange {
    pub proposal: ProposalId,
    pub account: Address,
    /// Amount moved into (deposit) or out of (withdraw) escrow.
    pub amount: TokenAmount,
    /// The account's active deposit figure after the change.
    pub active_after: TokenAmount,
    previous_entry: Option<TokenAmount>,
    was_reached: bool,
    power_undo: PushUndo,
}

/// Account-level state that is not derivable from the per-proposal ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowSnapshot {
    pub reached: Vec<ProposalId>,
    pub power: BTreeMap<Address, Checkpoints>,
}

#[derive(Clone, Debug, Default)]
pub struct DepositEscrow {
    ledger: BTreeMap<(ProposalId, Address), TokenAmount>,
    totals: BTreeMap<ProposalId, TokenAmount>,
    reached: BTreeSet<ProposalId>,
    power: BTreeMap<Address, Checkpoints>,
}

impl DepositEscrow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_deposit(&self, proposal: &ProposalId, account: &Address) -> TokenAmount {
        self.ledger
            .get(&(*proposal, *account))
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }

    pub fn total(&self, proposal: &ProposalId) -> TokenAmount {
        self.totals.get(proposal).copied().unwrap_or(TokenAmount::ZERO)
    }

    pub fn is_reached(&self, proposal: &ProposalId) -> bool {
        self.reached.contains(proposal)
    }

    /// Active stake of `account` across all proposals, right now.
    pub fn active_deposits(&self, account: &Address) -> TokenAmount {
        TokenAmount::new(self.power.get(account).map(Checkpoints::latest).unwrap_or(0))
    }

    /// Active stake of `account` at the end of `block`.
    pub fn deposit_voting_power(&self, account: &Address, block: BlockNumber) -> TokenAmount {
        TokenAmount::new(
            self.power
                .get(account)
                .map(|cps| cps.upper_lookup(block))
                .unwrap_or(0),
        )
    }

    /// Add `amount` to `account`'s stake on `proposal`, then recompute the
    /// reached flag against `threshold`.
    pub fn credit(
        &mut self,
        proposal: ProposalId,
        account: Address,
        amount: TokenAmount,
        threshold: TokenAmount,
        block: BlockNumber,
    ) -> Result<EscrowChange, GovernanceError> {
        let previous_entry = self.ledger.get(&(proposal, account)).copied();
        let entry = previous_entry
            .unwrap_or(TokenAmount::ZERO)
            .checked_add(amount)
            .ok_or(GovernanceError::DepositOverflow)?;
        let total = self
            .total(&proposal)
            .checked_add(amount)
            .ok_or(GovernanceError::DepositOverflow)?;
        let active_after = self
            .active_deposits(&account)
            .checked_add(amount)
            .ok_or(GovernanceError::DepositOverflow)?;

        let was_reached = self.is_reached(&proposal);
        self.ledger.insert((proposal, account), entry);
        self.totals.insert(proposal, total);
        if total >= threshold {
            self.reached.insert(proposal);
        } else {
            self.reached.remove(&proposal);
        }
        let power_undo = self
            .power
            .entry(account)
            .or_default()
            .push(block, active_after.raw());

        Ok(EscrowChange {
            proposal,
            account,
            amount,
            active_after,
            previous_entry,
            was_reached,
            power_undo,
        })
    }

    /// Zero `account`'s stake on `proposal`. The entry stays in the ledger.
    pub fn debit_all(
        &mut self,
        proposal: ProposalId,
        account: Address,
        block: BlockNumber,
    ) -> Result<EscrowChange, GovernanceError> {
        let previous_entry = self.ledger.get(&(proposal, account)).copied();
        let amount = previous_entry.unwrap_or(TokenAmount::ZERO);
        if amount.is_zero() {
            return Err(GovernanceError::NothingToWithdraw);
        }
        let active_after = self.active_deposits(&account).saturating_sub(amount);

        self.ledger.insert((proposal, account), TokenAmount::ZERO);
        let total = self.total(&proposal).saturating_sub(amount);
        self.totals.insert(proposal, total);
        let power_undo = self
            .power
            .entry(account)
            .or_default()
            .push(block, active_after.raw());

        Ok(EscrowChange {
            proposal,
            account,
            amount,
            active_after,
            previous_entry,
            was_reached: self.is_reached(&proposal),
            power_undo,
        })
    }

    /// Undo the most recent change. Changes must be reverted newest first.
    pub fn revert(&mut self, change: EscrowChange) {
        let key = (change.proposal, change.account);
        let current = self.ledger.get(&key).copied().unwrap_or(TokenAmount::ZERO);
        let previous = change.previous_entry.unwrap_or(TokenAmount::ZERO);
        let total = self.total(&change.proposal);
        let restored_total = if previous >= current {
            total.saturating_add(previous - current)
        } else {
            total.saturating_sub(current - previous)
        };

        match change.previous_entry {
            Some(entry) => self.ledger.insert(key, entry),
            None => self.ledger.remove(&key),
        };
        if restored_total.is_zero() && !self.ledger.keys().any(|(p, _)| *p == change.proposal) {
            self.totals.remove(&change.proposal);
        } else {
            self.totals.insert(change.proposal, restored_total);
        }
        if change.was_reached {
            self.reached.insert(change.proposal);
        } else {
            self.reached.remove(&change.proposal);
        }
        if let Some(cps) = self.power.get_mut(&change.account) {
            cps.undo(change.power_undo);
            if cps.is_empty() {
                self.power.remove(&change.account);
            }
        }
    }

    /// Every `(proposal, account, amount)` entry, zeroed ones included.
    pub fn entries(&self) -> impl Iterator<Item = (ProposalId, Address, TokenAmount)> + '_ {
        self.ledger.iter().map(|(&(p, a), &amount)| (p, a, amount))
    }

    /// Every entry on one proposal.
    pub fn deposits_for(&self, proposal: &ProposalId) -> Vec<(Address, TokenAmount)> {
        self.ledger
            .iter()
            .filter(|((p, _), _)| p == proposal)
            .map(|(&(_, a), &amount)| (a, amount))
            .collect()
    }

    pub fn snapshot(&self) -> EscrowSnapshot {
        EscrowSnapshot {
            reached: self.reached.iter().copied().collect(),
            power: self.power.clone(),
        }
    }

    /// Rebuild from stored ledger entries; totals are recomputed from them.
    pub fn restore(
        entries: impl IntoIterator<Item = (ProposalId, Address, TokenAmount)>,
        snapshot: EscrowSnapshot,
    ) -> Result<Self, GovernanceError> {
        let mut escrow = Self {
            reached: snapshot.reached.into_iter().collect(),
            power: snapshot.power,
            ..Self::default()
        };
        for (proposal, account, amount) in entries {
            let total = escrow
                .total(&proposal)
                .checked_add(amount)
                .ok_or(GovernanceError::DepositOverflow)?;
            escrow.totals.insert(proposal, total);
            escrow.ledger.insert((proposal, account), amount);
        }
        Ok(escrow)
    }
}
