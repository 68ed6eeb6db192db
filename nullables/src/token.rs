//! Nullable governance token with per-block balance history.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use agora_interfaces::{ChainClock, GovernanceToken, TokenError};
use agora_types::{Address, BlockNumber, TokenAmount};

use crate::clock::NullChainClock;
use crate::history::History;

#[derive(Default)]
struct Ledger {
    balances: HashMap<Address, History>,
    supply: History,
    allowances: HashMap<(Address, Address), u128>,
    paused: bool,
}

impl Ledger {
    fn balance(&self, account: &Address) -> u128 {
        self.balances.get(account).map(History::latest).unwrap_or(0)
    }

    fn move_balance(
        &mut self,
        block: BlockNumber,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        let available = self.balance(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance { needed: amount, available });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.balances.entry(*from).or_default().set(block, available - amount);
        self.balances.entry(*to).or_default().set(block, credited);
        Ok(())
    }
}

/// An in-memory checkpointed token. History is keyed by the shared chain clock.
pub struct NullToken {
    clock: Arc<NullChainClock>,
    decimals: u8,
    ledger: Mutex<Ledger>,
}

impl NullToken {
    pub fn new(clock: Arc<NullChainClock>, decimals: u8) -> Self {
        Self {
            clock,
            decimals,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Create `amount` for `account`, growing the total supply.
    pub fn mint(&self, account: &Address, amount: TokenAmount) {
        let block = self.clock.current_block();
        let mut ledger = self.ledger.lock().unwrap();
        let balance = ledger.balance(account) + amount.raw();
        ledger.balances.entry(*account).or_default().set(block, balance);
        let supply = ledger.supply.latest() + amount.raw();
        ledger.supply.set(block, supply);
    }

    pub fn set_paused(&self, paused: bool) {
        self.ledger.lock().unwrap().paused = paused;
    }
}

impl GovernanceToken for NullToken {
    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn balance_of(&self, account: &Address) -> TokenAmount {
        TokenAmount::new(self.ledger.lock().unwrap().balance(account))
    }

    fn past_balance_of(&self, account: &Address, block: BlockNumber) -> TokenAmount {
        let ledger = self.ledger.lock().unwrap();
        TokenAmount::new(ledger.balances.get(account).map(|h| h.at(block)).unwrap_or(0))
    }

    fn total_supply(&self) -> TokenAmount {
        TokenAmount::new(self.ledger.lock().unwrap().supply.latest())
    }

    fn past_total_supply(&self, block: BlockNumber) -> TokenAmount {
        TokenAmount::new(self.ledger.lock().unwrap().supply.at(block))
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> TokenAmount {
        let ledger = self.ledger.lock().unwrap();
        TokenAmount::new(ledger.allowances.get(&(*owner, *spender)).copied().unwrap_or(0))
    }

    fn approve(&self, owner: &Address, spender: &Address, amount: TokenAmount) -> Result<(), TokenError> {
        self.ledger
            .lock()
            .unwrap()
            .allowances
            .insert((*owner, *spender), amount.raw());
        Ok(())
    }

    fn transfer(&self, from: &Address, to: &Address, amount: TokenAmount) -> Result<(), TokenError> {
        let block = self.clock.current_block();
        let mut ledger = self.ledger.lock().unwrap();
        if ledger.paused {
            return Err(TokenError::Paused);
        }
        ledger.move_balance(block, from, to, amount.raw())
    }

    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), TokenError> {
        let block = self.clock.current_block();
        let mut ledger = self.ledger.lock().unwrap();
        if ledger.paused {
            return Err(TokenError::Paused);
        }
        let allowed = ledger.allowances.get(&(*from, *spender)).copied().unwrap_or(0);
        if allowed < amount.raw() {
            return Err(TokenError::InsufficientAllowance {
                needed: amount.raw(),
                available: allowed,
            });
        }
        ledger.move_balance(block, from, to, amount.raw())?;
        ledger.allowances.insert((*from, *spender), allowed - amount.raw());
        Ok(())
    }

    fn paused(&self) -> bool {
        self.ledger.lock().unwrap().paused
    }
}
