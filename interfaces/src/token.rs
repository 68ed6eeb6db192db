//! The governance token.

use agora_types::{Address, BlockNumber, TokenAmount};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token transfers are paused")]
    Paused,

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, have {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    #[error("balance overflow")]
    Overflow,
}

pub trait GovernanceToken: Send + Sync {
    /// Number of decimals in one whole token.
    fn decimals(&self) -> u8;

    fn balance_of(&self, account: &Address) -> TokenAmount;

    /// Balance of `account` as of the end of `block`.
    fn past_balance_of(&self, account: &Address, block: BlockNumber) -> TokenAmount;

    fn total_supply(&self) -> TokenAmount;

    /// Total supply as of the end of `block`.
    fn past_total_supply(&self, block: BlockNumber) -> TokenAmount;

    fn allowance(&self, owner: &Address, spender: &Address) -> TokenAmount;

    fn approve(&self, owner: &Address, spender: &Address, amount: TokenAmount) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to` on behalf of `from`.
    fn transfer(&self, from: &Address, to: &Address, amount: TokenAmount) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance.
    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), TokenError>;

    fn paused(&self) -> bool;
}
