//! Membership-level oracle used for proposer eligibility.

use agora_types::Address;

pub trait LevelOracle: Send + Sync {
    /// Membership level currently held by `account` (0 = none).
    fn level_of(&self, account: &Address) -> u8;

    /// Highest level the oracle can ever report.
    fn max_level(&self) -> u8;
}
