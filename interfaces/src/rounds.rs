//! The external round scheduler.
//!
//! Rounds are fixed-duration voting epochs run by a separate allocation
//! process. The governor anchors every proposal's voting window to one of
//! them and keeps the scheduler's view of escrowed voting power in sync.

use agora_types::{Address, BlockNumber, RoundId, TokenAmount};
use serde::{Deserialize, Serialize};

/// Activity state of a single round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// Scheduled or unknown; snapshot/deadline not fixed yet.
    NotStarted,
    /// Started and accepting allocation votes.
    Active,
    /// Deadline passed.
    Ended,
}

pub trait RoundClock: Send + Sync {
    /// Id of the most recently started round (0 before the first round).
    fn current_round_id(&self) -> RoundId;

    /// Snapshot block of a started round; `None` while it has not started.
    fn round_snapshot(&self, round: RoundId) -> Option<BlockNumber>;

    /// Deadline block of a started round; `None` while it has not started.
    fn round_deadline(&self, round: RoundId) -> Option<BlockNumber>;

    /// Length of a round in blocks.
    fn voting_period(&self) -> u64;

    fn round_state(&self, round: RoundId) -> RoundState;

    /// Raw voting power of `account` as of `block`: token balance plus
    /// active deposit voting power.
    fn get_votes(&self, account: &Address, block: BlockNumber) -> TokenAmount;

    /// The scheduler's own record of `account`'s deposit voting power at `block`.
    fn deposit_voting_power(&self, account: &Address, block: BlockNumber) -> TokenAmount;

    /// Push the governor's new active deposit figure for `account`, effective from `block`.
    fn record_deposit_voting_power(&self, account: &Address, block: BlockNumber, active: TokenAmount);
}
