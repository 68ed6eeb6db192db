//! Nullable round scheduler.
//!
//! Rounds start only when a test calls [`NullRoundClock::start_new_round`];
//! each one snapshots at the current block and ends `voting_period` blocks
//! later. Voting power is the token's past balance plus the deposit power
//! the governor pushes in.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use agora_interfaces::{ChainClock, GovernanceToken, RoundClock, RoundState};
use agora_types::{Address, BlockNumber, RoundId, TokenAmount};

use crate::clock::NullChainClock;
use crate::history::History;
use crate::token::NullToken;

#[derive(Default)]
struct Schedule {
    /// `(snapshot, deadline)` of every started round; index 0 is round 1.
    rounds: Vec<(BlockNumber, BlockNumber)>,
    deposit_power: HashMap<Address, History>,
}

pub struct NullRoundClock {
    clock: Arc<NullChainClock>,
    token: Arc<NullToken>,
    voting_period: u64,
    schedule: Mutex<Schedule>,
}

impl NullRoundClock {
    pub fn new(clock: Arc<NullChainClock>, token: Arc<NullToken>, voting_period: u64) -> Self {
        Self {
            clock,
            token,
            voting_period,
            schedule: Mutex::new(Schedule::default()),
        }
    }

    /// Start the next round at the current block and return its id.
    pub fn start_new_round(&self) -> RoundId {
        let snapshot = self.clock.current_block();
        let mut schedule = self.schedule.lock().unwrap();
        schedule.rounds.push((snapshot, snapshot + self.voting_period));
        schedule.rounds.len() as RoundId
    }

    fn window(&self, round: RoundId) -> Option<(BlockNumber, BlockNumber)> {
        let index = usize::try_from(round.checked_sub(1)?).ok()?;
        self.schedule.lock().unwrap().rounds.get(index).copied()
    }
}

impl RoundClock for NullRoundClock {
    fn current_round_id(&self) -> RoundId {
        self.schedule.lock().unwrap().rounds.len() as RoundId
    }

    fn round_snapshot(&self, round: RoundId) -> Option<BlockNumber> {
        self.window(round).map(|(snapshot, _)| snapshot)
    }

    fn round_deadline(&self, round: RoundId) -> Option<BlockNumber> {
        self.window(round).map(|(_, deadline)| deadline)
    }

    fn voting_period(&self) -> u64 {
        self.voting_period
    }

    fn round_state(&self, round: RoundId) -> RoundState {
        match self.window(round) {
            None => RoundState::NotStarted,
            Some((_, deadline)) if self.clock.current_block() <= deadline => RoundState::Active,
            Some(_) => RoundState::Ended,
        }
    }

    fn get_votes(&self, account: &Address, block: BlockNumber) -> TokenAmount {
        self.token
            .past_balance_of(account, block)
            .saturating_add(self.deposit_voting_power(account, block))
    }

    fn deposit_voting_power(&self, account: &Address, block: BlockNumber) -> TokenAmount {
        let schedule = self.schedule.lock().unwrap();
        TokenAmount::new(
            schedule
                .deposit_power
                .get(account)
                .map(|h| h.at(block))
                .unwrap_or(0),
        )
    }

    fn record_deposit_voting_power(&self, account: &Address, block: BlockNumber, active: TokenAmount) {
        self.schedule
            .lock()
            .unwrap()
            .deposit_power
            .entry(*account)
            .or_default()
            .set(block, active.raw());
    }
}
