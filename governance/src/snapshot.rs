//! Voting-window bounds from a target round.
//!
//! Until the target round starts, its snapshot is an estimate derived from
//! the current round's deadline (or the current block, once that deadline
//! has passed without a successor). The estimate is recomputed on every
//! read; a round that starts late drags it forward one block per block.
//! Once the round starts, the round clock's actual values are returned and
//! never change again.

use agora_interfaces::{RoundClock, RoundState};
use agora_types::{BlockNumber, RoundId};
use tracing::debug;

use crate::error::GovernanceError;

/// Snapshot and deadline blocks for one proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VotingWindow {
    pub snapshot: BlockNumber,
    pub deadline: BlockNumber,
    /// `false` once the target round has started.
    pub estimated: bool,
}

pub struct SnapshotEstimator<'a> {
    rounds: &'a dyn RoundClock,
}

impl<'a> SnapshotEstimator<'a> {
    pub fn new(rounds: &'a dyn RoundClock) -> Self {
        Self { rounds }
    }

    /// Actual bounds of `target` if it (or a later round) has started.
    fn started_window(&self, target: RoundId) -> Option<VotingWindow> {
        let current = self.rounds.current_round_id();
        let started = target < current
            || (target == current && self.rounds.round_state(target) != RoundState::NotStarted);
        if !started {
            return None;
        }
        Some(VotingWindow {
            snapshot: self.rounds.round_snapshot(target)?,
            deadline: self.rounds.round_deadline(target)?,
            estimated: false,
        })
    }

    /// Bounds of the voting window anchored to `target`, as seen at `current_block`.
    pub fn window(&self, target: RoundId, current_block: BlockNumber) -> VotingWindow {
        if let Some(window) = self.started_window(target) {
            return window;
        }

        let current = self.rounds.current_round_id();
        let period = self.rounds.voting_period();
        let rounds_until = target.saturating_sub(current).max(1);
        let anchor = self
            .rounds
            .round_deadline(current)
            .unwrap_or(0)
            .max(current_block);
        let snapshot = anchor
            .saturating_add(1)
            .saturating_add((rounds_until - 1).saturating_mul(period.saturating_add(1)));
        let window = VotingWindow {
            snapshot,
            deadline: snapshot.saturating_add(period),
            estimated: true,
        };
        debug!(
            target_round = target,
            current_round = current,
            anchor,
            snapshot = window.snapshot,
            deadline = window.deadline,
            "estimated voting window"
        );
        window
    }

    /// Validate a proposal's target round at creation time.
    ///
    /// The target must not have started, and its snapshot must lie at least
    /// `min_voting_delay` blocks in the future.
    pub fn validate_target(
        &self,
        target: RoundId,
        current_block: BlockNumber,
        min_voting_delay: u64,
    ) -> Result<VotingWindow, GovernanceError> {
        let current = self.rounds.current_round_id();
        let window = self.window(target, current_block);
        let invalid = || GovernanceError::InvalidTargetRound {
            target,
            current,
            snapshot: window.snapshot,
            block: current_block,
        };
        if target <= current || !window.estimated {
            return Err(invalid());
        }
        if window.snapshot <= current_block || window.snapshot - current_block < min_voting_delay {
            return Err(invalid());
        }
        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::{Address, TokenAmount};
    use std::sync::Mutex;

    /// Round clock with hand-set rounds and a hand-set block.
    struct FixedRounds {
        period: u64,
        block: Mutex<BlockNumber>,
        started: Mutex<Vec<(BlockNumber, BlockNumber)>>,
    }

    impl FixedRounds {
        fn new(period: u64) -> Self {
            Self {
                period,
                block: Mutex::new(0),
                started: Mutex::new(Vec::new()),
            }
        }

        fn start_at(&self, snapshot: BlockNumber) {
            *self.block.lock().unwrap() = snapshot;
            self.started.lock().unwrap().push((snapshot, snapshot + self.period));
        }

        fn get(&self, round: RoundId) -> Option<(BlockNumber, BlockNumber)> {
            let idx = round.checked_sub(1)? as usize;
            self.started.lock().unwrap().get(idx).copied()
        }
    }

    impl RoundClock for FixedRounds {
        fn current_round_id(&self) -> RoundId {
            self.started.lock().unwrap().len() as RoundId
        }
        fn round_snapshot(&self, round: RoundId) -> Option<BlockNumber> {
            self.get(round).map(|w| w.0)
        }
        fn round_deadline(&self, round: RoundId) -> Option<BlockNumber> {
            self.get(round).map(|w| w.1)
        }
        fn voting_period(&self) -> u64 {
            self.period
        }
        fn round_state(&self, round: RoundId) -> RoundState {
            match self.get(round) {
                None => RoundState::NotStarted,
                Some((_, d)) if *self.block.lock().unwrap() <= d => RoundState::Active,
                Some(_) => RoundState::Ended,
            }
        }
        fn get_votes(&self, _: &Address, _: BlockNumber) -> TokenAmount {
            TokenAmount::ZERO
        }
        fn deposit_voting_power(&self, _: &Address, _: BlockNumber) -> TokenAmount {
            TokenAmount::ZERO
        }
        fn record_deposit_voting_power(&self, _: &Address, _: BlockNumber, _: TokenAmount) {}
    }

    #[test]
    fn estimate_from_current_deadline() {
        let rounds = FixedRounds::new(10);
        rounds.start_at(100);
        let est = SnapshotEstimator::new(&rounds);

        let next = est.window(2, 103);
        assert_eq!(next, VotingWindow { snapshot: 111, deadline: 121, estimated: true });

        let after = est.window(3, 103);
        assert_eq!(after.snapshot, 122);
        assert_eq!(after.deadline, 132);
    }

    #[test]
    fn estimate_drifts_when_round_starts_late() {
        let rounds = FixedRounds::new(10);
        rounds.start_at(100);
        let est = SnapshotEstimator::new(&rounds);

        assert_eq!(est.window(2, 110).snapshot, 111);
        assert_eq!(est.window(2, 115).snapshot, 116);
        assert_eq!(est.window(2, 116).snapshot, 117);
    }

    #[test]
    fn frozen_once_started() {
        let rounds = FixedRounds::new(10);
        rounds.start_at(100);
        rounds.start_at(118);
        let est = SnapshotEstimator::new(&rounds);

        let w = est.window(2, 120);
        assert_eq!(w, VotingWindow { snapshot: 118, deadline: 128, estimated: false });
        assert_eq!(est.window(2, 500), w);
        rounds.start_at(140);
        assert_eq!(est.window(2, 900), w);
    }

    #[test]
    fn no_rounds_yet_anchors_on_block() {
        let rounds = FixedRounds::new(10);
        let est = SnapshotEstimator::new(&rounds);
        assert_eq!(est.window(1, 50).snapshot, 51);
        assert_eq!(est.window(2, 50).snapshot, 62);
    }

    #[test]
    fn validate_target_rules() {
        let rounds = FixedRounds::new(10);
        rounds.start_at(100);
        let est = SnapshotEstimator::new(&rounds);

        // current round is not a valid target
        assert!(matches!(
            est.validate_target(1, 101, 1),
            Err(GovernanceError::InvalidTargetRound { .. })
        ));
        // snapshot 111, 8 blocks away
        assert!(est.validate_target(2, 103, 8).is_ok());
        assert!(matches!(
            est.validate_target(2, 103, 9),
            Err(GovernanceError::InvalidTargetRound { .. })
        ));
        // a more distant round clears the delay
        assert!(est.validate_target(3, 103, 9).is_ok());
    }
}
