//! Block-indexed value history with undo.
//!
//! Used for per-account deposit voting power and for the quorum numerator.
//! Lookups return the value in force at the end of a block.

use agora_types::BlockNumber;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub block: BlockNumber,
    pub value: u128,
}

/// What a [`Checkpoints::push`] changed, so it can be rolled back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum PushUndo {
    Appended,
    Replaced(Checkpoint),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoints {
    history: Vec<Checkpoint>,
}

impl Checkpoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(block: BlockNumber, value: u128) -> Self {
        Self {
            history: vec![Checkpoint { block, value }],
        }
    }

    /// Most recent value, 0 if nothing was ever recorded.
    pub fn latest(&self) -> u128 {
        self.history.last().map(|c| c.value).unwrap_or(0)
    }

    /// Value in force at the end of `block`.
    pub fn upper_lookup(&self, block: BlockNumber) -> u128 {
        let idx = self.history.partition_point(|c| c.block <= block);
        match idx {
            0 => 0,
            _ => self.history[idx - 1].value,
        }
    }

    /// Record `value` from `block` on. A push in the block of the latest
    /// checkpoint overwrites it; a stale block is clamped to the latest one.
    pub fn push(&mut self, block: BlockNumber, value: u128) -> PushUndo {
        match self.history.last_mut() {
            Some(last) if last.block >= block => {
                let previous = *last;
                last.value = value;
                PushUndo::Replaced(previous)
            }
            _ => {
                self.history.push(Checkpoint { block, value });
                PushUndo::Appended
            }
        }
    }

    /// Roll back the push that produced `undo`. Must be the most recent push.
    pub fn undo(&mut self, undo: PushUndo) {
        match undo {
            PushUndo::Appended => {
                self.history.pop();
            }
            PushUndo::Replaced(previous) => {
                if let Some(last) = self.history.last_mut() {
                    *last = previous;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_lookup_finds_value_in_force() {
        let mut cps = Checkpoints::new();
        assert_eq!(cps.upper_lookup(100), 0);
        let _ = cps.push(10, 5);
        let _ = cps.push(20, 8);
        assert_eq!(cps.upper_lookup(9), 0);
        assert_eq!(cps.upper_lookup(10), 5);
        assert_eq!(cps.upper_lookup(19), 5);
        assert_eq!(cps.upper_lookup(20), 8);
        assert_eq!(cps.upper_lookup(u64::MAX), 8);
        assert_eq!(cps.latest(), 8);
    }

    #[test]
    fn same_block_push_replaces() {
        let mut cps = Checkpoints::with_initial(10, 1);
        let undo = cps.push(10, 2);
        assert_eq!(undo, PushUndo::Replaced(Checkpoint { block: 10, value: 1 }));
        assert_eq!(cps.len(), 1);
        assert_eq!(cps.latest(), 2);
        cps.undo(undo);
        assert_eq!(cps.latest(), 1);
    }

    #[test]
    fn undo_append() {
        let mut cps = Checkpoints::with_initial(1, 4);
        let undo = cps.push(7, 9);
        assert_eq!(undo, PushUndo::Appended);
        cps.undo(undo);
        assert_eq!(cps, Checkpoints::with_initial(1, 4));
    }
}
