//! Block and round numbering.
//!
//! Block numbers come from the chain clock; round ids come from the external
//! round scheduler. Both are plain counters, so they are aliases rather than
//! newtypes: the estimator mixes them with durations in ordinary arithmetic.

/// Height of a block on the host chain.
pub type BlockNumber = u64;

/// Identifier of a round scheduled by the round clock. Round `0` means no round has started.
pub type RoundId = u64;
