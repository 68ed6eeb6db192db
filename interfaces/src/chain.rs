//! Host-chain clock: block height and wall-clock time.

use agora_types::{BlockNumber, Timestamp};

/// Source of the current block number and timestamp.
pub trait ChainClock: Send + Sync {
    fn current_block(&self) -> BlockNumber;

    fn timestamp(&self) -> Timestamp;
}
