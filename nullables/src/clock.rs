//! Nullable chain clock: deterministic blocks and time for testing.

use agora_interfaces::ChainClock;
use agora_types::{BlockNumber, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};

/// Seconds per block when advancing blocks also advances time.
pub const NULL_BLOCK_TIME_SECS: u64 = 10;

/// A deterministic chain clock.
///
/// Blocks and time only advance when you tell them to.
pub struct NullChainClock {
    block: AtomicU64,
    time: AtomicU64,
}

impl NullChainClock {
    pub fn new(block: BlockNumber, time_secs: u64) -> Self {
        Self {
            block: AtomicU64::new(block),
            time: AtomicU64::new(time_secs),
        }
    }

    /// Mine `n` blocks, moving time forward by `NULL_BLOCK_TIME_SECS` each.
    pub fn advance_blocks(&self, n: u64) {
        self.block.fetch_add(n, Ordering::SeqCst);
        self.time.fetch_add(n * NULL_BLOCK_TIME_SECS, Ordering::SeqCst);
    }

    /// Move wall-clock time without mining.
    pub fn advance_time(&self, secs: u64) {
        self.time.fetch_add(secs, Ordering::SeqCst);
    }

    /// Mine until `block` (no-op if already past it).
    pub fn advance_to(&self, block: BlockNumber) {
        let current = self.current_block();
        if block > current {
            self.advance_blocks(block - current);
        }
    }
}

impl Default for NullChainClock {
    fn default() -> Self {
        Self::new(1, 1_700_000_000)
    }
}

impl ChainClock for NullChainClock {
    fn current_block(&self) -> BlockNumber {
        self.block.load(Ordering::SeqCst)
    }

    fn timestamp(&self) -> Timestamp {
        Timestamp::new(self.time.load(Ordering::SeqCst))
    }
}
