//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator the governor talks to (chain clock, round scheduler,
//! token, level oracle, delayed executor, storage) has an in-memory
//! implementation here that:
//! - Returns deterministic values
//! - Can be driven programmatically (advance blocks, start rounds, mint, pause)
//! - Never touches the filesystem or network
//!
//! Usage: wire these into `Externals` in tests instead of the real systems.

mod history;

pub mod clock;
pub mod levels;
pub mod rounds;
pub mod store;
pub mod timelock;
pub mod token;

pub use clock::NullChainClock;
pub use levels::NullLevelOracle;
pub use rounds::NullRoundClock;
pub use store::NullStore;
pub use timelock::NullTimelock;
pub use token::NullToken;
