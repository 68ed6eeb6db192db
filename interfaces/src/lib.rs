//! Collaborator traits for the Agora governor.
//!
//! The governor never implements the round scheduler, the token, the
//! membership oracle or the delayed executor. It depends only on the traits
//! below; production deployments bind them to the real systems and tests
//! bind them to `agora-nullables`.
//!
//! All traits take `&self` and are `Send + Sync`: implementations own their
//! interior mutability.

pub mod chain;
pub mod executor;
pub mod levels;
pub mod rounds;
pub mod token;

pub use chain::ChainClock;
pub use executor::{DelayedExecutor, ExecutorError, ExecutorRole};
pub use levels::LevelOracle;
pub use rounds::{RoundClock, RoundState};
pub use token::{GovernanceToken, TokenError};
