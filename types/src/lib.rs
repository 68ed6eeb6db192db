//! Fundamental types for the Agora governance engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, digests, token amounts, block/round numbering, timestamps,
//! and proposal actions.

pub mod action;
pub mod address;
pub mod amount;
pub mod block;
pub mod error;
pub mod hash;
pub mod time;

pub use action::{Action, Selector};
pub use address::Address;
pub use amount::TokenAmount;
pub use block::{BlockNumber, RoundId};
pub use error::TypesError;
pub use hash::{Digest32, OperationId, ProposalId};
pub use time::Timestamp;
