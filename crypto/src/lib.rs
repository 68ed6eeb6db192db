//! Hashing primitives for the Agora governance engine.
//!
//! - **Blake2b-256** for every digest
//! - Proposal ids derived from proposal content and proposer
//! - Delayed-executor operation ids and the per-governor salt

pub mod digest;
pub mod hash;

pub use digest::{hash_description, operation_id, proposal_id, timelock_salt};
pub use hash::{blake2b_256, blake2b_256_multi};
