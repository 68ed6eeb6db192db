//! Abstract storage traits for the Agora governance engine.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The governor depends only on the traits.
//!
//! Layout: proposals are addressed by their 32-byte id; deposits and vote
//! receipts by the composite `(proposal id, account)` key built in [`keys`].

pub mod batch;
pub mod error;
pub mod governance;
pub mod keys;
pub mod meta;

pub use batch::{BatchOp, WriteBatch};
pub use error::StoreError;
pub use governance::GovernanceStore;
pub use meta::MetaStore;

/// The schema version that the current code reads and writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;
