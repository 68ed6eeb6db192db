//! Token-weighted governance with round-anchored voting windows.
//!
//! Lifecycle: Pending → Active (deposit threshold met by the snapshot) or
//! DepositNotMet → Succeeded / Defeated → Queued → Executed, optionally
//! followed by InDevelopment → Completed for standard proposals.
//! Cancellation is a side branch from Pending, Active, Succeeded or Queued.
//!
//! Key principles:
//! - State is never stored; it is derived from flags, the clock and the tally.
//! - Voting windows follow an external round schedule.
//! - Votes are weighted linearly or quadratically, fixed per round.
//! - Execution goes through a delayed executor the governor controls exclusively.

pub mod access;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod escrow;
pub mod gate;
pub mod governor;
pub mod persist;
pub mod proposal;
pub mod snapshot;
pub mod tally;

pub use access::{AccessControl, Role};
pub use config::{ConfigError, GovernorConfig, ProposalType, ProposalTypeConfig, RoleAssignments, TypeConfigs};
pub use error::{ErrorKind, GovernanceError};
pub use governor::{Externals, Governor, NewProposal};
pub use persist::{read_deposit_totals, read_proposals};
pub use proposal::{derive_state, DevelopmentStatus, Proposal, ProposalState};
pub use snapshot::{SnapshotEstimator, VotingWindow};
pub use tally::{isqrt, quadratic_weight, ProposalVotes, VoteReceipt, VoteType, WeightingMode};
