//! Fixed-size digest types: proposal ids, executor operation ids, raw digests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw 32-byte digest (description hashes, salts, predecessors).
pub type Digest32 = [u8; 32];

macro_rules! digest_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        pub struct $name([u8; 32]);

        impl $name {
            pub const ZERO: Self = Self([0u8; 32]);

            pub fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }

            /// Build from a slice of exactly 32 bytes.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, crate::TypesError> {
                let arr: [u8; 32] = bytes.try_into().map_err(|_| {
                    crate::TypesError::InvalidLength { expected: 32, actual: bytes.len() }
                })?;
                Ok(Self(arr))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(&self.0[..4]))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(&self.0))
            }
        }
    };
}

digest_type!(
    /// Deterministic digest identifying a proposal.
    ///
    /// Derived from the proposal's actions, description hash and proposer, so
    /// resubmitting identical content yields the same id.
    ProposalId
);

digest_type!(
    /// Identifier of a batch scheduled on the delayed executor.
    OperationId
);
