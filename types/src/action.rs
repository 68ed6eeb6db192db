//! Proposal actions: the calls a proposal asks the delayed executor to make.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;

/// The first four bytes of a call's payload, naming the function being invoked.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Selector([u8; 4]);

impl Selector {
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Extract the selector from calldata. `None` if the calldata is shorter than 4 bytes.
    pub fn from_calldata(calldata: &[u8]) -> Option<Self> {
        let head: [u8; 4] = calldata.get(..4)?.try_into().ok()?;
        Some(Self(head))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector(0x{})", hex::encode(&self.0))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// One call carried by a proposal: target, native value and calldata.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub target: Address,
    pub value: u128,
    pub calldata: Vec<u8>,
}

impl Action {
    pub fn new(target: Address, value: u128, calldata: Vec<u8>) -> Self {
        Self { target, value, calldata }
    }

    pub fn selector(&self) -> Option<Selector> {
        Selector::from_calldata(&self.calldata)
    }
}
