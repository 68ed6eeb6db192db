//! Buffered governance writes, applied by a backend all at once.

use agora_types::{Address, ProposalId, TokenAmount};

/// One buffered write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    Proposal { id: ProposalId, data: Vec<u8> },
    Deposit { id: ProposalId, depositor: Address, amount: TokenAmount },
    Receipt { id: ProposalId, voter: Address, data: Vec<u8> },
    /// Goes to the metadata store sharing the backend.
    Meta { key: String, value: Vec<u8> },
}

/// Writes collected in order and handed to
/// [`GovernanceStore::commit_batch`](crate::GovernanceStore::commit_batch).
#[derive(Clone, Debug, Default)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_proposal(&mut self, id: &ProposalId, data: Vec<u8>) {
        self.ops.push(BatchOp::Proposal { id: *id, data });
    }

    pub fn put_deposit(&mut self, id: &ProposalId, depositor: &Address, amount: TokenAmount) {
        self.ops.push(BatchOp::Deposit {
            id: *id,
            depositor: *depositor,
            amount,
        });
    }

    pub fn put_receipt(&mut self, id: &ProposalId, voter: &Address, data: Vec<u8>) {
        self.ops.push(BatchOp::Receipt {
            id: *id,
            voter: *voter,
            data,
        });
    }

    pub fn put_meta(&mut self, key: &str, value: Vec<u8>) {
        self.ops.push(BatchOp::Meta {
            key: key.to_string(),
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}
