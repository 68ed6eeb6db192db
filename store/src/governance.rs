//! Governance storage trait.

use crate::{StoreError, WriteBatch};
use agora_types::{Address, ProposalId, TokenAmount};

/// Trait for storing governance records (proposals, deposits, vote receipts).
///
/// Values are opaque encoded records except deposits, which are stored as
/// plain big-endian amounts.
pub trait GovernanceStore {
    /// Store a proposal record.
    fn put_proposal(&self, id: &ProposalId, data: &[u8]) -> Result<(), StoreError>;

    /// Get a proposal record by id.
    fn get_proposal(&self, id: &ProposalId) -> Result<Vec<u8>, StoreError>;

    /// Every stored proposal, ordered by id.
    fn iter_proposals(&self) -> Result<Vec<(ProposalId, Vec<u8>)>, StoreError>;

    /// Store one depositor's entry for a proposal (zero for a withdrawn entry).
    fn put_deposit(
        &self,
        id: &ProposalId,
        depositor: &Address,
        amount: TokenAmount,
    ) -> Result<(), StoreError>;

    fn get_deposit(&self, id: &ProposalId, depositor: &Address) -> Result<Option<TokenAmount>, StoreError>;

    /// Every stored deposit entry, ordered by `(proposal, depositor)`.
    fn iter_deposits(&self) -> Result<Vec<(ProposalId, Address, TokenAmount)>, StoreError>;

    /// Store a voter's receipt on a proposal.
    fn put_receipt(&self, id: &ProposalId, voter: &Address, data: &[u8]) -> Result<(), StoreError>;

    fn get_receipt(&self, id: &ProposalId, voter: &Address) -> Result<Option<Vec<u8>>, StoreError>;

    /// Every stored receipt, ordered by `(proposal, voter)`.
    fn iter_receipts(&self) -> Result<Vec<(ProposalId, Address, Vec<u8>)>, StoreError>;

    /// Apply every write in `batch`, or none of them.
    fn commit_batch(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
