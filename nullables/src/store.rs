//! Nullable store: thread-safe in-memory governance and meta storage for testing.

use agora_store::keys::{composite_key, split_composite_key};
use agora_store::{BatchOp, GovernanceStore, MetaStore, StoreError, WriteBatch};
use agora_types::{Address, ProposalId, TokenAmount};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

const SCHEMA_VERSION_KEY: &str = "schema_version";

/// An in-memory store implementing both [`GovernanceStore`] and [`MetaStore`].
///
/// Keys are ordered the same way as in the LMDB backend so iteration order
/// matches.
pub struct NullStore {
    proposals: Mutex<BTreeMap<ProposalId, Vec<u8>>>,
    deposits: Mutex<BTreeMap<Vec<u8>, TokenAmount>>,
    receipts: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
    meta: Mutex<BTreeMap<String, Vec<u8>>>,
    reject_batches: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            proposals: Mutex::new(BTreeMap::new()),
            deposits: Mutex::new(BTreeMap::new()),
            receipts: Mutex::new(BTreeMap::new()),
            meta: Mutex::new(BTreeMap::new()),
            reject_batches: AtomicBool::new(false),
        }
    }

    /// Make every following `commit_batch` fail without writing anything.
    pub fn reject_batches(&self, reject: bool) {
        self.reject_batches.store(reject, Ordering::SeqCst);
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GovernanceStore for NullStore {
    fn put_proposal(&self, id: &ProposalId, data: &[u8]) -> Result<(), StoreError> {
        self.proposals.lock().unwrap().insert(*id, data.to_vec());
        Ok(())
    }

    fn get_proposal(&self, id: &ProposalId) -> Result<Vec<u8>, StoreError> {
        self.proposals
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("proposal {}", id)))
    }

    fn iter_proposals(&self) -> Result<Vec<(ProposalId, Vec<u8>)>, StoreError> {
        Ok(self
            .proposals
            .lock()
            .unwrap()
            .iter()
            .map(|(id, data)| (*id, data.clone()))
            .collect())
    }

    fn put_deposit(
        &self,
        id: &ProposalId,
        depositor: &Address,
        amount: TokenAmount,
    ) -> Result<(), StoreError> {
        self.deposits
            .lock()
            .unwrap()
            .insert(composite_key(id, depositor).to_vec(), amount);
        Ok(())
    }

    fn get_deposit(&self, id: &ProposalId, depositor: &Address) -> Result<Option<TokenAmount>, StoreError> {
        let key = composite_key(id, depositor);
        Ok(self.deposits.lock().unwrap().get(key.as_slice()).copied())
    }

    fn iter_deposits(&self) -> Result<Vec<(ProposalId, Address, TokenAmount)>, StoreError> {
        self.deposits
            .lock()
            .unwrap()
            .iter()
            .map(|(key, amount)| {
                let (id, depositor) = split_composite_key(key)?;
                Ok((id, depositor, *amount))
            })
            .collect()
    }

    fn put_receipt(&self, id: &ProposalId, voter: &Address, data: &[u8]) -> Result<(), StoreError> {
        self.receipts
            .lock()
            .unwrap()
            .insert(composite_key(id, voter).to_vec(), data.to_vec());
        Ok(())
    }

    fn get_receipt(&self, id: &ProposalId, voter: &Address) -> Result<Option<Vec<u8>>, StoreError> {
        let key = composite_key(id, voter);
        Ok(self.receipts.lock().unwrap().get(key.as_slice()).cloned())
    }

    fn iter_receipts(&self) -> Result<Vec<(ProposalId, Address, Vec<u8>)>, StoreError> {
        self.receipts
            .lock()
            .unwrap()
            .iter()
            .map(|(key, data)| {
                let (id, voter) = split_composite_key(key)?;
                Ok((id, voter, data.clone()))
            })
            .collect()
    }

    fn commit_batch(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if self.reject_batches.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("write batch rejected".into()));
        }
        let mut proposals = self.proposals.lock().unwrap();
        let mut deposits = self.deposits.lock().unwrap();
        let mut receipts = self.receipts.lock().unwrap();
        let mut meta = self.meta.lock().unwrap();
        for op in batch.into_ops() {
            match op {
                BatchOp::Proposal { id, data } => {
                    proposals.insert(id, data);
                }
                BatchOp::Deposit { id, depositor, amount } => {
                    deposits.insert(composite_key(&id, &depositor).to_vec(), amount);
                }
                BatchOp::Receipt { id, voter, data } => {
                    receipts.insert(composite_key(&id, &voter).to_vec(), data);
                }
                BatchOp::Meta { key, value } => {
                    meta.insert(key, value);
                }
            }
        }
        Ok(())
    }
}

impl MetaStore for NullStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.meta.lock().unwrap().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.meta
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn delete_meta(&self, key: &str) -> Result<(), StoreError> {
        self.meta.lock().unwrap().remove(key);
        Ok(())
    }

    fn get_schema_version(&self) -> Result<u32, StoreError> {
        match self.meta.lock().unwrap().get(SCHEMA_VERSION_KEY) {
            None => Ok(0),
            Some(bytes) => {
                let buf: [u8; 4] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StoreError::Corruption("invalid schema version bytes".into()))?;
                Ok(u32::from_be_bytes(buf))
            }
        }
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        self.put_meta(SCHEMA_VERSION_KEY, &version.to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_proposal() {
        let store = NullStore::new();
        let id = ProposalId::new([7u8; 32]);
        assert!(matches!(store.get_proposal(&id), Err(StoreError::NotFound(_))));
        store.put_proposal(&id, b"record").unwrap();
        assert_eq!(store.get_proposal(&id).unwrap(), b"record".to_vec());
        assert_eq!(store.iter_proposals().unwrap().len(), 1);
    }

    #[test]
    fn test_deposits_and_receipts() {
        let store = NullStore::new();
        let id = ProposalId::new([1u8; 32]);
        let alice = Address::repeat_byte(0xa);
        store.put_deposit(&id, &alice, TokenAmount::new(9)).unwrap();
        store.put_receipt(&id, &alice, b"r").unwrap();
        assert_eq!(store.get_deposit(&id, &alice).unwrap(), Some(TokenAmount::new(9)));
        assert_eq!(store.iter_deposits().unwrap(), vec![(id, alice, TokenAmount::new(9))]);
        assert_eq!(store.iter_receipts().unwrap(), vec![(id, alice, b"r".to_vec())]);
    }

    #[test]
    fn test_schema_version() {
        let store = NullStore::new();
        assert_eq!(store.get_schema_version().unwrap(), 0);
        store.set_schema_version(1).unwrap();
        assert_eq!(store.get_schema_version().unwrap(), 1);
        store.delete_meta(SCHEMA_VERSION_KEY).unwrap();
        assert_eq!(store.get_schema_version().unwrap(), 0);
    }

    #[test]
    fn test_rejected_batch_writes_nothing() {
        let store = NullStore::new();
        let id = ProposalId::new([2u8; 32]);
        let mut batch = WriteBatch::new();
        batch.put_proposal(&id, b"p".to_vec());
        batch.put_meta("state", b"s".to_vec());

        store.reject_batches(true);
        assert!(matches!(store.commit_batch(batch.clone()), Err(StoreError::Backend(_))));
        assert!(store.iter_proposals().unwrap().is_empty());

        store.reject_batches(false);
        store.commit_batch(batch).unwrap();
        assert_eq!(store.get_proposal(&id).unwrap(), b"p".to_vec());
        assert_eq!(store.get_meta("state").unwrap(), b"s".to_vec());
    }
}
