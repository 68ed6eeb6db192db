//! LMDB implementation of GovernanceStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use agora_store::keys::{composite_key, split_composite_key};
use agora_store::{BatchOp, GovernanceStore, StoreError, WriteBatch};
use agora_types::{Address, ProposalId, TokenAmount};

use crate::LmdbError;

pub struct LmdbGovernanceStore {
    pub(crate) env: Arc<Env>,
    pub(crate) proposals_db: Database<Bytes, Bytes>,
    pub(crate) deposits_db: Database<Bytes, Bytes>,
    pub(crate) receipts_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

fn decode_amount(bytes: &[u8]) -> Result<TokenAmount, StoreError> {
    let buf: [u8; 16] = bytes
        .try_into()
        .map_err(|_| StoreError::Serialization("invalid deposit bytes length".into()))?;
    Ok(TokenAmount::new(u128::from_be_bytes(buf)))
}

impl LmdbGovernanceStore {
    fn put(&self, db: Database<Bytes, Bytes>, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        db.put(&mut wtxn, key, value).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get(&self, db: Database<Bytes, Bytes>, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let value = db.get(&rtxn, key).map_err(LmdbError::from)?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn scan(&self, db: Database<Bytes, Bytes>) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (key, val) = entry.map_err(LmdbError::from)?;
            results.push((key.to_vec(), val.to_vec()));
        }
        Ok(results)
    }
}

impl GovernanceStore for LmdbGovernanceStore {
    fn put_proposal(&self, id: &ProposalId, data: &[u8]) -> Result<(), StoreError> {
        self.put(self.proposals_db, id.as_bytes(), data)
    }

    fn get_proposal(&self, id: &ProposalId) -> Result<Vec<u8>, StoreError> {
        self.get(self.proposals_db, id.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(format!("proposal {}", id)))
    }

    fn iter_proposals(&self) -> Result<Vec<(ProposalId, Vec<u8>)>, StoreError> {
        self.scan(self.proposals_db)?
            .into_iter()
            .map(|(key, val)| {
                let id = ProposalId::from_slice(&key)
                    .map_err(|e| StoreError::Corruption(e.to_string()))?;
                Ok((id, val))
            })
            .collect()
    }

    fn put_deposit(
        &self,
        id: &ProposalId,
        depositor: &Address,
        amount: TokenAmount,
    ) -> Result<(), StoreError> {
        let key = composite_key(id, depositor);
        self.put(self.deposits_db, &key, &amount.raw().to_be_bytes())
    }

    fn get_deposit(&self, id: &ProposalId, depositor: &Address) -> Result<Option<TokenAmount>, StoreError> {
        let key = composite_key(id, depositor);
        self.get(self.deposits_db, &key)?
            .map(|bytes| decode_amount(&bytes))
            .transpose()
    }

    fn iter_deposits(&self) -> Result<Vec<(ProposalId, Address, TokenAmount)>, StoreError> {
        self.scan(self.deposits_db)?
            .into_iter()
            .map(|(key, val)| {
                let (id, depositor) = split_composite_key(&key)?;
                Ok((id, depositor, decode_amount(&val)?))
            })
            .collect()
    }

    fn put_receipt(&self, id: &ProposalId, voter: &Address, data: &[u8]) -> Result<(), StoreError> {
        let key = composite_key(id, voter);
        self.put(self.receipts_db, &key, data)
    }

    fn get_receipt(&self, id: &ProposalId, voter: &Address) -> Result<Option<Vec<u8>>, StoreError> {
        let key = composite_key(id, voter);
        self.get(self.receipts_db, &key)
    }

    fn iter_receipts(&self) -> Result<Vec<(ProposalId, Address, Vec<u8>)>, StoreError> {
        self.scan(self.receipts_db)?
            .into_iter()
            .map(|(key, val)| {
                let (id, voter) = split_composite_key(&key)?;
                Ok((id, voter, val))
            })
            .collect()
    }

    fn commit_batch(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let ops = batch.len();
        // dropping the transaction on error aborts every write made so far
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for op in batch.into_ops() {
            let written = match op {
                BatchOp::Proposal { id, data } => self.proposals_db.put(&mut wtxn, id.as_bytes(), &data),
                BatchOp::Deposit { id, depositor, amount } => self.deposits_db.put(
                    &mut wtxn,
                    &composite_key(&id, &depositor),
                    &amount.raw().to_be_bytes(),
                ),
                BatchOp::Receipt { id, voter, data } => {
                    self.receipts_db.put(&mut wtxn, &composite_key(&id, &voter), &data)
                }
                BatchOp::Meta { key, value } => self.meta_db.put(&mut wtxn, key.as_bytes(), &value),
            };
            written.map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::debug!(ops, "committed write batch");
        Ok(())
    }
}
