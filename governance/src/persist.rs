//! Saving and restoring a governor through the storage traits.
//!
//! Proposals, deposit entries and vote receipts each get their own record
//! so they can be listed without loading the governor. Everything else
//! (settings, roles, quorum history, deposit-power history) is one bincode
//! blob under [`STATE_META_KEY`].

use std::collections::BTreeMap;

use agora_store::{GovernanceStore, MetaStore, StoreError, WriteBatch, CURRENT_SCHEMA_VERSION};
use agora_types::{Address, ProposalId, TokenAmount};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::access::AccessControl;
use crate::config::TypeConfigs;
use crate::error::GovernanceError;
use crate::escrow::{DepositEscrow, EscrowSnapshot};
use crate::gate::ExecutionGate;
use crate::governor::{Externals, Governor, GovernorState};
use crate::proposal::Proposal;
use crate::tally::{TallySettings, VoteReceipt, VoteTally};

pub const STATE_META_KEY: &str = "governor_state";

#[derive(Serialize, Deserialize)]
struct StateRecord {
    address: Address,
    gate: ExecutionGate,
    types: TypeConfigs,
    min_voting_delay: u64,
    access: AccessControl,
    tally: TallySettings,
    escrow: EscrowSnapshot,
}

fn check_schema(meta: &impl MetaStore) -> Result<u32, GovernanceError> {
    let version = meta.get_schema_version()?;
    if version > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::SchemaTooNew {
            found: version,
            supported: CURRENT_SCHEMA_VERSION,
        }
        .into());
    }
    Ok(version)
}

/// Decode every stored proposal, checking each record against its key.
pub fn read_proposals(store: &impl GovernanceStore) -> Result<Vec<Proposal>, GovernanceError> {
    store
        .iter_proposals()?
        .into_iter()
        .map(|(id, bytes)| -> Result<Proposal, GovernanceError> {
            let proposal: Proposal = bincode::deserialize(&bytes)?;
            if proposal.id != id {
                return Err(StoreError::Corruption(format!(
                    "proposal stored under {} carries id {}",
                    id, proposal.id
                ))
                .into());
            }
            Ok(proposal)
        })
        .collect()
}

/// Sum of stored deposit entries per proposal.
pub fn read_deposit_totals(store: &impl GovernanceStore) -> Result<BTreeMap<ProposalId, TokenAmount>, GovernanceError> {
    let mut totals: BTreeMap<ProposalId, TokenAmount> = BTreeMap::new();
    for (id, _, amount) in store.iter_deposits()? {
        let total = totals.entry(id).or_default();
        *total = total.checked_add(amount).ok_or(GovernanceError::DepositOverflow)?;
    }
    Ok(totals)
}

impl Governor {
    /// Write the full governor state as one store batch. A failed save
    /// leaves the previous one intact. Records are overwritten in place.
    ///
    /// The state blob travels in the batch too, so `store` and `meta` must
    /// share a backend.
    pub fn persist(&self, store: &impl GovernanceStore, meta: &impl MetaStore) -> Result<(), GovernanceError> {
        if check_schema(meta)? < CURRENT_SCHEMA_VERSION {
            meta.set_schema_version(CURRENT_SCHEMA_VERSION)?;
        }

        let mut batch = WriteBatch::new();
        for proposal in self.state.proposals.values() {
            batch.put_proposal(&proposal.id, bincode::serialize(proposal)?);
        }
        for (id, account, amount) in self.state.escrow.entries() {
            batch.put_deposit(&id, &account, amount);
        }
        for ((id, voter), receipt) in self.state.tally.receipts() {
            batch.put_receipt(id, voter, bincode::serialize(receipt)?);
        }

        let record = StateRecord {
            address: self.address,
            gate: self.state.gate.clone(),
            types: self.state.types,
            min_voting_delay: self.state.min_voting_delay,
            access: self.state.access.clone(),
            tally: self.state.tally.settings().clone(),
            escrow: self.state.escrow.snapshot(),
        };
        batch.put_meta(STATE_META_KEY, bincode::serialize(&record)?);
        store.commit_batch(batch)?;

        info!(
            proposals = self.state.proposals.len(),
            "governor state persisted"
        );
        Ok(())
    }

    /// Rebuild a governor from storage, re-checking the executor's roles.
    pub fn restore(
        ext: Externals,
        store: &impl GovernanceStore,
        meta: &impl MetaStore,
    ) -> Result<Self, GovernanceError> {
        check_schema(meta)?;
        let record: StateRecord = bincode::deserialize(&meta.get_meta(STATE_META_KEY)?)?;

        let proposals = read_proposals(store)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect::<BTreeMap<_, _>>();
        let escrow = DepositEscrow::restore(store.iter_deposits()?, record.escrow)?;
        let receipts = store
            .iter_receipts()?
            .into_iter()
            .map(|(id, voter, bytes)| -> Result<_, GovernanceError> {
                let receipt: VoteReceipt = bincode::deserialize(&bytes)?;
                Ok((id, voter, receipt))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let tally = VoteTally::restore(receipts, record.tally)?;

        debug!(proposals = proposals.len(), "restoring governor state");
        let state = GovernorState {
            proposals,
            escrow,
            tally,
            gate: record.gate,
            types: record.types,
            min_voting_delay: record.min_voting_delay,
            access: record.access,
        };
        let governor = Governor::from_state(record.address, ext, state)?;
        info!(address = %governor.address(), "governor restored");
        Ok(governor)
    }
}
