//! Domain-separated digests for proposals and delayed-executor operations.
//!
//! Every variable-length field is length-prefixed (u64 big-endian) so two
//! different action lists can never encode to the same byte stream.

use agora_types::{Action, Address, Digest32, OperationId, ProposalId};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

const PROPOSAL_DOMAIN: &[u8] = b"agora/proposal/v1";
const OPERATION_DOMAIN: &[u8] = b"agora/operation/v1";

fn update_actions(hasher: &mut Blake2b256, actions: &[Action]) {
    hasher.update((actions.len() as u64).to_be_bytes());
    for action in actions {
        hasher.update(action.target.as_bytes());
        hasher.update(action.value.to_be_bytes());
        hasher.update((action.calldata.len() as u64).to_be_bytes());
        hasher.update(&action.calldata);
    }
}

fn finish(hasher: Blake2b256) -> [u8; 32] {
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Hash of a proposal's free-text description.
pub fn hash_description(description: &str) -> Digest32 {
    crate::hash::blake2b_256(description.as_bytes())
}

/// Deterministic proposal id over (actions, description hash, proposer).
pub fn proposal_id(actions: &[Action], description_hash: &Digest32, proposer: &Address) -> ProposalId {
    let mut hasher = Blake2b256::new();
    hasher.update(PROPOSAL_DOMAIN);
    update_actions(&mut hasher, actions);
    hasher.update(description_hash);
    hasher.update(proposer.as_bytes());
    ProposalId::new(finish(hasher))
}

/// Id of a batch on the delayed executor.
pub fn operation_id(actions: &[Action], predecessor: &Digest32, salt: &Digest32) -> OperationId {
    let mut hasher = Blake2b256::new();
    hasher.update(OPERATION_DOMAIN);
    update_actions(&mut hasher, actions);
    hasher.update(predecessor);
    hasher.update(salt);
    OperationId::new(finish(hasher))
}

/// Salt unique to one governor: the description hash XOR the governor address,
/// left-aligned. Two governors sharing one executor never collide on the same
/// operation id.
pub fn timelock_salt(description_hash: &Digest32, governor: &Address) -> Digest32 {
    let mut salt = *description_hash;
    for (byte, g) in salt.iter_mut().zip(governor.as_bytes()) {
        *byte ^= g;
    }
    salt
}
