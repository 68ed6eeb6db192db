//! Composite binary keys.

use agora_types::{Address, ProposalId};

use crate::StoreError;

/// Length of a `(proposal id, account)` key.
pub const COMPOSITE_KEY_LEN: usize = 32 + Address::LEN;

/// `proposal id ‖ account`. Sorting by key groups every entry of a proposal together.
pub fn composite_key(id: &ProposalId, account: &Address) -> [u8; COMPOSITE_KEY_LEN] {
    let mut key = [0u8; COMPOSITE_KEY_LEN];
    key[..32].copy_from_slice(id.as_bytes());
    key[32..].copy_from_slice(account.as_bytes());
    key
}

/// Inverse of [`composite_key`].
pub fn split_composite_key(key: &[u8]) -> Result<(ProposalId, Address), StoreError> {
    if key.len() != COMPOSITE_KEY_LEN {
        return Err(StoreError::Corruption(format!(
            "composite key has length {}, expected {}",
            key.len(),
            COMPOSITE_KEY_LEN
        )));
    }
    let id = ProposalId::from_slice(&key[..32]).map_err(|e| StoreError::Corruption(e.to_string()))?;
    let account = Address::from_slice(&key[32..]).map_err(|e| StoreError::Corruption(e.to_string()))?;
    Ok((id, account))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_key_roundtrip() {
        let id = ProposalId::new([7u8; 32]);
        let account = Address::repeat_byte(3);
        let key = composite_key(&id, &account);
        assert_eq!(split_composite_key(&key).unwrap(), (id, account));
    }

    #[test]
    fn short_key_is_corruption() {
        assert!(matches!(split_composite_key(&[0u8; 10]), Err(StoreError::Corruption(_))));
    }
}
