//! Function allow-list and the hand-off to the delayed executor.

use std::collections::BTreeSet;

use agora_interfaces::{DelayedExecutor, ExecutorRole};
use agora_types::{Action, Address, Digest32, OperationId, Selector};
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;

/// Executor batches are never chained.
pub const NO_PREDECESSOR: Digest32 = [0u8; 32];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionGate {
    /// `(target, selector)` pairs; the same selector on two targets is two entries.
    whitelist: BTreeSet<(Address, Selector)>,
    restriction_enabled: bool,
}

impl ExecutionGate {
    pub fn new(restriction_enabled: bool) -> Self {
        Self {
            whitelist: BTreeSet::new(),
            restriction_enabled,
        }
    }

    pub fn is_whitelisted(&self, target: &Address, selector: &Selector) -> bool {
        self.whitelist.contains(&(*target, *selector))
    }

    pub fn set_whitelisted(&mut self, target: Address, selector: Selector, allowed: bool) {
        if allowed {
            self.whitelist.insert((target, selector));
        } else {
            self.whitelist.remove(&(target, selector));
        }
    }

    pub fn is_restriction_enabled(&self) -> bool {
        self.restriction_enabled
    }

    pub fn set_restriction_enabled(&mut self, enabled: bool) {
        self.restriction_enabled = enabled;
    }

    /// With restriction on, every action must call a whitelisted function.
    pub fn check_actions(&self, actions: &[Action]) -> Result<(), GovernanceError> {
        if !self.restriction_enabled {
            return Ok(());
        }
        for action in actions {
            let selector = action
                .selector()
                .ok_or(GovernanceError::MissingSelector(action.target))?;
            if !self.is_whitelisted(&action.target, &selector) {
                return Err(GovernanceError::FunctionNotWhitelisted {
                    target: action.target,
                    selector: selector.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Executor operation id for a proposal queued by `governor`.
    pub fn operation_id(actions: &[Action], description_hash: &Digest32, governor: &Address) -> OperationId {
        let salt = agora_crypto::timelock_salt(description_hash, governor);
        agora_crypto::operation_id(actions, &NO_PREDECESSOR, &salt)
    }
}

/// Fail unless `governor` is the only holder of every executor role.
pub fn verify_executor_roles(executor: &dyn DelayedExecutor, governor: &Address) -> Result<(), GovernanceError> {
    for role in ExecutorRole::ALL {
        let holders = executor.role_members(role);
        if holders.as_slice() != [*governor].as_slice() {
            return Err(GovernanceError::ExecutorRolesNotExclusive { role, holders });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(target: u8, selector: [u8; 4]) -> Action {
        let mut calldata = selector.to_vec();
        calldata.extend_from_slice(&[0u8; 32]);
        Action::new(Address::repeat_byte(target), 0, calldata)
    }

    #[test]
    fn unrestricted_gate_accepts_anything() {
        let gate = ExecutionGate::new(false);
        let raw = Action::new(Address::repeat_byte(1), 5, vec![]);
        assert!(gate.check_actions(&[raw, call(2, [1, 2, 3, 4])]).is_ok());
    }

    #[test]
    fn selectors_are_scoped_per_target() {
        let mut gate = ExecutionGate::new(true);
        let sel = Selector::new([0xa9, 0x05, 0x9c, 0xbb]);
        gate.set_whitelisted(Address::repeat_byte(1), sel, true);

        assert!(gate.check_actions(&[call(1, *sel.as_bytes())]).is_ok());
        assert!(matches!(
            gate.check_actions(&[call(2, *sel.as_bytes())]),
            Err(GovernanceError::FunctionNotWhitelisted { .. })
        ));

        gate.set_whitelisted(Address::repeat_byte(1), sel, false);
        assert!(!gate.is_whitelisted(&Address::repeat_byte(1), &sel));
    }

    #[test]
    fn short_calldata_rejected_when_restricted() {
        let gate = ExecutionGate::new(true);
        let short = Action::new(Address::repeat_byte(1), 0, vec![1, 2, 3]);
        assert!(matches!(
            gate.check_actions(&[short]),
            Err(GovernanceError::MissingSelector(_))
        ));
        assert!(gate.check_actions(&[]).is_ok());
    }

    #[test]
    fn operation_id_is_salted_by_governor() {
        let actions = vec![call(1, [1, 1, 1, 1])];
        let desc = agora_crypto::hash_description("upgrade");
        let a = ExecutionGate::operation_id(&actions, &desc, &Address::repeat_byte(1));
        let b = ExecutionGate::operation_id(&actions, &desc, &Address::repeat_byte(2));
        assert_ne!(a, b);
    }
}
