//! Nullable delayed executor.
//!
//! Operation ids are computed exactly as a real executor would, so the
//! governor's own `operation_id` matches what gets scheduled here. Executed
//! actions are recorded for assertions; targets can be rigged to fail.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use agora_interfaces::{ChainClock, DelayedExecutor, ExecutorError, ExecutorRole};
use agora_types::{Action, Address, Digest32, OperationId, Timestamp};

use crate::clock::NullChainClock;

#[derive(Clone, Copy, Debug)]
struct Operation {
    ready_at: Timestamp,
    done: bool,
}

pub struct NullTimelock {
    address: Address,
    clock: Arc<NullChainClock>,
    min_delay: u64,
    roles: Mutex<HashMap<ExecutorRole, Vec<Address>>>,
    operations: Mutex<HashMap<OperationId, Operation>>,
    executed: Mutex<Vec<Action>>,
    failing_targets: Mutex<HashSet<Address>>,
}

impl NullTimelock {
    /// A timelock whose three roles are held by `governor` alone.
    pub fn new(address: Address, clock: Arc<NullChainClock>, min_delay: u64, governor: Address) -> Self {
        let roles = ExecutorRole::ALL
            .iter()
            .map(|&role| (role, vec![governor]))
            .collect();
        Self {
            address,
            clock,
            min_delay,
            roles: Mutex::new(roles),
            operations: Mutex::new(HashMap::new()),
            executed: Mutex::new(Vec::new()),
            failing_targets: Mutex::new(HashSet::new()),
        }
    }

    pub fn grant_role(&self, role: ExecutorRole, account: Address) {
        self.roles.lock().unwrap().entry(role).or_default().push(account);
    }

    pub fn revoke_role(&self, role: ExecutorRole, account: &Address) {
        if let Some(holders) = self.roles.lock().unwrap().get_mut(&role) {
            holders.retain(|a| a != account);
        }
    }

    /// Calls to `target` fail from now on.
    pub fn fail_calls_to(&self, target: Address) {
        self.failing_targets.lock().unwrap().insert(target);
    }

    /// Every action executed so far, in order.
    pub fn executed_actions(&self) -> Vec<Action> {
        self.executed.lock().unwrap().clone()
    }

    fn require(&self, role: ExecutorRole, caller: &Address) -> Result<(), ExecutorError> {
        let roles = self.roles.lock().unwrap();
        let holders = roles.get(&role).map(Vec::as_slice).unwrap_or(&[]);
        if holders.contains(caller) || holders.contains(&Address::ZERO) {
            Ok(())
        } else {
            Err(ExecutorError::Unauthorized { caller: *caller, role })
        }
    }
}

impl DelayedExecutor for NullTimelock {
    fn address(&self) -> Address {
        self.address
    }

    fn min_delay(&self) -> u64 {
        self.min_delay
    }

    fn schedule_batch(
        &self,
        caller: &Address,
        actions: &[Action],
        predecessor: &Digest32,
        salt: &Digest32,
        delay: u64,
    ) -> Result<OperationId, ExecutorError> {
        self.require(ExecutorRole::Proposer, caller)?;
        if delay < self.min_delay {
            return Err(ExecutorError::InsufficientDelay {
                requested: delay,
                minimum: self.min_delay,
            });
        }
        let id = agora_crypto::operation_id(actions, predecessor, salt);
        let mut operations = self.operations.lock().unwrap();
        if operations.contains_key(&id) {
            return Err(ExecutorError::AlreadyScheduled(id));
        }
        let ready_at = self.clock.timestamp().plus_secs(delay);
        operations.insert(id, Operation { ready_at, done: false });
        Ok(id)
    }

    fn execute_batch(
        &self,
        caller: &Address,
        actions: &[Action],
        predecessor: &Digest32,
        salt: &Digest32,
    ) -> Result<(), ExecutorError> {
        self.require(ExecutorRole::Executor, caller)?;
        let id = agora_crypto::operation_id(actions, predecessor, salt);
        if !self.is_operation_ready(&id) {
            return Err(ExecutorError::NotReady(id));
        }
        {
            let failing = self.failing_targets.lock().unwrap();
            if let Some(action) = actions.iter().find(|a| failing.contains(&a.target)) {
                return Err(ExecutorError::CallFailed {
                    target: action.target,
                    reason: "call reverted".to_string(),
                });
            }
        }
        if let Some(op) = self.operations.lock().unwrap().get_mut(&id) {
            op.done = true;
        }
        self.executed.lock().unwrap().extend_from_slice(actions);
        Ok(())
    }

    fn cancel(&self, caller: &Address, id: &OperationId) -> Result<(), ExecutorError> {
        self.require(ExecutorRole::Canceller, caller)?;
        if !self.is_operation_pending(id) {
            return Err(ExecutorError::NotPending(*id));
        }
        self.operations.lock().unwrap().remove(id);
        Ok(())
    }

    fn is_operation_pending(&self, id: &OperationId) -> bool {
        self.operations
            .lock()
            .unwrap()
            .get(id)
            .is_some_and(|op| !op.done)
    }

    fn is_operation_ready(&self, id: &OperationId) -> bool {
        let now = self.clock.timestamp();
        self.operations
            .lock()
            .unwrap()
            .get(id)
            .is_some_and(|op| !op.done && now >= op.ready_at)
    }

    fn is_operation_done(&self, id: &OperationId) -> bool {
        self.operations
            .lock()
            .unwrap()
            .get(id)
            .is_some_and(|op| op.done)
    }

    fn role_members(&self, role: ExecutorRole) -> Vec<Address> {
        self.roles.lock().unwrap().get(&role).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Arc<NullChainClock>, NullTimelock, Address) {
        let clock = Arc::new(NullChainClock::new(1, 1_000));
        let governor = Address::repeat_byte(0x60);
        let timelock = NullTimelock::new(Address::repeat_byte(0x71), Arc::clone(&clock), 60, governor);
        (clock, timelock, governor)
    }

    #[test]
    fn schedule_wait_execute() {
        let (clock, timelock, governor) = setup();
        let actions = vec![Action::new(Address::repeat_byte(3), 0, vec![1, 2, 3, 4])];
        let salt = [5u8; 32];
        let id = timelock.schedule_batch(&governor, &actions, &[0u8; 32], &salt, 60).unwrap();

        assert!(timelock.is_operation_pending(&id));
        assert!(!timelock.is_operation_ready(&id));
        assert_eq!(
            timelock.execute_batch(&governor, &actions, &[0u8; 32], &salt),
            Err(ExecutorError::NotReady(id))
        );

        clock.advance_time(60);
        assert!(timelock.is_operation_ready(&id));
        timelock.execute_batch(&governor, &actions, &[0u8; 32], &salt).unwrap();
        assert!(timelock.is_operation_done(&id));
        assert_eq!(timelock.executed_actions(), actions);
    }

    #[test]
    fn rejects_outsiders_and_short_delays() {
        let (_clock, timelock, governor) = setup();
        let outsider = Address::repeat_byte(0xee);
        assert!(matches!(
            timelock.schedule_batch(&outsider, &[], &[0u8; 32], &[0u8; 32], 60),
            Err(ExecutorError::Unauthorized { .. })
        ));
        assert!(matches!(
            timelock.schedule_batch(&governor, &[], &[0u8; 32], &[0u8; 32], 1),
            Err(ExecutorError::InsufficientDelay { .. })
        ));
    }

    #[test]
    fn cancel_removes_pending_operation() {
        let (_clock, timelock, governor) = setup();
        let id = timelock.schedule_batch(&governor, &[], &[0u8; 32], &[1u8; 32], 60).unwrap();
        timelock.cancel(&governor, &id).unwrap();
        assert!(!timelock.is_operation_pending(&id));
        assert_eq!(timelock.cancel(&governor, &id), Err(ExecutorError::NotPending(id)));
    }
}
