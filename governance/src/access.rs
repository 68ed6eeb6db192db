//! Role-based access control for governor administration.
//!
//! A role held by [`Address::ZERO`] is open: every caller passes the check.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use agora_types::Address;
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Grants and revokes roles; cancels non-pending proposals.
    Admin,
    /// Changes thresholds, quorum, whitelist and quadratic toggle.
    SettingsManager,
    /// Moves executed standard proposals through development tracking.
    ProposalStateManager,
    /// Triggers execution of queued proposals.
    Executor,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Self::Admin,
        Self::SettingsManager,
        Self::ProposalStateManager,
        Self::Executor,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "admin",
            Self::SettingsManager => "settings-manager",
            Self::ProposalStateManager => "proposal-state-manager",
            Self::Executor => "executor",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    members: BTreeMap<Role, BTreeSet<Address>>,
}

impl AccessControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.members
            .get(&role)
            .is_some_and(|holders| holders.contains(account))
    }

    /// Whether the role has been opened to everyone.
    pub fn is_open(&self, role: Role) -> bool {
        self.has_role(role, &Address::ZERO)
    }

    pub fn check(&self, role: Role, account: &Address) -> Result<(), GovernanceError> {
        if self.has_role(role, account) || self.is_open(role) {
            Ok(())
        } else {
            Err(GovernanceError::MissingRole { role, account: *account })
        }
    }

    /// Returns `true` if the account did not already hold the role.
    pub fn grant(&mut self, role: Role, account: Address) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    /// Returns `true` if the account held the role.
    pub fn revoke(&mut self, role: Role, account: &Address) -> bool {
        self.members
            .get_mut(&role)
            .is_some_and(|holders| holders.remove(account))
    }

    pub fn members(&self, role: Role) -> Vec<Address> {
        self.members
            .get(&role)
            .map(|holders| holders.iter().copied().collect())
            .unwrap_or_default()
    }
}
