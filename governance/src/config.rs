//! Per-type proposal settings and governor configuration with TOML file support.

use std::fmt;
use std::path::PathBuf;

use agora_types::{Address, TokenAmount};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::GovernanceError;

/// Basis-point denominator for deposit thresholds.
pub const BPS_DENOMINATOR: u32 = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Kind of proposal. Grants follow their own milestone process, so the
/// development-tracking transitions are reserved for `Standard`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalType {
    Standard,
    Grant,
}

impl ProposalType {
    pub const ALL: [ProposalType; 2] = [Self::Standard, Self::Grant];

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Standard => 0,
            Self::Grant => 1,
        }
    }
}

impl TryFrom<u8> for ProposalType {
    type Error = GovernanceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Standard),
            1 => Ok(Self::Grant),
            other => Err(GovernanceError::InvalidProposalType(other)),
        }
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Grant => f.write_str("grant"),
        }
    }
}

/// Thresholds for one proposal type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalTypeConfig {
    /// Deposit threshold as basis points of total supply.
    pub deposit_threshold_bps: u32,
    /// Upper bound on the deposit threshold, in raw token units.
    pub deposit_threshold_cap: TokenAmount,
    /// Minimum raw voting power needed to cast a vote.
    pub voting_threshold: TokenAmount,
    /// Minimum oracle level needed to propose.
    pub required_proposer_level: u8,
}

impl ProposalTypeConfig {
    /// `min(total_supply * bps / 10000, cap)`.
    pub fn deposit_threshold(&self, total_supply: TokenAmount) -> TokenAmount {
        total_supply
            .mul_div(self.deposit_threshold_bps as u128, BPS_DENOMINATOR as u128)
            .min(self.deposit_threshold_cap)
    }

    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.deposit_threshold_bps > BPS_DENOMINATOR {
            return Err(GovernanceError::InvalidDepositThreshold(self.deposit_threshold_bps));
        }
        Ok(())
    }
}

impl Default for ProposalTypeConfig {
    fn default() -> Self {
        Self {
            deposit_threshold_bps: 200,
            deposit_threshold_cap: TokenAmount::from_tokens(5_000_000),
            voting_threshold: TokenAmount::from_tokens(1),
            required_proposer_level: 1,
        }
    }
}

/// Per-type thresholds, one entry per [`ProposalType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeConfigs {
    #[serde(default)]
    pub standard: ProposalTypeConfig,
    #[serde(default = "default_grant_config")]
    pub grant: ProposalTypeConfig,
}

impl TypeConfigs {
    pub fn get(&self, proposal_type: ProposalType) -> &ProposalTypeConfig {
        match proposal_type {
            ProposalType::Standard => &self.standard,
            ProposalType::Grant => &self.grant,
        }
    }

    pub fn get_mut(&mut self, proposal_type: ProposalType) -> &mut ProposalTypeConfig {
        match proposal_type {
            ProposalType::Standard => &mut self.standard,
            ProposalType::Grant => &mut self.grant,
        }
    }
}

impl Default for TypeConfigs {
    fn default() -> Self {
        Self {
            standard: ProposalTypeConfig::default(),
            grant: default_grant_config(),
        }
    }
}

/// Initial holders of each governor role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignments {
    #[serde(default)]
    pub admins: Vec<Address>,
    #[serde(default)]
    pub settings_managers: Vec<Address>,
    #[serde(default)]
    pub proposal_state_managers: Vec<Address>,
    /// Accounts allowed to trigger execution. `0x000…0` opens execution to anyone.
    #[serde(default)]
    pub executors: Vec<Address>,
}

/// Configuration for a governor instance.
///
/// Can be loaded from a TOML file via [`GovernorConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Address the governor acts as towards the token and the delayed executor.
    #[serde(default = "default_governor_address")]
    pub governor_address: Address,

    /// Minimum blocks between proposal creation and its voting snapshot.
    #[serde(default = "default_min_voting_delay")]
    pub min_voting_delay: u64,

    /// Initial quorum numerator (percent of past total supply).
    #[serde(default = "default_quorum_numerator")]
    pub quorum_numerator: u64,

    /// Whether proposal actions must be whitelisted.
    #[serde(default = "default_true")]
    pub function_restriction_enabled: bool,

    /// Start with quadratic weighting switched off.
    #[serde(default)]
    pub quadratic_voting_disabled: bool,

    #[serde(default)]
    pub proposal_types: TypeConfigs,

    #[serde(default)]
    pub roles: RoleAssignments,

    /// Data directory for the LMDB store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Defaults ───────────────────────────────────────────────────────────

fn default_governor_address() -> Address {
    Address::repeat_byte(0x60)
}

fn default_min_voting_delay() -> u64 {
    1
}

fn default_quorum_numerator() -> u64 {
    4
}

fn default_true() -> bool {
    true
}

fn default_grant_config() -> ProposalTypeConfig {
    ProposalTypeConfig {
        deposit_threshold_bps: 100,
        deposit_threshold_cap: TokenAmount::from_tokens(2_000_000),
        voting_threshold: TokenAmount::from_tokens(1),
        required_proposer_level: 2,
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data/agora")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernorConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.governor_address.is_zero() {
            return Err(ConfigError::Invalid("governor_address must not be zero".into()));
        }
        if self.quorum_numerator > 100 {
            return Err(ConfigError::Invalid(format!(
                "quorum_numerator {} exceeds 100",
                self.quorum_numerator
            )));
        }
        for proposal_type in ProposalType::ALL {
            let bps = self.proposal_types.get(proposal_type).deposit_threshold_bps;
            if bps > BPS_DENOMINATOR {
                return Err(ConfigError::Invalid(format!(
                    "{} deposit_threshold_bps {} exceeds {}",
                    proposal_type, bps, BPS_DENOMINATOR
                )));
            }
        }
        if self.roles.admins.is_empty() {
            return Err(ConfigError::Invalid("at least one admin is required".into()));
        }
        Ok(())
    }
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            governor_address: default_governor_address(),
            min_voting_delay: default_min_voting_delay(),
            quorum_numerator: default_quorum_numerator(),
            function_restriction_enabled: default_true(),
            quadratic_voting_disabled: false,
            proposal_types: TypeConfigs::default(),
            roles: RoleAssignments::default(),
            data_dir: default_data_dir(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
