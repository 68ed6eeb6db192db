//! Vote receipts, bucket totals, quorum history and vote weighting.

use std::collections::BTreeMap;

use agora_types::{Address, BlockNumber, ProposalId, RoundId, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::checkpoint::Checkpoints;
use crate::error::GovernanceError;

/// Quorum numerators are percentages.
pub const QUORUM_DENOMINATOR: u128 = 100;

/// Decimals every quadratic weight is normalized to before the square root,
/// giving weights with 9 decimals of precision.
const QUADRATIC_BASE_DECIMALS: u32 = 18;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteType {
    Against,
    For,
    Abstain,
}

impl TryFrom<u8> for VoteType {
    type Error = GovernanceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Against),
            1 => Ok(Self::For),
            2 => Ok(Self::Abstain),
            other => Err(GovernanceError::InvalidVoteType(other)),
        }
    }
}

/// How raw voting power becomes vote weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightingMode {
    Linear,
    Quadratic,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub support: VoteType,
    pub weight: u128,
    /// Raw voting power at the snapshot, before weighting.
    pub power: TokenAmount,
    pub reason: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalVotes {
    pub against: u128,
    pub for_votes: u128,
    pub abstain: u128,
}

impl ProposalVotes {
    pub fn total(&self) -> u128 {
        self.against
            .saturating_add(self.for_votes)
            .saturating_add(self.abstain)
    }

    fn add(&mut self, support: VoteType, weight: u128) {
        let bucket = match support {
            VoteType::Against => &mut self.against,
            VoteType::For => &mut self.for_votes,
            VoteType::Abstain => &mut self.abstain,
        };
        *bucket = bucket.saturating_add(weight);
    }
}

/// Integer square root (floor), Newton's method.
pub fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = 1u128 << ((128 - n.leading_zeros()).div_ceil(2));
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// `floor(sqrt(raw / 10^decimals) * 10^9)`, computed without loss by
/// normalizing to 18 decimals first.
pub fn quadratic_weight(raw: TokenAmount, decimals: u8) -> u128 {
    let decimals = decimals as u32;
    let normalized = if decimals <= QUADRATIC_BASE_DECIMALS {
        raw.raw()
            .saturating_mul(10u128.pow(QUADRATIC_BASE_DECIMALS - decimals))
    } else {
        raw.raw() / 10u128.saturating_pow(decimals - QUADRATIC_BASE_DECIMALS)
    };
    isqrt(normalized)
}

/// Apply `mode` to raw voting power.
pub fn weigh(raw: TokenAmount, mode: WeightingMode, decimals: u8) -> u128 {
    match mode {
        WeightingMode::Linear => raw.raw(),
        WeightingMode::Quadratic => quadratic_weight(raw, decimals),
    }
}

/// Settings that live alongside the receipts and are persisted with them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallySettings {
    /// Round id -> quadratic disabled, recorded when the toggle flips.
    pub quadratic_by_round: BTreeMap<RoundId, bool>,
    pub quadratic_disabled: bool,
    pub quorum_numerator: Checkpoints,
}

#[derive(Clone, Debug)]
pub struct VoteTally {
    receipts: BTreeMap<(ProposalId, Address), VoteReceipt>,
    votes: BTreeMap<ProposalId, ProposalVotes>,
    /// Sum of raw voting power cast per proposal, whatever the weighting.
    turnout: BTreeMap<ProposalId, TokenAmount>,
    settings: TallySettings,
}

impl VoteTally {
    /// A tally with the initial quorum numerator in force from `block` and
    /// the initial quadratic setting in force from round 0.
    pub fn new(quorum_numerator: u128, quadratic_disabled: bool, block: BlockNumber) -> Self {
        let mut quadratic_by_round = BTreeMap::new();
        quadratic_by_round.insert(0, quadratic_disabled);
        Self {
            receipts: BTreeMap::new(),
            votes: BTreeMap::new(),
            turnout: BTreeMap::new(),
            settings: TallySettings {
                quadratic_by_round,
                quadratic_disabled,
                quorum_numerator: Checkpoints::with_initial(block, quorum_numerator),
            },
        }
    }

    pub fn has_voted(&self, proposal: &ProposalId, voter: &Address) -> bool {
        self.receipts.contains_key(&(*proposal, *voter))
    }

    pub fn receipt(&self, proposal: &ProposalId, voter: &Address) -> Option<&VoteReceipt> {
        self.receipts.get(&(*proposal, *voter))
    }

    pub fn proposal_votes(&self, proposal: &ProposalId) -> ProposalVotes {
        self.votes.get(proposal).copied().unwrap_or_default()
    }

    /// Raw voting power cast on `proposal`, abstentions included.
    pub fn turnout(&self, proposal: &ProposalId) -> TokenAmount {
        self.turnout.get(proposal).copied().unwrap_or(TokenAmount::ZERO)
    }

    /// Record a first-time vote and add its weight to the bucket.
    pub fn record(
        &mut self,
        proposal: ProposalId,
        voter: Address,
        receipt: VoteReceipt,
    ) -> Result<(), GovernanceError> {
        if self.has_voted(&proposal, &voter) {
            return Err(GovernanceError::AlreadyVoted(voter));
        }
        self.votes
            .entry(proposal)
            .or_default()
            .add(receipt.support, receipt.weight);
        let turnout = self.turnout.entry(proposal).or_insert(TokenAmount::ZERO);
        *turnout = turnout.saturating_add(receipt.power);
        self.receipts.insert((proposal, voter), receipt);
        Ok(())
    }

    /// Quorum is measured in raw token power in both weighting modes.
    pub fn quorum_reached(&self, proposal: &ProposalId, quorum: TokenAmount) -> bool {
        self.turnout(proposal) >= quorum
    }

    pub fn vote_succeeded(&self, proposal: &ProposalId) -> bool {
        let votes = self.proposal_votes(proposal);
        votes.for_votes > votes.against
    }

    // ── Quadratic setting ──────────────────────────────────────────────

    pub fn is_quadratic_disabled_for_round(&self, round: RoundId) -> bool {
        self.settings
            .quadratic_by_round
            .range(..=round)
            .next_back()
            .map(|(_, &disabled)| disabled)
            .unwrap_or(false)
    }

    pub fn is_quadratic_disabled(&self) -> bool {
        self.settings.quadratic_disabled
    }

    pub fn mode_for_round(&self, round: RoundId) -> WeightingMode {
        if self.is_quadratic_disabled_for_round(round) {
            WeightingMode::Linear
        } else {
            WeightingMode::Quadratic
        }
    }

    /// Flip the global setting, effective from `round`. Returns the new
    /// disabled value.
    pub fn toggle_quadratic(&mut self, round: RoundId) -> bool {
        let disabled = !self.settings.quadratic_disabled;
        self.settings.quadratic_disabled = disabled;
        self.settings.quadratic_by_round.insert(round, disabled);
        disabled
    }

    // ── Quorum numerator ───────────────────────────────────────────────

    pub fn quorum_numerator(&self) -> u128 {
        self.settings.quorum_numerator.latest()
    }

    pub fn quorum_numerator_at(&self, block: BlockNumber) -> u128 {
        self.settings.quorum_numerator.upper_lookup(block)
    }

    pub fn update_quorum_numerator(&mut self, block: BlockNumber, numerator: u128) -> Result<(), GovernanceError> {
        if numerator > QUORUM_DENOMINATOR {
            return Err(GovernanceError::InvalidQuorumNumerator(numerator));
        }
        let _ = self.settings.quorum_numerator.push(block, numerator);
        Ok(())
    }

    // ── Persistence ────────────────────────────────────────────────────

    pub fn settings(&self) -> &TallySettings {
        &self.settings
    }

    pub fn receipts(&self) -> impl Iterator<Item = (&(ProposalId, Address), &VoteReceipt)> {
        self.receipts.iter()
    }

    /// Rebuild from stored receipts; bucket totals are recomputed from them.
    pub fn restore(
        receipts: impl IntoIterator<Item = (ProposalId, Address, VoteReceipt)>,
        settings: TallySettings,
    ) -> Result<Self, GovernanceError> {
        let mut tally = Self {
            receipts: BTreeMap::new(),
            votes: BTreeMap::new(),
            turnout: BTreeMap::new(),
            settings,
        };
        for (proposal, voter, receipt) in receipts {
            tally.record(proposal, voter, receipt)?;
        }
        Ok(tally)
    }
}
