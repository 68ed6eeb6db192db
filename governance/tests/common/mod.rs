//! Shared fixture: a governor wired to nullable collaborators.
//!
//! Supply is 100 000 tokens (alice 30k, bob 30k, carol 40k), so the
//! standard deposit threshold is min(2%, 1000 tokens) = 1000 tokens and
//! the quorum at 4% is 4000 tokens. Round 1 starts at block 1 and lasts
//! `VOTING_PERIOD` blocks.

#![allow(dead_code)]

use std::sync::Arc;

use agora_governance::{
    Externals, Governor, GovernorConfig, NewProposal, ProposalTypeConfig, RoleAssignments, TypeConfigs,
};
use agora_interfaces::{ChainClock, GovernanceToken, RoundClock};
use agora_nullables::{NullChainClock, NullLevelOracle, NullRoundClock, NullTimelock, NullToken};
use agora_types::{Address, ProposalId, RoundId, TokenAmount};

pub const VOTING_PERIOD: u64 = 20;
pub const TIMELOCK_DELAY: u64 = 3_600;

pub const GOVERNOR: Address = Address::repeat_byte(0x60);
pub const TIMELOCK: Address = Address::repeat_byte(0x71);
pub const ADMIN: Address = Address::repeat_byte(0xad);
pub const ALICE: Address = Address::repeat_byte(0xa1);
pub const BOB: Address = Address::repeat_byte(0xb0);
pub const CAROL: Address = Address::repeat_byte(0xc0);
pub const DAVE: Address = Address::repeat_byte(0xd0);
pub const TARGET: Address = Address::repeat_byte(0x7a);

pub fn tokens(n: u128) -> TokenAmount {
    TokenAmount::from_tokens(n)
}

pub fn test_config() -> GovernorConfig {
    let standard = ProposalTypeConfig {
        deposit_threshold_bps: 200,
        deposit_threshold_cap: tokens(1_000),
        voting_threshold: tokens(1),
        required_proposer_level: 1,
    };
    GovernorConfig {
        governor_address: GOVERNOR,
        min_voting_delay: 1,
        quorum_numerator: 4,
        function_restriction_enabled: false,
        quadratic_voting_disabled: false,
        proposal_types: TypeConfigs {
            standard,
            grant: ProposalTypeConfig {
                required_proposer_level: 2,
                ..standard
            },
        },
        roles: RoleAssignments {
            admins: vec![ADMIN],
            settings_managers: vec![ADMIN],
            proposal_state_managers: vec![ADMIN],
            executors: vec![Address::ZERO],
        },
        ..GovernorConfig::default()
    }
}

pub struct Harness {
    pub chain: Arc<NullChainClock>,
    pub token: Arc<NullToken>,
    pub rounds: Arc<NullRoundClock>,
    pub levels: Arc<NullLevelOracle>,
    pub timelock: Arc<NullTimelock>,
    pub governor: Governor,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: GovernorConfig) -> Self {
        let chain = Arc::new(NullChainClock::new(1, 1_700_000_000));
        let token = Arc::new(NullToken::new(Arc::clone(&chain), 18));
        let rounds = Arc::new(NullRoundClock::new(
            Arc::clone(&chain),
            Arc::clone(&token),
            VOTING_PERIOD,
        ));
        let levels = Arc::new(NullLevelOracle::new(5));
        let timelock = Arc::new(NullTimelock::new(
            TIMELOCK,
            Arc::clone(&chain),
            TIMELOCK_DELAY,
            config.governor_address,
        ));

        token.mint(&ALICE, tokens(30_000));
        token.mint(&BOB, tokens(30_000));
        token.mint(&CAROL, tokens(40_000));
        levels.set_level(ALICE, 1);
        levels.set_level(BOB, 2);
        rounds.start_new_round();

        let governor = Governor::new(&config, Self::externals_of(&chain, &token, &rounds, &levels, &timelock))
            .expect("governor should build");
        Self {
            chain,
            token,
            rounds,
            levels,
            timelock,
            governor,
        }
    }

    fn externals_of(
        chain: &Arc<NullChainClock>,
        token: &Arc<NullToken>,
        rounds: &Arc<NullRoundClock>,
        levels: &Arc<NullLevelOracle>,
        timelock: &Arc<NullTimelock>,
    ) -> Externals {
        Externals {
            chain: chain.clone(),
            rounds: rounds.clone(),
            token: token.clone(),
            levels: levels.clone(),
            executor: timelock.clone(),
        }
    }

    pub fn externals(&self) -> Externals {
        Self::externals_of(&self.chain, &self.token, &self.rounds, &self.levels, &self.timelock)
    }

    pub fn block(&self) -> u64 {
        self.chain.current_block()
    }

    pub fn next_round(&self) -> RoundId {
        self.rounds.current_round_id() + 1
    }

    /// A standard proposal with one call, targeting the next round.
    pub fn request(&self, description: &str) -> NewProposal {
        NewProposal::standard(description, self.next_round()).with_action(
            TARGET,
            0,
            vec![0xde, 0xad, 0xbe, 0xef, 0x01],
        )
    }

    pub fn propose(&mut self, proposer: Address, description: &str) -> ProposalId {
        let request = self.request(description);
        self.governor.propose(&proposer, request).expect("propose should succeed")
    }

    pub fn approve(&self, owner: Address, amount: TokenAmount) {
        self.token.approve(&owner, &GOVERNOR, amount).expect("approve");
    }

    pub fn deposit(&mut self, depositor: Address, amount: TokenAmount, id: &ProposalId) {
        self.approve(depositor, amount);
        self.governor.deposit(&depositor, amount, id).expect("deposit should succeed");
    }

    /// Let the current round run out, then start the next one.
    pub fn start_next_round(&self) -> RoundId {
        let current = self.rounds.current_round_id();
        if let Some(deadline) = self.rounds.round_deadline(current) {
            self.chain.advance_to(deadline + 1);
        }
        self.rounds.start_new_round()
    }

    /// Start the proposal's round and move one block past its snapshot.
    pub fn open_voting(&self, id: &ProposalId) {
        let target = self.governor.proposal(id).expect("proposal").start_round;
        while self.rounds.current_round_id() < target {
            self.start_next_round();
        }
        self.chain.advance_blocks(1);
    }

    pub fn close_voting(&self, id: &ProposalId) {
        let deadline = self.governor.proposal_deadline(id).expect("deadline");
        self.chain.advance_to(deadline + 1);
    }

    /// Drive a fresh proposal from `alice` to Succeeded: carol funds it,
    /// alice and bob vote for it.
    pub fn succeeded_proposal(&mut self, description: &str) -> ProposalId {
        let id = self.propose(ALICE, description);
        self.deposit(CAROL, tokens(1_000), &id);
        self.open_voting(&id);
        self.governor
            .cast_vote(&ALICE, &id, agora_governance::VoteType::For)
            .expect("alice votes");
        self.governor
            .cast_vote(&BOB, &id, agora_governance::VoteType::For)
            .expect("bob votes");
        self.close_voting(&id);
        id
    }
}
