//! Persist a governor mid-flight and restore it against the same collaborators.

mod common;

use agora_governance::{
    read_deposit_totals, read_proposals, GovernanceError, Governor, NewProposal, ProposalState, ProposalType, Role,
    VoteType,
};
use agora_nullables::NullStore;
use agora_store::{GovernanceStore, MetaStore, StoreError, CURRENT_SCHEMA_VERSION};
use agora_store_lmdb::LmdbEnvironment;
use agora_types::{ProposalId, Selector};
use common::*;

struct Scenario {
    queued: ProposalId,
    voting: ProposalId,
    pending: ProposalId,
}

/// One queued proposal, one still collecting votes and one pending with
/// split deposits, plus non-default settings.
fn build_scenario(h: &mut Harness) -> Scenario {
    let queued = h.succeeded_proposal("queued before restart");
    h.governor.queue(&DAVE, &queued).unwrap();

    let voting = h.propose(BOB, "voting across restart");
    h.deposit(ALICE, tokens(1_000), &voting);
    // one round further out, so it is still Pending once `voting` opens
    let later = h.next_round() + 1;
    let request = NewProposal::standard("pending across restart", later).with_action(TARGET, 0, vec![0xde, 0xad, 0xbe, 0xef]);
    let pending = h.governor.propose(&ALICE, request).unwrap();
    h.deposit(BOB, tokens(200), &pending);
    h.deposit(CAROL, tokens(300), &pending);

    h.open_voting(&voting);
    h.governor
        .cast_vote_with_reason(&CAROL, &voting, VoteType::Against, "too costly")
        .unwrap();

    h.governor.toggle_quadratic_voting(&ADMIN).unwrap();
    h.governor.update_quorum_numerator(&ADMIN, 10).unwrap();
    h.governor
        .set_whitelist_function(&ADMIN, TARGET, Selector::new([0xde, 0xad, 0xbe, 0xef]), true)
        .unwrap();
    h.governor.set_voting_threshold(&ADMIN, ProposalType::Grant, tokens(7)).unwrap();
    h.governor.grant_role(&ADMIN, Role::ProposalStateManager, BOB).unwrap();

    Scenario { queued, voting, pending }
}

fn assert_same_view(before: &Governor, after: &Governor, ids: &[ProposalId], blocks: std::ops::RangeInclusive<u64>) {
    for id in ids {
        assert_eq!(before.state(id).unwrap(), after.state(id).unwrap());
        assert_eq!(before.proposal(id).unwrap(), after.proposal(id).unwrap());
        assert_eq!(before.proposal_votes(id).unwrap(), after.proposal_votes(id).unwrap());
        assert_eq!(
            before.get_proposal_deposits(id).unwrap(),
            after.get_proposal_deposits(id).unwrap()
        );
        assert_eq!(
            before.proposal_deposit_reached(id).unwrap(),
            after.proposal_deposit_reached(id).unwrap()
        );
        for account in [ALICE, BOB, CAROL, DAVE] {
            assert_eq!(
                before.get_user_deposit(id, &account).unwrap(),
                after.get_user_deposit(id, &account).unwrap()
            );
            assert_eq!(
                before.receipt(id, &account).unwrap(),
                after.receipt(id, &account).unwrap()
            );
        }
    }
    for block in blocks {
        assert_eq!(before.quorum_numerator_at(block), after.quorum_numerator_at(block));
        for account in [ALICE, BOB, CAROL] {
            assert_eq!(
                before.deposit_voting_power(&account, block),
                after.deposit_voting_power(&account, block)
            );
        }
    }
    assert_eq!(before.address(), after.address());
    assert_eq!(before.is_quadratic_voting_disabled(), after.is_quadratic_voting_disabled());
    for round in 0..6 {
        assert_eq!(
            before.is_quadratic_voting_disabled_for_round(round),
            after.is_quadratic_voting_disabled_for_round(round)
        );
    }
    for proposal_type in ProposalType::ALL {
        assert_eq!(
            before.proposal_type_config(proposal_type),
            after.proposal_type_config(proposal_type)
        );
    }
    for role in Role::ALL {
        assert_eq!(before.has_role(role, &BOB), after.has_role(role, &BOB));
        assert_eq!(before.has_role(role, &ADMIN), after.has_role(role, &ADMIN));
    }
    let selector = Selector::new([0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(
        before.is_function_whitelisted(&TARGET, &selector),
        after.is_function_whitelisted(&TARGET, &selector)
    );
    assert_eq!(before.min_voting_delay(), after.min_voting_delay());
}

fn round_trip(h: &mut Harness, store: &(impl GovernanceStore + MetaStore)) {
    let scenario = build_scenario(h);
    h.governor.persist(store, store).unwrap();
    // a second persist overwrites in place
    h.governor.persist(store, store).unwrap();
    assert_eq!(store.get_schema_version().unwrap(), CURRENT_SCHEMA_VERSION);

    let mut restored = Governor::restore(h.externals(), store, store).unwrap();
    let ids = [scenario.queued, scenario.voting, scenario.pending];
    assert_same_view(&h.governor, &restored, &ids, 1..=h.block());
    assert_eq!(restored.state(&scenario.queued).unwrap(), ProposalState::Queued);

    // the restored governor carries on where the original stopped
    restored.cast_vote(&BOB, &scenario.voting, VoteType::For).unwrap();
    assert!(matches!(
        restored.cast_vote(&CAROL, &scenario.voting, VoteType::For),
        Err(GovernanceError::AlreadyVoted(_))
    ));
    h.chain.advance_time(TIMELOCK_DELAY);
    restored.execute(&DAVE, &scenario.queued).unwrap();
    assert_eq!(restored.state(&scenario.queued).unwrap(), ProposalState::Executed);
    restored.mark_as_in_development(&BOB, &scenario.queued).unwrap();
    assert_eq!(restored.state(&scenario.queued).unwrap(), ProposalState::InDevelopment);
}

#[test]
fn round_trip_in_memory() {
    let mut h = Harness::new();
    let store = NullStore::new();
    round_trip(&mut h, &store);
}

#[test]
fn round_trip_lmdb() {
    let dir = tempfile::tempdir().unwrap();
    let env = LmdbEnvironment::open(dir.path(), 1 << 20).unwrap();
    let mut h = Harness::new();
    let scenario = build_scenario(&mut h);

    h.governor
        .persist(&env.governance_store(), &env.meta_store())
        .unwrap();
    let restored = Governor::restore(h.externals(), &env.governance_store(), &env.meta_store()).unwrap();
    let ids = [scenario.queued, scenario.voting, scenario.pending];
    assert_same_view(&h.governor, &restored, &ids, 1..=h.block());
}

#[test]
fn lmdb_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::new();
    let scenario = build_scenario(&mut h);
    {
        let env = LmdbEnvironment::open(dir.path(), 1 << 20).unwrap();
        h.governor
            .persist(&env.governance_store(), &env.meta_store())
            .unwrap();
    }
    let env = LmdbEnvironment::open(dir.path(), 1 << 20).unwrap();
    let store = env.governance_store();

    let proposals = read_proposals(&store).unwrap();
    assert_eq!(proposals.len(), 3);
    let totals = read_deposit_totals(&store).unwrap();
    assert_eq!(totals[&scenario.pending], tokens(500));
    assert_eq!(totals[&scenario.voting], tokens(1_000));

    let restored = Governor::restore(h.externals(), &store, &env.meta_store()).unwrap();
    assert_eq!(restored.state(&scenario.voting).unwrap(), ProposalState::Active);
    assert_eq!(restored.state(&scenario.pending).unwrap(), ProposalState::Pending);
}

#[test]
fn withdrawn_deposits_persist_as_zero() {
    let mut h = Harness::new();
    let id = h.propose(ALICE, "withdrawn");
    h.deposit(BOB, tokens(40), &id);
    h.governor.cancel(&ALICE, &id).unwrap();
    h.governor.withdraw(&BOB, &id, &BOB).unwrap();

    let store = NullStore::new();
    h.governor.persist(&store, &store).unwrap();
    assert_eq!(store.get_deposit(&id, &BOB).unwrap(), Some(tokens(0)));

    let restored = Governor::restore(h.externals(), &store, &store).unwrap();
    assert_eq!(restored.state(&id).unwrap(), ProposalState::Cancelled);
    assert_eq!(restored.get_user_deposit(&id, &BOB).unwrap(), tokens(0));
}

#[test]
fn failed_save_keeps_previous_one() {
    let mut h = Harness::new();
    let first = h.propose(ALICE, "saved");
    let store = NullStore::new();
    h.governor.persist(&store, &store).unwrap();

    let second = h.propose(BOB, "never saved");
    h.deposit(CAROL, tokens(1_000), &first);
    store.reject_batches(true);
    assert!(matches!(
        h.governor.persist(&store, &store),
        Err(GovernanceError::Store(StoreError::Backend(_)))
    ));

    let restored = Governor::restore(h.externals(), &store, &store).unwrap();
    assert_eq!(restored.proposals().count(), 1);
    assert!(restored.proposal(&second).is_err());
    assert_eq!(restored.get_proposal_deposits(&first).unwrap(), tokens(0));
    assert!(store.get_deposit(&first, &CAROL).unwrap().is_none());

    store.reject_batches(false);
    h.governor.persist(&store, &store).unwrap();
    let restored = Governor::restore(h.externals(), &store, &store).unwrap();
    assert_eq!(restored.proposals().count(), 2);
    assert_eq!(restored.get_proposal_deposits(&first).unwrap(), tokens(1_000));
}

#[test]
fn restore_refuses_newer_schema() {
    let mut h = Harness::new();
    let store = NullStore::new();
    h.propose(ALICE, "from the future");
    h.governor.persist(&store, &store).unwrap();
    store.set_schema_version(CURRENT_SCHEMA_VERSION + 1).unwrap();

    let result = Governor::restore(h.externals(), &store, &store);
    assert!(matches!(
        result,
        Err(GovernanceError::Store(StoreError::SchemaTooNew { .. }))
    ));
    assert!(matches!(
        h.governor.persist(&store, &store),
        Err(GovernanceError::Store(StoreError::SchemaTooNew { .. }))
    ));
}

#[test]
fn restore_without_state_is_not_found() {
    let h = Harness::new();
    let store = NullStore::new();
    let err = Governor::restore(h.externals(), &store, &store).err().unwrap();
    assert_eq!(err.kind(), agora_governance::ErrorKind::NotFound);
}

#[test]
fn corrupted_proposal_record_detected() {
    let mut h = Harness::new();
    let id = h.propose(ALICE, "moved");
    let store = NullStore::new();
    h.governor.persist(&store, &store).unwrap();

    let bytes = store.get_proposal(&id).unwrap();
    store.put_proposal(&ProposalId::new([0x42; 32]), &bytes).unwrap();
    assert!(matches!(
        read_proposals(&store),
        Err(GovernanceError::Store(StoreError::Corruption(_)))
    ));
}
