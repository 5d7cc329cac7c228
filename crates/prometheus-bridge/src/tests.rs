use crate::{observed_cast_vote, GovernanceMetrics};
use chrono::Utc;
use dao_core::{
    whole_to_base, Address, AirdropConfig, DaoConfig, Proposal, ProposalId, ProposalState,
    VoteOption, VoteType,
};
use dao_gateway::{GovernanceSession, LedgerGateway, SimulatedLedger};
use member_roster::{MemberSnapshot, RosterSnapshot};
use prometheus::{Encoder, Registry, TextEncoder};
use proposal_guards::ProposalCoordinator;
use std::sync::Arc;

fn addr(byte: u8) -> Address {
    Address([byte; 20])
}

fn config() -> DaoConfig {
    DaoConfig {
        governance_module: addr(0xa0),
        token_module: addr(0xb0),
        membership_module: addr(0xc0),
        membership_token_id: 0,
        airdrop: AirdropConfig::default(),
    }
}

fn active_proposal(ledger: &SimulatedLedger) -> ProposalId {
    let proposal_id = ProposalId::new("0");
    ledger.insert_proposal(
        Proposal {
            proposal_id: proposal_id.clone(),
            description: "fund the meetup".into(),
            state: ProposalState::Active,
            votes: VoteOption::standard(),
            actions: Vec::new(),
        },
        addr(0x42),
    );
    proposal_id
}

#[tokio::test]
async fn executed_attempt_counts_each_stage() {
    let registry = Registry::new();
    let metrics = GovernanceMetrics::new(&registry).unwrap();
    let ledger = Arc::new(SimulatedLedger::new(&config(), whole_to_base(10)));
    ledger.fund(addr(1), whole_to_base(50));
    let id = active_proposal(&ledger);

    let mut session = GovernanceSession::start(LedgerGateway::simulated(config(), ledger.clone()));
    session.connect(addr(1));
    let coordinator = ProposalCoordinator::new();

    observed_cast_vote(&metrics, &coordinator, &session, &id, Some(VoteType::FOR))
        .await
        .unwrap();

    let stages = &metrics.pipeline_stage_total;
    assert_eq!(stages.with_label_values(&["delegate", "ok"]).get(), 1);
    assert_eq!(stages.with_label_values(&["vote", "ok"]).get(), 1);
    assert_eq!(stages.with_label_values(&["execute", "ok"]).get(), 1);
    assert_eq!(
        metrics.vote_attempts_total.with_label_values(&["executed"]).get(),
        1
    );

    // A second attempt is refused locally.
    let err = observed_cast_vote(&metrics, &coordinator, &session, &id, None)
        .await
        .unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(stages.with_label_values(&["precheck", "refused"]).get(), 1);
    assert_eq!(
        metrics.vote_attempts_total.with_label_values(&["refused"]).get(),
        1
    );
}

#[tokio::test]
async fn missing_wallet_is_refused_not_failed() {
    let registry = Registry::new();
    let metrics = GovernanceMetrics::new(&registry).unwrap();
    let ledger = Arc::new(SimulatedLedger::new(&config(), whole_to_base(10)));
    let id = active_proposal(&ledger);
    let session = GovernanceSession::start(LedgerGateway::simulated(config(), ledger));

    let coordinator = ProposalCoordinator::new();
    assert!(observed_cast_vote(&metrics, &coordinator, &session, &id, None)
        .await
        .is_err());
    assert_eq!(
        metrics.vote_attempts_total.with_label_values(&["refused"]).get(),
        1
    );
    assert_eq!(
        metrics.vote_attempts_total.with_label_values(&["failed"]).get(),
        0
    );
}

#[test]
fn roster_gauges_follow_latest_snapshot() {
    let registry = Registry::new();
    let metrics = GovernanceMetrics::new(&registry).unwrap();
    let first = RosterSnapshot {
        taken_at: Utc::now(),
        members: vec![
            MemberSnapshot { address: addr(1), token_amount: whole_to_base(3) },
            MemberSnapshot { address: addr(2), token_amount: whole_to_base(1) / 2 },
        ],
    };
    metrics.observe_roster(&first);
    let one = addr(1).to_string();
    let two = addr(2).to_string();
    assert_eq!(metrics.member_token_amount.with_label_values(&[one.as_str()]).get(), 3.0);
    assert_eq!(metrics.member_token_amount.with_label_values(&[two.as_str()]).get(), 0.5);

    let second = RosterSnapshot {
        taken_at: Utc::now(),
        members: vec![MemberSnapshot { address: addr(1), token_amount: 0 }],
    };
    metrics.observe_roster(&second);

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert!(text.contains(&one));
    assert!(!text.contains(&two));
}

#[test]
fn registering_twice_on_one_registry_fails() {
    let registry = Registry::new();
    let _metrics = GovernanceMetrics::new(&registry).unwrap();
    assert!(GovernanceMetrics::new(&registry).is_err());
}
