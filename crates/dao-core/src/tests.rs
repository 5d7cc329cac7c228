use crate::encoder::{encode_action, ProposalKind, TokenCall, MINT_SELECTOR, TRANSFER_SELECTOR};
use crate::error::{EncodeError, GatewayError, GovernanceError, LedgerRead};
use crate::types::{Address, Proposal, ProposalId, ProposalState, VoteOption, VoteType};
use crate::units::{format_units, parse_units, whole_to_base};
use crate::validation::{is_address, is_numeric};
use crate::{ConfigError, DaoConfig};

fn addr(byte: u8) -> Address {
    Address([byte; 20])
}

#[test]
fn numeric_accepts_only_plain_digits() {
    assert!(!is_numeric(""));
    assert!(!is_numeric("12a"));
    assert!(!is_numeric("-5"));
    assert!(!is_numeric("1.5"));
    assert!(!is_numeric("1e3"));
    assert!(!is_numeric(" 5"));
    assert!(!is_numeric("٣"));
    assert!(is_numeric("500"));
    assert!(is_numeric("0"));
}

#[test]
fn address_requires_prefix_and_forty_hex_digits() {
    assert!(is_address(&format!("0x{}", "a".repeat(40))));
    assert!(is_address(&format!("0x{}", "AbC123".repeat(6) + "dEf0")));
    assert!(!is_address(&format!("0x{}", "a".repeat(39))));
    assert!(!is_address(&format!("0x{}", "a".repeat(41))));
    assert!(!is_address(&format!("0X{}", "a".repeat(40))));
    assert!(!is_address(&format!("0x{}", "g".repeat(40))));
    assert!(!is_address(&"a".repeat(42)));
    assert!(!is_address(""));
}

#[test]
fn address_parses_displays_and_shortens() {
    let raw = "0x1234567890ABCDEF1234567890abcdef12345678";
    let a: Address = raw.parse().expect("valid address");
    assert_eq!(a.to_string(), raw.to_lowercase());
    assert_eq!(a.shorten(), "0x1234...5678");
    assert!(!a.is_zero());
    assert!("0x0000000000000000000000000000000000000000"
        .parse::<Address>()
        .unwrap()
        .is_zero());
    let err = "0x12".parse::<Address>().unwrap_err();
    assert_eq!(err.to_string(), "not an address: 0x12");
    let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
    assert!(boxed.source().is_none());
}

#[test]
fn units_scale_by_eighteen_decimals() {
    assert_eq!(parse_units("1").unwrap(), 1_000_000_000_000_000_000);
    assert_eq!(parse_units("250").unwrap(), whole_to_base(250));
    assert!(matches!(
        parse_units("1000000000000000000000"),
        Err(EncodeError::AmountOverflow(_))
    ));
    assert!(matches!(parse_units("1x"), Err(EncodeError::NotAWholeAmount(_))));

    assert_eq!(format_units(whole_to_base(1000)), "1000.0");
    assert_eq!(format_units(500_000_000_000_000_000), "0.5");
    assert_eq!(format_units(0), "0.0");
    assert_eq!(format_units(whole_to_base(3) + 250_000_000_000_000_000), "3.25");
}

#[test]
fn mint_action_targets_token_module_and_credits_governance() {
    let governance = addr(0x11);
    let token = addr(0x22);
    let actions = encode_action(&ProposalKind::Mint, "42", governance, token).unwrap();
    assert_eq!(actions.len(), 1);

    let action = &actions[0];
    assert_eq!(action.to_address, token);
    assert_eq!(action.native_token_value, 0);
    assert_eq!(action.transaction_data.len(), 68);
    assert_eq!(&action.transaction_data[..4], &MINT_SELECTOR);
    assert_eq!(
        action.decode_token_call(),
        Some(TokenCall::Mint {
            to: governance,
            amount: whole_to_base(42)
        })
    );
}

#[test]
fn transfer_action_encodes_recipient_word() {
    let to = addr(0xab);
    let actions =
        encode_action(&ProposalKind::Transfer { to }, "7", addr(0x11), addr(0x22)).unwrap();
    let data = &actions[0].transaction_data;
    assert_eq!(&data[..4], &TRANSFER_SELECTOR);
    assert!(data[4..16].iter().all(|b| *b == 0));
    assert_eq!(&data[16..36], &[0xab; 20]);
    assert_eq!(
        u128::from_be_bytes(data[52..68].try_into().unwrap()),
        whole_to_base(7)
    );
}

#[test]
fn encoder_surfaces_bad_amounts() {
    let err = encode_action(&ProposalKind::Mint, "ten", addr(1), addr(2)).unwrap_err();
    assert_eq!(err, EncodeError::NotAWholeAmount("ten".into()));
}

#[test]
fn proposal_state_numeric_encoding() {
    assert_eq!(ProposalState::try_from(1), Ok(ProposalState::Active));
    assert_eq!(ProposalState::try_from(4), Ok(ProposalState::Succeeded));
    assert_eq!(ProposalState::try_from(7), Ok(ProposalState::Executed));
    assert_eq!(ProposalState::try_from(8), Err(8));
    for (i, state) in ProposalState::ALL.iter().enumerate() {
        assert_eq!(*state as usize, i);
    }
    assert!(ProposalState::Executed.is_terminal());
    assert!(!ProposalState::Succeeded.is_terminal());
}

#[test]
fn proposal_json_uses_ledger_field_names() {
    let proposal = Proposal {
        proposal_id: ProposalId::new("17"),
        description: "fund the party".into(),
        state: ProposalState::Active,
        votes: VoteOption::standard(),
        actions: Vec::new(),
    };
    let json = serde_json::to_value(&proposal).unwrap();
    assert_eq!(json["proposal_id"], "17");
    assert_eq!(json["votes"][0]["type"], 1);
    assert_eq!(json["votes"][2]["label"], "Abstain");
    assert!(proposal.declares(VoteType::ABSTAIN));
    assert!(!proposal.declares(VoteType(9)));
}

#[test]
fn error_taxonomy_separates_prechecks_from_remote_failures() {
    assert!(GovernanceError::InvalidAmount("x".into()).is_precondition());
    assert!(GovernanceError::InsufficientTreasury {
        requested: "5".into(),
        available: "1.0".into()
    }
    .is_precondition());
    let remote = GovernanceError::VoteFailed(GatewayError::Transport("timeout".into()));
    assert!(!remote.is_precondition());
    assert_eq!(remote.stage(), "vote");

    let read = GovernanceError::read(
        LedgerRead::Proposal,
        GatewayError::NotFound(ProposalId::new("9")),
    );
    assert_eq!(read.stage(), "read");
    assert_eq!(read.to_string(), "read get failed: proposal 9 not found");
}

#[test]
fn config_defaults_and_validation() {
    let raw = format!(
        r#"{{"governance_module":"{}","token_module":"{}","membership_module":"{}"}}"#,
        addr(1),
        addr(2),
        addr(3)
    );
    let cfg = DaoConfig::from_json_str(&raw).unwrap();
    assert_eq!(cfg.membership_token_id, 0);
    assert_eq!(cfg.airdrop.min_amount, 1_000);
    assert_eq!(cfg.airdrop.max_amount, 10_000);

    let zero = raw.replace(&addr(2).to_string(), &Address::ZERO.to_string());
    assert!(matches!(
        DaoConfig::from_json_str(&zero),
        Err(ConfigError::ZeroModule("token"))
    ));

    let mut bad_range = cfg.clone();
    bad_range.airdrop.min_amount = 20_000;
    assert!(matches!(
        bad_range.validate(),
        Err(ConfigError::EmptyAirdropRange { .. })
    ));
}
