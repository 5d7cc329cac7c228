//! `fomodao`: membership-gated DAO governance client.
//!
//! Every command runs against a simulated ledger persisted as JSON; write
//! commands store the resulting state back to the same file.

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Command, ProposeCommand};
use dao_core::{whole_to_base, DaoConfig, ProposalId, ProposalState, TokenCall, VoteType};
use dao_gateway::{GovernanceSession, LedgerGateway, LedgerState, SimulatedLedger};
use member_roster::{claim_membership, has_membership, run_airdrop, RosterSnapshot};
use prometheus::{Encoder, Registry, TextEncoder};
use prometheus_bridge::{observed_cast_vote, GovernanceMetrics};
use proposal_guards::{
    list_proposals, submit_proposal, Execution, ProposalCoordinator, ProposalDraft,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = DaoConfig::from_json_file(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    let registry = Registry::new();
    let metrics = GovernanceMetrics::new(&registry).context("registering metrics")?;

    if let Command::Init {
        quorum,
        treasury,
        holders,
    } = &cli.command
    {
        let mut state = LedgerState::new(&config, whole_to_base(*quorum));
        state
            .balances
            .insert(config.governance_module, whole_to_base(*treasury));
        for (holder, amount) in holders {
            state.balances.insert(*holder, whole_to_base(*amount));
        }
        save_ledger(&cli.ledger, &state)?;
        info!(path = %cli.ledger.display(), quorum, treasury, holders = holders.len(), "ledger initialised");
        return Ok(());
    }

    let ledger = Arc::new(SimulatedLedger::from_state(load_ledger(&cli.ledger)?));
    let mut session = GovernanceSession::start(LedgerGateway::simulated(config, ledger.clone()));
    if let Some(signer) = cli.signer {
        session.connect(signer);
    }

    let result = run_and_persist(&cli.command, &session, &ledger, &metrics, &cli.ledger).await;
    session.end();

    if cli.metrics {
        print!("{}", render_metrics(&registry)?);
    }
    result
}

/// Run `command`, then store the ledger for write commands even when a later
/// stage failed: writes that already landed are never rolled back.
async fn run_and_persist(
    command: &Command,
    session: &GovernanceSession,
    ledger: &SimulatedLedger,
    metrics: &GovernanceMetrics,
    ledger_path: &Path,
) -> Result<()> {
    let result = run(command, session, ledger, metrics).await;
    if command.writes_ledger() {
        if let Err(save_err) = save_ledger(ledger_path, &ledger.snapshot()) {
            if let Err(run_err) = &result {
                warn!(error = %run_err, "command failed before the ledger could be stored");
            }
            return Err(save_err);
        }
    }
    result
}

fn render_metrics(registry: &Registry) -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

async fn run(
    command: &Command,
    session: &GovernanceSession,
    ledger: &SimulatedLedger,
    metrics: &GovernanceMetrics,
) -> Result<()> {
    match command {
        Command::Init { .. } => bail!("init runs before any ledger is loaded"),
        Command::Proposals => {
            for proposal in list_proposals(session).await? {
                println!(
                    "#{} [{}] {}",
                    proposal.proposal_id, proposal.state, proposal.description
                );
                for action in &proposal.actions {
                    match action.decode_token_call() {
                        Some(TokenCall::Mint { to, amount }) => {
                            println!("    mint {} to {}", dao_core::format_units(amount), to)
                        }
                        Some(TokenCall::Transfer { to, amount }) => {
                            println!("    transfer {} to {}", dao_core::format_units(amount), to)
                        }
                        None => println!("    call {}", action.to_address),
                    }
                }
            }
        }
        Command::Propose(propose) => {
            require_membership(session).await?;
            let draft = match propose {
                ProposeCommand::Mint {
                    amount,
                    description,
                } => ProposalDraft::mint(description.clone(), amount.clone()),
                ProposeCommand::Transfer {
                    amount,
                    to,
                    description,
                } => ProposalDraft::transfer(description.clone(), amount.clone(), to.clone()),
            };
            let proposal_id = submit_proposal(session, &draft).await?;
            println!("submitted proposal #{proposal_id}");
        }
        Command::Vote {
            proposal_id,
            choice,
        } => {
            require_membership(session).await?;
            let proposal_id = ProposalId::new(proposal_id.clone());
            let coordinator = ProposalCoordinator::new();
            let ballot = coordinator.open_ballot(session, &proposal_id).await?;
            debug!(%proposal_id, view = ?ballot.view, already_voted = ballot.already_voted, "ballot opened");
            if ballot.already_voted {
                println!("already voted on #{proposal_id}");
                return Ok(());
            }
            let outcome = observed_cast_vote(
                metrics,
                &coordinator,
                session,
                &proposal_id,
                choice.map(VoteType),
            )
            .await?;
            match outcome.vote_cast {
                Some(vote) => println!("voted {vote} on #{proposal_id}"),
                None => println!("#{proposal_id} is {}; no vote cast", outcome.state_before),
            }
            match outcome.execution {
                Execution::Executed => println!("#{proposal_id} executed"),
                Execution::AlreadyExecuted => println!("#{proposal_id} was already executed"),
                Execution::NotEligible => println!("#{proposal_id} is {}", outcome.state_after),
            }
        }
        Command::Open { proposal_id } => {
            let proposal_id = ProposalId::new(proposal_id.clone());
            let current = ledger.snapshot();
            let Some(entry) = current.proposals.get(&proposal_id) else {
                bail!("no proposal #{proposal_id}");
            };
            if entry.proposal.state != ProposalState::Pending {
                bail!("#{proposal_id} is {}, not Pending", entry.proposal.state);
            }
            ledger.set_state(&proposal_id, ProposalState::Active)?;
            println!("#{proposal_id} is open for voting");
        }
        Command::Members => {
            let roster = RosterSnapshot::fetch(session).await?;
            metrics.observe_roster(&roster);
            println!("members as of {}", roster.taken_at.to_rfc3339());
            for member in &roster.members {
                println!("  {}  {}", member.address.shorten(), member.display_amount());
            }
            println!(
                "  total held: {}",
                dao_core::format_units(roster.total_supply_held())
            );
        }
        Command::Claim => {
            claim_membership(session).await?;
            println!("membership claimed for {}", session.signer()?);
        }
        Command::Airdrop => {
            require_membership(session).await?;
            let targets = run_airdrop(session).await?;
            for target in &targets {
                println!(
                    "  {}  {}",
                    target.address.shorten(),
                    dao_core::format_units(target.amount)
                );
            }
            println!("airdropped to {} members", targets.len());
        }
    }
    Ok(())
}

/// Governance pages are only reachable with a membership credential.
async fn require_membership(session: &GovernanceSession) -> Result<()> {
    let member = session.signer()?;
    if !has_membership(session, member).await? {
        bail!("{member} holds no membership credential; run `fomodao claim` first");
    }
    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_ledger(path: &Path) -> Result<LedgerState> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading ledger {}; run `fomodao init` first", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing ledger {}", path.display()))
}

fn save_ledger(path: &Path, state: &LedgerState) -> Result<()> {
    let raw = serde_json::to_string_pretty(state)?;
    std::fs::write(path, raw).with_context(|| format!("writing ledger {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao_core::{Address, AirdropConfig, GatewayError, Proposal, VoteOption};
    use dao_gateway::CallKind;
    use std::path::PathBuf;

    const MEMBER: Address = Address([0x0a; 20]);

    fn config() -> DaoConfig {
        DaoConfig {
            governance_module: Address([0xa0; 20]),
            token_module: Address([0xb0; 20]),
            membership_module: Address([0xc0; 20]),
            membership_token_id: 0,
            airdrop: AirdropConfig::default(),
        }
    }

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fomodao-{}-{name}.json", std::process::id()))
    }

    fn member_session(ledger: &Arc<SimulatedLedger>) -> GovernanceSession {
        let mut session = GovernanceSession::start(LedgerGateway::simulated(config(), ledger.clone()));
        session.connect(MEMBER);
        session
    }

    fn voting_ledger() -> (Arc<SimulatedLedger>, ProposalId) {
        let ledger = Arc::new(SimulatedLedger::new(&config(), whole_to_base(1)));
        ledger.fund(MEMBER, whole_to_base(100));
        ledger.grant_membership(MEMBER, 0);
        let proposal_id = ProposalId::new("0");
        ledger.insert_proposal(
            Proposal {
                proposal_id: proposal_id.clone(),
                description: "pay the venue".into(),
                state: ProposalState::Active,
                votes: VoteOption::standard(),
                actions: Vec::new(),
            },
            MEMBER,
        );
        (ledger, proposal_id)
    }

    fn vote_for() -> Command {
        Command::Vote {
            proposal_id: "0".into(),
            choice: Some(1),
        }
    }

    #[tokio::test]
    async fn vote_is_stored_even_when_execute_fails() {
        let path = scratch("execute-fails");
        let (ledger, proposal_id) = voting_ledger();
        ledger.fail_next(CallKind::Execute, GatewayError::Rejected("out of gas".into()));
        let registry = Registry::new();
        let metrics = GovernanceMetrics::new(&registry).unwrap();
        let session = member_session(&ledger);

        let result = run_and_persist(&vote_for(), &session, &ledger, &metrics, &path).await;
        assert!(result.is_err());

        let stored = load_ledger(&path).unwrap();
        let entry = &stored.proposals[&proposal_id];
        assert!(entry.voters.contains(&MEMBER));
        assert_eq!(entry.proposal.state, ProposalState::Succeeded);
        assert_eq!(stored.delegations.get(&MEMBER), Some(&MEMBER));

        // Reloaded ledger remembers the vote: a retry does not vote again.
        let reloaded = Arc::new(SimulatedLedger::from_state(stored));
        let session = member_session(&reloaded);
        run_and_persist(&vote_for(), &session, &reloaded, &metrics, &path)
            .await
            .unwrap();
        assert_eq!(reloaded.calls_of(CallKind::Vote), 0);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn failed_attempts_reach_the_exposition() {
        let path = scratch("metrics");
        let (ledger, _) = voting_ledger();
        ledger.fail_next(CallKind::Vote, GatewayError::Transport("timeout".into()));
        let registry = Registry::new();
        let metrics = GovernanceMetrics::new(&registry).unwrap();
        let session = member_session(&ledger);

        assert!(run_and_persist(&vote_for(), &session, &ledger, &metrics, &path)
            .await
            .is_err());
        let text = render_metrics(&registry).unwrap();
        assert!(text.contains(r#"dao_vote_attempts_total{result="failed"} 1"#));
        assert_eq!(
            metrics
                .pipeline_stage_total
                .with_label_values(&["vote", "failed"])
                .get(),
            1
        );

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn read_only_commands_leave_the_file_alone() {
        let path = scratch("read-only");
        let _ = std::fs::remove_file(&path);
        let (ledger, _) = voting_ledger();
        let registry = Registry::new();
        let metrics = GovernanceMetrics::new(&registry).unwrap();
        let session = member_session(&ledger);

        run_and_persist(&Command::Proposals, &session, &ledger, &metrics, &path)
            .await
            .unwrap();
        assert!(!path.exists());
    }
}
