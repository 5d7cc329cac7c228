//! Command line definitions for `fomodao`.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use dao_core::Address;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fomodao", version, about = "Membership-gated DAO governance client")]
pub struct Cli {
    /// DAO module addresses and airdrop range (JSON).
    #[arg(long, default_value = "dao.json")]
    pub config: PathBuf,

    /// Simulated ledger state file (JSON).
    #[arg(long, default_value = "ledger.json")]
    pub ledger: PathBuf,

    /// Wallet address acting for write commands.
    #[arg(long)]
    pub signer: Option<Address>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,

    /// Print the prometheus exposition gathered during the run.
    #[arg(long)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a fresh ledger with the treasury funded.
    Init {
        /// For-weight (whole tokens) a proposal needs to succeed.
        #[arg(long, default_value_t = 1)]
        quorum: u64,
        /// Whole tokens held by the governance treasury.
        #[arg(long, default_value_t = 0)]
        treasury: u64,
        /// Token holder as `<address>=<whole amount>`; repeatable.
        #[arg(long = "holder", value_parser = parse_holder)]
        holders: Vec<(Address, u64)>,
    },
    /// List every proposal.
    Proposals,
    /// Submit a proposal.
    #[command(subcommand)]
    Propose(ProposeCommand),
    /// Vote on a proposal and execute it once it has succeeded.
    Vote {
        proposal_id: String,
        /// 0 = Against, 1 = For, 2 = Abstain.
        #[arg(long)]
        choice: Option<u8>,
    },
    /// Open a pending proposal for voting.
    Open { proposal_id: String },
    /// Show members and their token holdings.
    Members,
    /// Claim a membership credential for the signer.
    Claim,
    /// Airdrop tokens from the signer to every member.
    Airdrop,
}

#[derive(Debug, Subcommand)]
pub enum ProposeCommand {
    /// Mint new governance tokens to the treasury.
    Mint { amount: String, description: String },
    /// Transfer treasury tokens to an address.
    Transfer {
        amount: String,
        to: String,
        description: String,
    },
}

impl Command {
    pub fn writes_ledger(&self) -> bool {
        !matches!(self, Command::Proposals | Command::Members)
    }
}

fn parse_holder(raw: &str) -> anyhow::Result<(Address, u64)> {
    let (address, amount) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected <address>=<amount>, got {raw:?}"))?;
    let address = address
        .parse()
        .with_context(|| format!("holder address {address:?}"))?;
    let amount = amount
        .parse()
        .with_context(|| format!("holder amount {amount:?}"))?;
    Ok((address, amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0x00000000000000000000000000000000000000a1";

    #[test]
    fn parses_vote_with_choice() {
        let cli = Cli::try_parse_from([
            "fomodao", "--signer", ALICE, "vote", "3", "--choice", "1",
        ])
        .unwrap();
        assert_eq!(cli.signer.unwrap().to_string(), ALICE);
        match cli.command {
            Command::Vote { proposal_id, choice } => {
                assert_eq!(proposal_id, "3");
                assert_eq!(choice, Some(1));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_init_holders() {
        let holder = format!("{ALICE}=250");
        let cli = Cli::try_parse_from([
            "fomodao", "init", "--quorum", "100", "--treasury", "5000", "--holder", &holder,
        ])
        .unwrap();
        match cli.command {
            Command::Init { quorum, treasury, holders } => {
                assert_eq!(quorum, 100);
                assert_eq!(treasury, 5000);
                assert_eq!(holders.len(), 1);
                assert_eq!(holders[0].1, 250);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_holder_and_signer() {
        assert!(Cli::try_parse_from(["fomodao", "init", "--holder", "0x12=5"]).is_err());
        assert!(Cli::try_parse_from(["fomodao", "init", "--holder", ALICE]).is_err());
        assert!(Cli::try_parse_from(["fomodao", "--signer", "alice", "claim"]).is_err());
    }

    #[test]
    fn transfer_takes_amount_target_description() {
        let cli = Cli::try_parse_from([
            "fomodao", "propose", "transfer", "100", ALICE, "pay the venue",
        ])
        .unwrap();
        assert!(cli.command.writes_ledger());
        match cli.command {
            Command::Propose(ProposeCommand::Transfer { amount, to, description }) => {
                assert_eq!(amount, "100");
                assert_eq!(to, ALICE);
                assert_eq!(description, "pay the venue");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
