use crate::types::{ProposalId, VoteType};
use std::fmt;
use thiserror::Error;

/// Failure reported by the ledger gateway for a single remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("ledger rejected the call: {0}")]
    Rejected(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("proposal {0} was already executed")]
    AlreadyExecuted(ProposalId),
    #[error("proposal {0} not found")]
    NotFound(ProposalId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("'{0}' is not a whole token amount")]
    NotAWholeAmount(String),
    #[error("amount {0} does not fit the token's base-unit range")]
    AmountOverflow(String),
}

/// Which read failed, for `GovernanceError::ReadFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerRead {
    Proposal,
    ProposalList,
    HasVoted,
    Delegation,
    TreasuryBalance,
    HolderBalances,
    ClaimerAddresses,
    MembershipBalance,
}

impl fmt::Display for LedgerRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LedgerRead::Proposal => "get",
            LedgerRead::ProposalList => "getAll",
            LedgerRead::HasVoted => "hasVoted",
            LedgerRead::Delegation => "getDelegationOf",
            LedgerRead::TreasuryBalance => "balanceOfToken",
            LedgerRead::HolderBalances => "getAllHolderBalances",
            LedgerRead::ClaimerAddresses => "getAllClaimerAddresses",
            LedgerRead::MembershipBalance => "balanceOf",
        };
        f.write_str(name)
    }
}

/// Every failure a governance operation can report, attributable to the
/// stage that produced it.
#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("'{0}' is not a valid token amount")]
    InvalidAmount(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("amount exceeds treasury balance (requested {requested}, maximum {available} tokens)")]
    InsufficientTreasury { requested: String, available: String },
    #[error("vote type {vote} is not an option of proposal {proposal_id}")]
    InvalidVoteChoice { proposal_id: ProposalId, vote: VoteType },
    #[error("already voted on proposal {0}")]
    AlreadyVoted(ProposalId),
    #[error("a vote attempt on proposal {0} is already in flight")]
    AttemptInFlight(ProposalId),
    #[error("no wallet connected; write operations are unavailable")]
    WalletNotConnected,
    #[error("airdrop range is empty (min {min} > max {max})")]
    EmptyAirdropRange { min: u64, max: u64 },
    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),
    #[error("propose failed: {0}")]
    ProposeFailed(#[source] GatewayError),
    #[error("delegation failed: {0}")]
    DelegationFailed(#[source] GatewayError),
    #[error("vote failed: {0}")]
    VoteFailed(#[source] GatewayError),
    #[error("execute failed: {0}")]
    ExecuteFailed(#[source] GatewayError),
    #[error("claim failed: {0}")]
    ClaimFailed(#[source] GatewayError),
    #[error("airdrop failed: {0}")]
    AirdropFailed(#[source] GatewayError),
    #[error("read {read} failed: {source}")]
    ReadFailed {
        read: LedgerRead,
        #[source]
        source: GatewayError,
    },
}

impl GovernanceError {
    pub fn read(read: LedgerRead, source: GatewayError) -> Self {
        GovernanceError::ReadFailed { read, source }
    }

    /// Caller mistakes caught before any remote call. Everything else came
    /// back from the ledger and may be transient.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            GovernanceError::InvalidAmount(_)
                | GovernanceError::InvalidAddress(_)
                | GovernanceError::InsufficientTreasury { .. }
                | GovernanceError::InvalidVoteChoice { .. }
                | GovernanceError::AlreadyVoted(_)
                | GovernanceError::AttemptInFlight(_)
                | GovernanceError::WalletNotConnected
                | GovernanceError::EmptyAirdropRange { .. }
                | GovernanceError::Encode(_)
        )
    }

    /// Stage label used in logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            GovernanceError::InvalidAmount(_)
            | GovernanceError::InvalidAddress(_)
            | GovernanceError::InsufficientTreasury { .. }
            | GovernanceError::InvalidVoteChoice { .. }
            | GovernanceError::AlreadyVoted(_)
            | GovernanceError::AttemptInFlight(_)
            | GovernanceError::WalletNotConnected
            | GovernanceError::EmptyAirdropRange { .. }
            | GovernanceError::Encode(_) => "precheck",
            GovernanceError::ProposeFailed(_) => "propose",
            GovernanceError::DelegationFailed(_) => "delegate",
            GovernanceError::VoteFailed(_) => "vote",
            GovernanceError::ExecuteFailed(_) => "execute",
            GovernanceError::ClaimFailed(_) => "claim",
            GovernanceError::AirdropFailed(_) => "airdrop",
            GovernanceError::ReadFailed { .. } => "read",
        }
    }
}
