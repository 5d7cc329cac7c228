//! What the client offers for a proposal, decided from its ledger state alone.

use dao_core::{ProposalState, VoteType};
use serde::Serialize;

/// Vote submitted when the member picks nothing.
pub const DEFAULT_VOTE: VoteType = VoteType::ABSTAIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Defeated,
    Executed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProposalView {
    /// Closed with a result worth showing.
    ReadOnly { outcome: Outcome },
    /// Open for voting.
    VotingForm,
    /// Nothing actionable.
    Inert,
}

impl ProposalView {
    pub fn for_state(state: ProposalState) -> Self {
        match state {
            ProposalState::Defeated => ProposalView::ReadOnly {
                outcome: Outcome::Defeated,
            },
            ProposalState::Executed => ProposalView::ReadOnly {
                outcome: Outcome::Executed,
            },
            ProposalState::Active => ProposalView::VotingForm,
            ProposalState::Pending
            | ProposalState::Canceled
            | ProposalState::Succeeded
            | ProposalState::Queued
            | ProposalState::Expired => ProposalView::Inert,
        }
    }

    pub fn offers_vote(&self) -> bool {
        matches!(self, ProposalView::VotingForm)
    }
}

/// A vote write may be issued.
pub(crate) fn voting_open(state: ProposalState) -> bool {
    match state {
        ProposalState::Active => true,
        ProposalState::Pending
        | ProposalState::Canceled
        | ProposalState::Defeated
        | ProposalState::Succeeded
        | ProposalState::Queued
        | ProposalState::Expired
        | ProposalState::Executed => false,
    }
}

/// An execute write may be issued.
pub(crate) fn ready_to_execute(state: ProposalState) -> bool {
    match state {
        ProposalState::Succeeded => true,
        ProposalState::Pending
        | ProposalState::Active
        | ProposalState::Canceled
        | ProposalState::Defeated
        | ProposalState::Queued
        | ProposalState::Expired
        | ProposalState::Executed => false,
    }
}
