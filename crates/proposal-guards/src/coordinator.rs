//! Vote submission pipeline.
//!
//! Per attempt: ensure delegation, fresh read, vote while Active, fresh read
//! again, execute once Succeeded. A vote can itself push the proposal to
//! Succeeded, so execution is judged on the post-vote read. Each write is
//! independently fallible; a failed stage aborts the rest of the attempt but
//! nothing earlier is rolled back, the ledger being the only source of
//! truth.

use crate::delegation::ensure_delegated;
use crate::view::{ready_to_execute, voting_open, ProposalView, DEFAULT_VOTE};
use dao_core::{
    Address, GatewayError, GovernanceError, LedgerRead, Proposal, ProposalId, ProposalState,
    VoteType,
};
use dao_gateway::GovernanceSession;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Execution {
    /// Post-vote state was not Succeeded; no execute call made.
    NotEligible,
    Executed,
    /// Someone else executed first; the ledger refused the duplicate.
    AlreadyExecuted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteOutcome {
    pub proposal_id: ProposalId,
    /// A self-delegation write was issued during this attempt.
    pub delegated: bool,
    pub state_before: ProposalState,
    pub vote_cast: Option<VoteType>,
    pub state_after: ProposalState,
    pub execution: Execution,
}

/// Entry view of a proposal for the connected member.
#[derive(Debug, Clone)]
pub struct Ballot {
    pub proposal: Proposal,
    pub view: ProposalView,
    /// Ledger answer to `hasVoted`; false without a wallet.
    pub already_voted: bool,
    pub default_choice: VoteType,
}

impl Ballot {
    pub fn can_vote(&self) -> bool {
        self.view.offers_vote() && !self.already_voted
    }
}

/// Per-session coordinator. The voted flags are a responsiveness cache only;
/// `open_ballot` overwrites them with the ledger's answer.
#[derive(Default)]
pub struct ProposalCoordinator {
    in_flight: Mutex<HashSet<ProposalId>>,
    voted: Mutex<HashMap<ProposalId, bool>>,
}

/// Held for the duration of one attempt on one proposal.
pub(crate) struct InFlight<'a> {
    set: &'a Mutex<HashSet<ProposalId>>,
    proposal_id: ProposalId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.set).remove(&self.proposal_id);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ProposalCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local view of whether this session voted on `proposal_id`.
    pub fn has_voted(&self, proposal_id: &ProposalId) -> bool {
        lock(&self.voted).get(proposal_id).copied().unwrap_or(false)
    }

    pub fn is_in_flight(&self, proposal_id: &ProposalId) -> bool {
        lock(&self.in_flight).contains(proposal_id)
    }

    fn mark_voted(&self, proposal_id: &ProposalId, voted: bool) {
        lock(&self.voted).insert(proposal_id.clone(), voted);
    }

    pub(crate) fn begin(&self, proposal_id: &ProposalId) -> Result<InFlight<'_>, GovernanceError> {
        if !lock(&self.in_flight).insert(proposal_id.clone()) {
            return Err(GovernanceError::AttemptInFlight(proposal_id.clone()));
        }
        Ok(InFlight {
            set: &self.in_flight,
            proposal_id: proposal_id.clone(),
        })
    }

    /// Fresh read of a proposal plus the authoritative `hasVoted` answer for
    /// the connected member, reconciling the local flag.
    pub async fn open_ballot(
        &self,
        session: &GovernanceSession,
        proposal_id: &ProposalId,
    ) -> Result<Ballot, GovernanceError> {
        let proposal = session
            .governance()
            .get(proposal_id)
            .await
            .map_err(|e| GovernanceError::read(LedgerRead::Proposal, e))?;
        let view = ProposalView::for_state(proposal.state);

        let already_voted = match session.signer() {
            Ok(member) => {
                let voted = session
                    .governance()
                    .has_voted(proposal_id, member)
                    .await
                    .map_err(|e| GovernanceError::read(LedgerRead::HasVoted, e))?;
                self.mark_voted(proposal_id, voted);
                debug!(%proposal_id, %member, voted, "reconciled voted flag with ledger");
                voted
            }
            Err(_) => false,
        };

        Ok(Ballot {
            proposal,
            view,
            already_voted,
            default_choice: DEFAULT_VOTE,
        })
    }

    /// Run one vote attempt for the connected member. `choice` defaults to
    /// Abstain. Concurrent attempts on the same proposal are refused.
    pub async fn cast_vote(
        &self,
        session: &GovernanceSession,
        proposal_id: &ProposalId,
        choice: Option<VoteType>,
    ) -> Result<VoteOutcome, GovernanceError> {
        let member = session.signer()?;
        let _guard = self.begin(proposal_id)?;
        if self.has_voted(proposal_id) {
            return Err(GovernanceError::AlreadyVoted(proposal_id.clone()));
        }
        let vote = choice.unwrap_or(DEFAULT_VOTE);

        let delegated = ensure_delegated(session, member).await?;

        let before = self.read(session, proposal_id).await?;
        let vote_cast = if voting_open(before.state) {
            if !before.declares(vote) {
                return Err(GovernanceError::InvalidVoteChoice {
                    proposal_id: proposal_id.clone(),
                    vote,
                });
            }
            session
                .governance()
                .vote(member, proposal_id, vote)
                .await
                .map_err(|e| {
                    warn!(%proposal_id, %member, error = %e, "vote failed");
                    GovernanceError::VoteFailed(e)
                })?;
            self.mark_voted(proposal_id, true);
            info!(%proposal_id, %member, %vote, "vote cast");
            Some(vote)
        } else {
            debug!(%proposal_id, state = %before.state, "not open for voting; vote skipped");
            None
        };

        let after = self.read(session, proposal_id).await?;
        let execution = if ready_to_execute(after.state) {
            self.execute(session, member, proposal_id).await?
        } else {
            Execution::NotEligible
        };

        Ok(VoteOutcome {
            proposal_id: proposal_id.clone(),
            delegated,
            state_before: before.state,
            vote_cast,
            state_after: after.state,
            execution,
        })
    }

    async fn read(
        &self,
        session: &GovernanceSession,
        proposal_id: &ProposalId,
    ) -> Result<Proposal, GovernanceError> {
        session.governance().get(proposal_id).await.map_err(|e| {
            warn!(%proposal_id, error = %e, "proposal read failed");
            GovernanceError::read(LedgerRead::Proposal, e)
        })
    }

    async fn execute(
        &self,
        session: &GovernanceSession,
        member: Address,
        proposal_id: &ProposalId,
    ) -> Result<Execution, GovernanceError> {
        match session.governance().execute(member, proposal_id).await {
            Ok(()) => {
                info!(%proposal_id, "proposal executed");
                Ok(Execution::Executed)
            }
            Err(GatewayError::AlreadyExecuted(_)) => {
                debug!(%proposal_id, "proposal already executed");
                Ok(Execution::AlreadyExecuted)
            }
            Err(e) => {
                warn!(%proposal_id, error = %e, "execute failed");
                Err(GovernanceError::ExecuteFailed(e))
            }
        }
    }
}

/// Fresh list of every proposal on the ledger.
pub async fn list_proposals(session: &GovernanceSession) -> Result<Vec<Proposal>, GovernanceError> {
    session
        .governance()
        .get_all()
        .await
        .map_err(|e| GovernanceError::read(LedgerRead::ProposalList, e))
}
