use crate::GovernanceMetrics;
use dao_core::{GovernanceError, ProposalId, VoteType};
use dao_gateway::GovernanceSession;
use proposal_guards::{ProposalCoordinator, VoteOutcome};

/// `cast_vote`, with the outcome or failure recorded on `metrics`.
pub async fn observed_cast_vote(
    metrics: &GovernanceMetrics,
    coordinator: &ProposalCoordinator,
    session: &GovernanceSession,
    proposal_id: &ProposalId,
    choice: Option<VoteType>,
) -> Result<VoteOutcome, GovernanceError> {
    let result = coordinator.cast_vote(session, proposal_id, choice).await;
    match &result {
        Ok(outcome) => metrics.observe_outcome(outcome),
        Err(err) => metrics.observe_error(err),
    }
    result
}
