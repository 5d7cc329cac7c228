use dao_core::{Address, GovernanceError, LedgerRead};
use dao_gateway::GovernanceSession;
use tracing::{info, warn};

/// Holding at least one membership credential unlocks the governance pages.
pub async fn has_membership(
    session: &GovernanceSession,
    address: Address,
) -> Result<bool, GovernanceError> {
    let token_id = session.config().membership_token_id;
    let held = session
        .membership()
        .balance_of(address, token_id)
        .await
        .map_err(|e| GovernanceError::read(LedgerRead::MembershipBalance, e))?;
    Ok(held > 0)
}

/// Claim one membership credential for the connected wallet.
pub async fn claim_membership(session: &GovernanceSession) -> Result<(), GovernanceError> {
    let member = session.signer()?;
    let token_id = session.config().membership_token_id;
    session
        .membership()
        .claim(member, token_id, 1)
        .await
        .map_err(|e| {
            warn!(%member, token_id, error = %e, "membership claim failed");
            GovernanceError::ClaimFailed(e)
        })?;
    info!(%member, token_id, "membership claimed");
    Ok(())
}
