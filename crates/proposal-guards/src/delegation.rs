use dao_core::{Address, GovernanceError, LedgerRead};
use dao_gateway::GovernanceSession;
use tracing::{debug, info, warn};

/// Make sure `member`'s voting weight is delegated, delegating to itself if
/// nothing is set. Returns whether a delegation write was issued.
///
/// Idempotent: with a delegation in place this is a single read.
pub async fn ensure_delegated(
    session: &GovernanceSession,
    member: Address,
) -> Result<bool, GovernanceError> {
    let current = session
        .token()
        .get_delegation_of(member)
        .await
        .map_err(|e| GovernanceError::read(LedgerRead::Delegation, e))?;

    if !current.is_zero() {
        debug!(%member, delegatee = %current, "delegation already in place");
        return Ok(false);
    }

    session
        .token()
        .delegate_to(member, member)
        .await
        .map_err(|e| {
            warn!(%member, error = %e, "self-delegation failed");
            GovernanceError::DelegationFailed(e)
        })?;
    info!(%member, "delegated voting weight to self");
    Ok(true)
}
