use dao_core::{whole_to_base, Address, AirdropConfig, AirdropTarget, GovernanceError, LedgerRead};
use dao_gateway::GovernanceSession;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

/// One target per claimer, each with a uniformly random whole amount in the
/// configured range, scaled to base units.
pub fn plan_airdrop<R: Rng>(
    addresses: &[Address],
    cfg: &AirdropConfig,
    rng: &mut R,
) -> Result<Vec<AirdropTarget>, GovernanceError> {
    if cfg.min_amount > cfg.max_amount {
        return Err(GovernanceError::EmptyAirdropRange {
            min: cfg.min_amount,
            max: cfg.max_amount,
        });
    }
    Ok(addresses
        .iter()
        .map(|address| {
            let whole = rng.gen_range(cfg.min_amount..=cfg.max_amount);
            AirdropTarget {
                address: *address,
                amount: whole_to_base(whole),
            }
        })
        .collect())
}

/// Airdrop tokens from the connected wallet to every membership claimer.
pub async fn run_airdrop(session: &GovernanceSession) -> Result<Vec<AirdropTarget>, GovernanceError> {
    let mut rng = StdRng::from_entropy();
    run_airdrop_with(session, &mut rng).await
}

pub async fn run_airdrop_with<R: Rng>(
    session: &GovernanceSession,
    rng: &mut R,
) -> Result<Vec<AirdropTarget>, GovernanceError> {
    let sender = session.signer()?;
    let config = session.config();
    let claimers = session
        .membership()
        .get_all_claimer_addresses(config.membership_token_id)
        .await
        .map_err(|e| GovernanceError::read(LedgerRead::ClaimerAddresses, e))?;
    if claimers.is_empty() {
        info!("no membership claimers; nothing to airdrop");
        return Ok(Vec::new());
    }

    let targets = plan_airdrop(&claimers, &config.airdrop, rng)?;
    for target in &targets {
        info!(address = %target.address, amount = %dao_core::format_units(target.amount), "airdrop target");
    }

    session
        .token()
        .transfer_batch(sender, targets.clone())
        .await
        .map_err(|e| {
            warn!(%sender, error = %e, "airdrop failed");
            GovernanceError::AirdropFailed(e)
        })?;
    info!(%sender, recipients = targets.len(), "airdrop complete");
    Ok(targets)
}
