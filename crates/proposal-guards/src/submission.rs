use dao_core::{
    encode_action, is_address, is_numeric, parse_units, Address, GovernanceError, LedgerRead,
    ProposalId, ProposalKind,
};
use dao_gateway::GovernanceSession;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftKind {
    Mint,
    Transfer,
}

/// Raw form input for a new proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub description: String,
    pub kind: DraftKind,
    /// Whole tokens, digits only.
    pub amount: String,
    /// Recipient, required for transfers.
    pub target_address: Option<String>,
}

impl ProposalDraft {
    pub fn mint(description: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            kind: DraftKind::Mint,
            amount: amount.into(),
            target_address: None,
        }
    }

    pub fn transfer(
        description: impl Into<String>,
        amount: impl Into<String>,
        target_address: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            kind: DraftKind::Transfer,
            amount: amount.into(),
            target_address: Some(target_address.into()),
        }
    }
}

/// Validate a draft, check the treasury for transfers and submit it.
///
/// The treasury check only saves a wasted round-trip; the ledger may still
/// reject the transfer when the proposal is executed. Remote failures are
/// returned unmodified and never retried.
pub async fn submit_proposal(
    session: &GovernanceSession,
    draft: &ProposalDraft,
) -> Result<ProposalId, GovernanceError> {
    if !is_numeric(&draft.amount) {
        warn!(amount = %draft.amount, "rejected proposal: amount is not a number");
        return Err(GovernanceError::InvalidAmount(draft.amount.clone()));
    }

    let kind = match draft.kind {
        DraftKind::Mint => ProposalKind::Mint,
        DraftKind::Transfer => {
            let raw = draft.target_address.as_deref().unwrap_or_default();
            if !is_address(raw) {
                warn!(address = raw, "rejected proposal: invalid transfer address");
                return Err(GovernanceError::InvalidAddress(raw.to_string()));
            }
            let to: Address = raw
                .parse()
                .map_err(|_| GovernanceError::InvalidAddress(raw.to_string()))?;
            ProposalKind::Transfer { to }
        }
    };

    let proposer = session.signer()?;
    let config = session.config();

    if let ProposalKind::Transfer { .. } = kind {
        let requested = parse_units(&draft.amount)?;
        let treasury = session
            .governance()
            .balance_of_token(config.token_module)
            .await
            .map_err(|e| GovernanceError::read(LedgerRead::TreasuryBalance, e))?;
        if requested > treasury.value {
            warn!(
                requested = %draft.amount,
                available = %treasury.display_value,
                "rejected proposal: transfer exceeds treasury"
            );
            return Err(GovernanceError::InsufficientTreasury {
                requested: draft.amount.clone(),
                available: treasury.display_value,
            });
        }
    }

    let actions = encode_action(
        &kind,
        &draft.amount,
        config.governance_module,
        config.token_module,
    )?;

    let proposal_id = session
        .governance()
        .propose(proposer, &draft.description, actions)
        .await
        .map_err(|e| {
            warn!(error = %e, kind = ?draft.kind, amount = %draft.amount, "propose failed");
            GovernanceError::ProposeFailed(e)
        })?;

    info!(%proposal_id, %proposer, kind = ?draft.kind, amount = %draft.amount, "proposal submitted");
    Ok(proposal_id)
}
