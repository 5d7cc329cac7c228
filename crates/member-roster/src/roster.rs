use chrono::{DateTime, Utc};
use dao_core::{format_units, Address, GovernanceError, LedgerRead};
use dao_gateway::GovernanceSession;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSnapshot {
    pub address: Address,
    /// Base units; 0 when the member holds no tokens.
    pub token_amount: u128,
}

impl MemberSnapshot {
    pub fn display_amount(&self) -> String {
        format_units(self.token_amount)
    }
}

/// Join claimer addresses with holder balances, keeping claimer order.
pub fn build_member_list(
    addresses: &[Address],
    balances: &BTreeMap<Address, u128>,
) -> Vec<MemberSnapshot> {
    addresses
        .iter()
        .map(|address| MemberSnapshot {
            address: *address,
            token_amount: balances.get(address).copied().unwrap_or(0),
        })
        .collect()
}

/// Display-only member table. Voting decisions never read this; they go to
/// the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct RosterSnapshot {
    pub taken_at: DateTime<Utc>,
    pub members: Vec<MemberSnapshot>,
}

impl RosterSnapshot {
    pub async fn fetch(session: &GovernanceSession) -> Result<Self, GovernanceError> {
        let token_id = session.config().membership_token_id;
        let addresses = session
            .membership()
            .get_all_claimer_addresses(token_id)
            .await
            .map_err(|e| GovernanceError::read(LedgerRead::ClaimerAddresses, e))?;
        let balances = session
            .token()
            .get_all_holder_balances()
            .await
            .map_err(|e| GovernanceError::read(LedgerRead::HolderBalances, e))?;
        debug!(members = addresses.len(), holders = balances.len(), "roster fetched");

        Ok(Self {
            taken_at: Utc::now(),
            members: build_member_list(&addresses, &balances),
        })
    }

    pub fn total_supply_held(&self) -> u128 {
        self.members
            .iter()
            .map(|m| m.token_amount)
            .fold(0u128, u128::saturating_add)
    }
}
