use async_trait::async_trait;
use dao_core::{
    Address, AirdropTarget, GatewayError, Proposal, ProposalAction, ProposalId, TokenBalance,
    VoteType,
};
use std::collections::BTreeMap;

/// Governance (vote) module. Writes are issued on behalf of `from`, which the
/// wallet has authorized; they settle only after ledger confirmation.
#[async_trait]
pub trait GovernanceModule: Send + Sync {
    async fn propose(
        &self,
        from: Address,
        description: &str,
        actions: Vec<ProposalAction>,
    ) -> Result<ProposalId, GatewayError>;

    async fn get(&self, proposal_id: &ProposalId) -> Result<Proposal, GatewayError>;

    async fn get_all(&self) -> Result<Vec<Proposal>, GatewayError>;

    async fn vote(
        &self,
        from: Address,
        proposal_id: &ProposalId,
        vote: VoteType,
    ) -> Result<(), GatewayError>;

    async fn execute(&self, from: Address, proposal_id: &ProposalId) -> Result<(), GatewayError>;

    async fn has_voted(
        &self,
        proposal_id: &ProposalId,
        member: Address,
    ) -> Result<bool, GatewayError>;

    /// Treasury holdings of `token`.
    async fn balance_of_token(&self, token: Address) -> Result<TokenBalance, GatewayError>;
}

/// Fungible voting-weight token module.
#[async_trait]
pub trait TokenModule: Send + Sync {
    async fn delegate_to(&self, from: Address, delegatee: Address) -> Result<(), GatewayError>;

    /// `Address::ZERO` when nothing is delegated.
    async fn get_delegation_of(&self, member: Address) -> Result<Address, GatewayError>;

    async fn transfer_batch(
        &self,
        from: Address,
        targets: Vec<AirdropTarget>,
    ) -> Result<(), GatewayError>;

    /// Base-unit balances of every holder.
    async fn get_all_holder_balances(&self) -> Result<BTreeMap<Address, u128>, GatewayError>;
}

/// Membership credential (NFT drop) module.
#[async_trait]
pub trait MembershipModule: Send + Sync {
    async fn claim(&self, from: Address, token_id: u64, quantity: u64) -> Result<(), GatewayError>;

    async fn balance_of(&self, owner: Address, token_id: u64) -> Result<u64, GatewayError>;

    async fn get_all_claimer_addresses(&self, token_id: u64) -> Result<Vec<Address>, GatewayError>;
}
