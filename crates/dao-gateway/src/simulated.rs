//! In-memory ledger serving all three modules.
//!
//! Keeps enough of the real ledger's rules (voting window, one vote per
//! voter, quorum, execute-once) for the client to be exercised end to end,
//! plus hooks to script proposal states, inject one-shot failures and
//! inspect the ordered call log.

use crate::modules::{GovernanceModule, MembershipModule, TokenModule};
use async_trait::async_trait;
use dao_core::{
    Address, AirdropTarget, DaoConfig, GatewayError, Proposal, ProposalAction, ProposalId,
    ProposalState, TokenBalance, TokenCall, VoteOption, VoteType,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tally {
    pub for_weight: u128,
    pub against_weight: u128,
    pub abstain_weight: u128,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimProposal {
    pub proposal: Proposal,
    pub proposer: Address,
    pub tally: Tally,
    pub voters: BTreeSet<Address>,
}

/// Persistable ledger contents.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerState {
    pub governance_address: Address,
    pub token_address: Address,
    pub next_proposal_id: u64,
    /// For-weight (base units) a proposal needs to succeed.
    pub quorum: u128,
    pub proposals: BTreeMap<ProposalId, SimProposal>,
    pub balances: BTreeMap<Address, u128>,
    pub delegations: BTreeMap<Address, Address>,
    /// token id -> holder -> quantity
    pub claims: BTreeMap<u64, BTreeMap<Address, u64>>,
}

impl LedgerState {
    pub fn new(config: &DaoConfig, quorum: u128) -> Self {
        Self {
            governance_address: config.governance_module,
            token_address: config.token_module,
            next_proposal_id: 0,
            quorum,
            proposals: BTreeMap::new(),
            balances: BTreeMap::new(),
            delegations: BTreeMap::new(),
            claims: BTreeMap::new(),
        }
    }

    fn balance(&self, who: Address) -> u128 {
        self.balances.get(&who).copied().unwrap_or(0)
    }

    /// Weight delegated to `delegatee` by every holder.
    fn voting_weight(&self, delegatee: Address) -> u128 {
        self.delegations
            .iter()
            .filter(|(_, to)| **to == delegatee)
            .map(|(from, _)| self.balance(*from))
            .fold(0u128, u128::saturating_add)
    }

    fn debit(&mut self, who: Address, amount: u128) -> Result<(), GatewayError> {
        let have = self.balance(who);
        if have < amount {
            return Err(GatewayError::Rejected(format!(
                "insufficient balance for {who}: have {have}, need {amount}"
            )));
        }
        self.balances.insert(who, have - amount);
        Ok(())
    }

    fn credit(&mut self, who: Address, amount: u128) -> Result<(), GatewayError> {
        let balance = self.balances.entry(who).or_insert(0);
        *balance = balance.checked_add(amount).ok_or_else(|| {
            GatewayError::Rejected(format!("balance of {who} would overflow"))
        })?;
        Ok(())
    }

    fn apply_action(&mut self, action: &ProposalAction) -> Result<(), GatewayError> {
        if action.to_address != self.token_address {
            return Err(GatewayError::Rejected(format!(
                "unknown action target {}",
                action.to_address
            )));
        }
        match action.decode_token_call() {
            Some(TokenCall::Mint { to, amount }) => self.credit(to, amount),
            Some(TokenCall::Transfer { to, amount }) => {
                self.debit(self.governance_address, amount)?;
                self.credit(to, amount)
            }
            None => Err(GatewayError::Rejected("undecodable action calldata".into())),
        }
    }
}

/// One remote call as observed by the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerCall {
    Propose { from: Address, description: String },
    Get(ProposalId),
    GetAll,
    Vote { from: Address, proposal_id: ProposalId, vote: VoteType },
    Execute { from: Address, proposal_id: ProposalId },
    HasVoted { proposal_id: ProposalId, member: Address },
    BalanceOfToken(Address),
    DelegateTo { from: Address, delegatee: Address },
    GetDelegationOf(Address),
    TransferBatch { from: Address, targets: usize },
    GetAllHolderBalances,
    Claim { from: Address, token_id: u64, quantity: u64 },
    BalanceOf { owner: Address, token_id: u64 },
    GetAllClaimerAddresses(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
    Propose,
    Get,
    GetAll,
    Vote,
    Execute,
    HasVoted,
    BalanceOfToken,
    DelegateTo,
    GetDelegationOf,
    TransferBatch,
    GetAllHolderBalances,
    Claim,
    BalanceOf,
    GetAllClaimerAddresses,
}

impl LedgerCall {
    pub fn kind(&self) -> CallKind {
        match self {
            LedgerCall::Propose { .. } => CallKind::Propose,
            LedgerCall::Get(_) => CallKind::Get,
            LedgerCall::GetAll => CallKind::GetAll,
            LedgerCall::Vote { .. } => CallKind::Vote,
            LedgerCall::Execute { .. } => CallKind::Execute,
            LedgerCall::HasVoted { .. } => CallKind::HasVoted,
            LedgerCall::BalanceOfToken(_) => CallKind::BalanceOfToken,
            LedgerCall::DelegateTo { .. } => CallKind::DelegateTo,
            LedgerCall::GetDelegationOf(_) => CallKind::GetDelegationOf,
            LedgerCall::TransferBatch { .. } => CallKind::TransferBatch,
            LedgerCall::GetAllHolderBalances => CallKind::GetAllHolderBalances,
            LedgerCall::Claim { .. } => CallKind::Claim,
            LedgerCall::BalanceOf { .. } => CallKind::BalanceOf,
            LedgerCall::GetAllClaimerAddresses(_) => CallKind::GetAllClaimerAddresses,
        }
    }
}

#[derive(Default)]
struct Harness {
    calls: Vec<LedgerCall>,
    scripted_states: HashMap<ProposalId, VecDeque<ProposalState>>,
    /// call kind -> (matching calls still to let through, error)
    failures: HashMap<CallKind, (usize, GatewayError)>,
}

pub struct SimulatedLedger {
    state: Mutex<LedgerState>,
    harness: Mutex<Harness>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SimulatedLedger {
    pub fn new(config: &DaoConfig, quorum: u128) -> Self {
        Self::from_state(LedgerState::new(config, quorum))
    }

    pub fn from_state(state: LedgerState) -> Self {
        Self {
            state: Mutex::new(state),
            harness: Mutex::new(Harness::default()),
        }
    }

    pub fn snapshot(&self) -> LedgerState {
        lock(&self.state).clone()
    }

    /// Saturates at `u128::MAX`.
    pub fn fund(&self, who: Address, amount: u128) {
        let mut ledger = lock(&self.state);
        let balance = ledger.balances.entry(who).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn set_delegation(&self, member: Address, delegatee: Address) {
        lock(&self.state).delegations.insert(member, delegatee);
    }

    pub fn grant_membership(&self, member: Address, token_id: u64) {
        let mut ledger = lock(&self.state);
        let held = ledger.claims.entry(token_id).or_default().entry(member).or_insert(0);
        *held = held.saturating_add(1);
    }

    /// Force a proposal into `state`, as the passage of ledger time would.
    pub fn set_state(&self, proposal_id: &ProposalId, state: ProposalState) -> Result<(), GatewayError> {
        let mut ledger = lock(&self.state);
        let entry = ledger
            .proposals
            .get_mut(proposal_id)
            .ok_or_else(|| GatewayError::NotFound(proposal_id.clone()))?;
        entry.proposal.state = state;
        Ok(())
    }

    /// Insert a proposal directly, bypassing `propose`.
    pub fn insert_proposal(&self, proposal: Proposal, proposer: Address) {
        let mut ledger = lock(&self.state);
        ledger.proposals.insert(
            proposal.proposal_id.clone(),
            SimProposal {
                proposal,
                proposer,
                tally: Tally::default(),
                voters: BTreeSet::new(),
            },
        );
    }

    /// States returned (and adopted) by the next `get` calls on a proposal,
    /// in order. Once drained, `get` reports the stored state again.
    pub fn script_states(&self, proposal_id: &ProposalId, states: impl IntoIterator<Item = ProposalState>) {
        lock(&self.harness)
            .scripted_states
            .entry(proposal_id.clone())
            .or_default()
            .extend(states);
    }

    /// Fail the next call of `kind` with `error`.
    pub fn fail_next(&self, kind: CallKind, error: GatewayError) {
        self.fail_nth(kind, 0, error);
    }

    /// Let `skip` calls of `kind` through, then fail the one after with `error`.
    pub fn fail_nth(&self, kind: CallKind, skip: usize, error: GatewayError) {
        lock(&self.harness).failures.insert(kind, (skip, error));
    }

    pub fn calls(&self) -> Vec<LedgerCall> {
        lock(&self.harness).calls.clone()
    }

    pub fn calls_of(&self, kind: CallKind) -> usize {
        lock(&self.harness)
            .calls
            .iter()
            .filter(|c| c.kind() == kind)
            .count()
    }

    pub fn clear_calls(&self) {
        lock(&self.harness).calls.clear();
    }

    fn record(&self, call: LedgerCall) -> Result<(), GatewayError> {
        debug!(?call, "simulated ledger call");
        let mut harness = lock(&self.harness);
        let kind = call.kind();
        harness.calls.push(call);
        match harness.failures.get_mut(&kind) {
            Some((0, _)) => match harness.failures.remove(&kind) {
                Some((_, err)) => Err(err),
                None => Ok(()),
            },
            Some((skip, _)) => {
                *skip -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn next_scripted_state(&self, proposal_id: &ProposalId) -> Option<ProposalState> {
        lock(&self.harness)
            .scripted_states
            .get_mut(proposal_id)
            .and_then(|q| q.pop_front())
    }
}

#[async_trait]
impl GovernanceModule for SimulatedLedger {
    async fn propose(
        &self,
        from: Address,
        description: &str,
        actions: Vec<ProposalAction>,
    ) -> Result<ProposalId, GatewayError> {
        self.record(LedgerCall::Propose {
            from,
            description: description.to_string(),
        })?;
        if actions.is_empty() {
            return Err(GatewayError::Rejected("proposal has no actions".into()));
        }
        let mut ledger = lock(&self.state);
        let proposal_id = ProposalId::new(ledger.next_proposal_id.to_string());
        ledger.next_proposal_id += 1;
        ledger.proposals.insert(
            proposal_id.clone(),
            SimProposal {
                proposal: Proposal {
                    proposal_id: proposal_id.clone(),
                    description: description.to_string(),
                    state: ProposalState::Pending,
                    votes: VoteOption::standard(),
                    actions,
                },
                proposer: from,
                tally: Tally::default(),
                voters: BTreeSet::new(),
            },
        );
        Ok(proposal_id)
    }

    async fn get(&self, proposal_id: &ProposalId) -> Result<Proposal, GatewayError> {
        self.record(LedgerCall::Get(proposal_id.clone()))?;
        let scripted = self.next_scripted_state(proposal_id);
        let mut ledger = lock(&self.state);
        let entry = ledger
            .proposals
            .get_mut(proposal_id)
            .ok_or_else(|| GatewayError::NotFound(proposal_id.clone()))?;
        if let Some(state) = scripted {
            entry.proposal.state = state;
        }
        Ok(entry.proposal.clone())
    }

    async fn get_all(&self) -> Result<Vec<Proposal>, GatewayError> {
        self.record(LedgerCall::GetAll)?;
        Ok(lock(&self.state)
            .proposals
            .values()
            .map(|p| p.proposal.clone())
            .collect())
    }

    async fn vote(
        &self,
        from: Address,
        proposal_id: &ProposalId,
        vote: VoteType,
    ) -> Result<(), GatewayError> {
        self.record(LedgerCall::Vote {
            from,
            proposal_id: proposal_id.clone(),
            vote,
        })?;
        let mut ledger = lock(&self.state);
        let weight = ledger.voting_weight(from);
        let quorum = ledger.quorum;
        let entry = ledger
            .proposals
            .get_mut(proposal_id)
            .ok_or_else(|| GatewayError::NotFound(proposal_id.clone()))?;
        if entry.proposal.state != ProposalState::Active {
            return Err(GatewayError::Rejected(format!(
                "proposal {proposal_id} is {} and not open for voting",
                entry.proposal.state
            )));
        }
        if !entry.proposal.declares(vote) {
            return Err(GatewayError::Rejected(format!("invalid vote type {vote}")));
        }
        if entry.voters.contains(&from) {
            return Err(GatewayError::Rejected(format!("{from} already voted")));
        }
        let mut tally = entry.tally.clone();
        let bucket = match vote {
            VoteType::FOR => &mut tally.for_weight,
            VoteType::AGAINST => &mut tally.against_weight,
            _ => &mut tally.abstain_weight,
        };
        *bucket = bucket
            .checked_add(weight)
            .ok_or_else(|| GatewayError::Rejected(format!("tally of {proposal_id} would overflow")))?;
        entry.tally = tally;
        entry.voters.insert(from);
        if entry.tally.for_weight >= quorum
            && entry.tally.for_weight > entry.tally.against_weight
        {
            entry.proposal.state = ProposalState::Succeeded;
        }
        Ok(())
    }

    async fn execute(&self, from: Address, proposal_id: &ProposalId) -> Result<(), GatewayError> {
        self.record(LedgerCall::Execute {
            from,
            proposal_id: proposal_id.clone(),
        })?;
        let mut ledger = lock(&self.state);
        let entry = ledger
            .proposals
            .get(proposal_id)
            .ok_or_else(|| GatewayError::NotFound(proposal_id.clone()))?;
        match entry.proposal.state {
            ProposalState::Succeeded => {}
            ProposalState::Executed => {
                return Err(GatewayError::AlreadyExecuted(proposal_id.clone()))
            }
            other => {
                return Err(GatewayError::Rejected(format!(
                    "proposal {proposal_id} is {other} and cannot be executed"
                )))
            }
        }
        let actions = entry.proposal.actions.clone();
        // Actions run atomically: stage on a copy, commit on success.
        let mut staged = ledger.clone();
        for action in &actions {
            staged.apply_action(action)?;
        }
        if let Some(entry) = staged.proposals.get_mut(proposal_id) {
            entry.proposal.state = ProposalState::Executed;
        }
        *ledger = staged;
        Ok(())
    }

    async fn has_voted(
        &self,
        proposal_id: &ProposalId,
        member: Address,
    ) -> Result<bool, GatewayError> {
        self.record(LedgerCall::HasVoted {
            proposal_id: proposal_id.clone(),
            member,
        })?;
        let ledger = lock(&self.state);
        let entry = ledger
            .proposals
            .get(proposal_id)
            .ok_or_else(|| GatewayError::NotFound(proposal_id.clone()))?;
        Ok(entry.voters.contains(&member))
    }

    async fn balance_of_token(&self, token: Address) -> Result<TokenBalance, GatewayError> {
        self.record(LedgerCall::BalanceOfToken(token))?;
        let ledger = lock(&self.state);
        let value = if token == ledger.token_address {
            ledger.balance(ledger.governance_address)
        } else {
            0
        };
        Ok(TokenBalance::from_base_units(value))
    }
}

#[async_trait]
impl TokenModule for SimulatedLedger {
    async fn delegate_to(&self, from: Address, delegatee: Address) -> Result<(), GatewayError> {
        self.record(LedgerCall::DelegateTo { from, delegatee })?;
        lock(&self.state).delegations.insert(from, delegatee);
        Ok(())
    }

    async fn get_delegation_of(&self, member: Address) -> Result<Address, GatewayError> {
        self.record(LedgerCall::GetDelegationOf(member))?;
        Ok(lock(&self.state)
            .delegations
            .get(&member)
            .copied()
            .unwrap_or(Address::ZERO))
    }

    async fn transfer_batch(
        &self,
        from: Address,
        targets: Vec<AirdropTarget>,
    ) -> Result<(), GatewayError> {
        self.record(LedgerCall::TransferBatch {
            from,
            targets: targets.len(),
        })?;
        let mut ledger = lock(&self.state);
        let total = targets
            .iter()
            .try_fold(0u128, |acc, t| acc.checked_add(t.amount))
            .ok_or_else(|| GatewayError::Rejected("batch total overflows".into()))?;
        // All-or-nothing, as with execute.
        let mut staged = ledger.clone();
        staged.debit(from, total)?;
        for target in targets {
            staged.credit(target.address, target.amount)?;
        }
        *ledger = staged;
        Ok(())
    }

    async fn get_all_holder_balances(&self) -> Result<BTreeMap<Address, u128>, GatewayError> {
        self.record(LedgerCall::GetAllHolderBalances)?;
        Ok(lock(&self.state)
            .balances
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(a, amount)| (*a, *amount))
            .collect())
    }
}

#[async_trait]
impl MembershipModule for SimulatedLedger {
    async fn claim(&self, from: Address, token_id: u64, quantity: u64) -> Result<(), GatewayError> {
        self.record(LedgerCall::Claim {
            from,
            token_id,
            quantity,
        })?;
        let mut ledger = lock(&self.state);
        let held = ledger.claims.entry(token_id).or_default().entry(from).or_insert(0);
        *held = held
            .checked_add(quantity)
            .ok_or_else(|| GatewayError::Rejected(format!("claim count of {from} would overflow")))?;
        Ok(())
    }

    async fn balance_of(&self, owner: Address, token_id: u64) -> Result<u64, GatewayError> {
        self.record(LedgerCall::BalanceOf { owner, token_id })?;
        Ok(lock(&self.state)
            .claims
            .get(&token_id)
            .and_then(|holders| holders.get(&owner))
            .copied()
            .unwrap_or(0))
    }

    async fn get_all_claimer_addresses(&self, token_id: u64) -> Result<Vec<Address>, GatewayError> {
        self.record(LedgerCall::GetAllClaimerAddresses(token_id))?;
        Ok(lock(&self.state)
            .claims
            .get(&token_id)
            .map(|holders| {
                holders
                    .iter()
                    .filter(|(_, qty)| **qty > 0)
                    .map(|(a, _)| *a)
                    .collect()
            })
            .unwrap_or_default())
    }
}
