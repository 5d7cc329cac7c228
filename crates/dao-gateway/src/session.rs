use crate::modules::{GovernanceModule, MembershipModule, TokenModule};
use crate::simulated::SimulatedLedger;
use dao_core::{Address, DaoConfig, GovernanceError};
use std::sync::Arc;
use tracing::info;

/// Handles to the three ledger modules of one deployment.
#[derive(Clone)]
pub struct LedgerGateway {
    pub governance: Arc<dyn GovernanceModule>,
    pub token: Arc<dyn TokenModule>,
    pub membership: Arc<dyn MembershipModule>,
    pub config: DaoConfig,
}

impl LedgerGateway {
    pub fn new(
        config: DaoConfig,
        governance: Arc<dyn GovernanceModule>,
        token: Arc<dyn TokenModule>,
        membership: Arc<dyn MembershipModule>,
    ) -> Self {
        Self {
            governance,
            token,
            membership,
            config,
        }
    }

    /// All three modules served by one in-memory ledger.
    pub fn simulated(config: DaoConfig, ledger: Arc<SimulatedLedger>) -> Self {
        Self::new(config, ledger.clone(), ledger.clone(), ledger)
    }
}

/// One wallet session. Reads are always available; writes need a connected
/// signer.
pub struct GovernanceSession {
    gateway: LedgerGateway,
    signer: Option<Address>,
}

impl GovernanceSession {
    pub fn start(gateway: LedgerGateway) -> Self {
        info!(
            governance = %gateway.config.governance_module,
            token = %gateway.config.token_module,
            "governance session started"
        );
        Self {
            gateway,
            signer: None,
        }
    }

    pub fn connect(&mut self, signer: Address) {
        info!(%signer, "wallet connected");
        self.signer = Some(signer);
    }

    pub fn disconnect(&mut self) {
        if let Some(signer) = self.signer.take() {
            info!(%signer, "wallet disconnected");
        }
    }

    /// The acting identity, required by every state-changing call.
    pub fn signer(&self) -> Result<Address, GovernanceError> {
        self.signer.ok_or(GovernanceError::WalletNotConnected)
    }

    pub fn is_connected(&self) -> bool {
        self.signer.is_some()
    }

    pub fn gateway(&self) -> &LedgerGateway {
        &self.gateway
    }

    pub fn governance(&self) -> &dyn GovernanceModule {
        self.gateway.governance.as_ref()
    }

    pub fn token(&self) -> &dyn TokenModule {
        self.gateway.token.as_ref()
    }

    pub fn membership(&self) -> &dyn MembershipModule {
        self.gateway.membership.as_ref()
    }

    pub fn config(&self) -> &DaoConfig {
        &self.gateway.config
    }

    /// Tear the session down, returning the gateway for reuse.
    pub fn end(mut self) -> LedgerGateway {
        self.disconnect();
        info!("governance session ended");
        self.gateway
    }
}
