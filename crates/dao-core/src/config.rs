use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Module addresses and membership parameters for one DAO deployment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaoConfig {
    pub governance_module: Address,
    pub token_module: Address,
    pub membership_module: Address,
    #[serde(default)]
    pub membership_token_id: u64,
    #[serde(default)]
    pub airdrop: AirdropConfig,
}

/// Whole-token range each claimer receives in an airdrop.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AirdropConfig {
    pub min_amount: u64,
    pub max_amount: u64,
}

impl Default for AirdropConfig {
    fn default() -> Self {
        Self {
            min_amount: 1_000,
            max_amount: 10_000,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0} module address must not be zero")]
    ZeroModule(&'static str),
    #[error("airdrop range is empty (min {min} > max {max})")]
    EmptyAirdropRange { min: u64, max: u64 },
}

impl DaoConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: DaoConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, addr) in [
            ("governance", self.governance_module),
            ("token", self.token_module),
            ("membership", self.membership_module),
        ] {
            if addr.is_zero() {
                return Err(ConfigError::ZeroModule(name));
            }
        }
        if self.airdrop.min_amount > self.airdrop.max_amount {
            return Err(ConfigError::EmptyAirdropRange {
                min: self.airdrop.min_amount,
                max: self.airdrop.max_amount,
            });
        }
        Ok(())
    }
}
