pub mod config;
pub mod encoder;
pub mod error;
pub mod types;
pub mod units;
pub mod validation;

#[cfg(test)]
mod tests;

pub use config::{AirdropConfig, ConfigError, DaoConfig};
pub use encoder::{encode_action, ProposalKind, TokenCall};
pub use error::{EncodeError, GatewayError, GovernanceError, LedgerRead};
pub use types::*;
pub use units::{format_units, parse_units, whole_to_base, TOKEN_DECIMALS};
pub use validation::{is_address, is_numeric};
