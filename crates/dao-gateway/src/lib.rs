//! Boundary to the external ledger.
//!
//! The ledger owns every proposal, vote, balance and delegation; this crate
//! only describes the calls the client issues against it. A `LedgerGateway`
//! is constructed once per session and passed explicitly to whatever needs
//! it.

pub mod modules;
pub mod session;
pub mod simulated;


pub use modules::{GovernanceModule, MembershipModule, TokenModule};
pub use session::{GovernanceSession, LedgerGateway};
pub use simulated::{CallKind, LedgerCall, LedgerState, SimulatedLedger};
