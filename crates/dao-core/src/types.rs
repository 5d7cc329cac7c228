use crate::validation::is_address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 20-byte ledger identity (wallet, module or treasury).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Sentinel for "no delegation set".
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Short display form used by the member table, e.g. `0x1234...abcd`.
    pub fn shorten(&self) -> String {
        let full = self.to_string();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

/// Returned when a string is not `0x` + 40 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not an address: {0}")]
pub struct AddressParseError(pub String);

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_address(s) {
            return Err(AddressParseError(s.to_string()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(&s[2..], &mut bytes).map_err(|_| AddressParseError(s.to_string()))?;
        Ok(Address(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Opaque proposal identifier assigned by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub String);

impl ProposalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ledger-tracked lifecycle stage of a proposal. Discriminants match the
/// ledger's numeric encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ProposalState {
    Pending = 0,
    Active = 1,
    Canceled = 2,
    Defeated = 3,
    Succeeded = 4,
    Queued = 5,
    Expired = 6,
    Executed = 7,
}

impl ProposalState {
    pub const ALL: [ProposalState; 8] = [
        ProposalState::Pending,
        ProposalState::Active,
        ProposalState::Canceled,
        ProposalState::Defeated,
        ProposalState::Succeeded,
        ProposalState::Queued,
        ProposalState::Expired,
        ProposalState::Executed,
    ];

    /// No further transition is possible from this state.
    pub fn is_terminal(self) -> bool {
        match self {
            ProposalState::Canceled
            | ProposalState::Defeated
            | ProposalState::Expired
            | ProposalState::Executed => true,
            ProposalState::Pending
            | ProposalState::Active
            | ProposalState::Succeeded
            | ProposalState::Queued => false,
        }
    }
}

impl TryFrom<u8> for ProposalState {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ProposalState::ALL
            .get(value as usize)
            .copied()
            .ok_or(value)
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A vote value as declared by a proposal's options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteType(pub u8);

impl VoteType {
    pub const AGAINST: VoteType = VoteType(0);
    pub const FOR: VoteType = VoteType(1);
    pub const ABSTAIN: VoteType = VoteType(2);
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOption {
    #[serde(rename = "type")]
    pub vote_type: VoteType,
    pub label: String,
}

impl VoteOption {
    /// For / Against / Abstain in the order the ledger lists them.
    pub fn standard() -> Vec<VoteOption> {
        vec![
            VoteOption { vote_type: VoteType::FOR, label: "For".into() },
            VoteOption { vote_type: VoteType::AGAINST, label: "Against".into() },
            VoteOption { vote_type: VoteType::ABSTAIN, label: "Abstain".into() },
        ]
    }
}

/// Encoded low-level call bundled into a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalAction {
    pub to_address: Address,
    pub native_token_value: u128,
    #[serde(with = "hex_bytes")]
    pub transaction_data: Vec<u8>,
}

/// Read snapshot of a proposal; stale as soon as it is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub proposal_id: ProposalId,
    pub description: String,
    pub state: ProposalState,
    pub votes: Vec<VoteOption>,
    #[serde(default)]
    pub actions: Vec<ProposalAction>,
}

impl Proposal {
    pub fn declares(&self, vote: VoteType) -> bool {
        self.votes.iter().any(|v| v.vote_type == vote)
    }
}

/// Token balance as reported by the ledger: exact base units plus its
/// human-readable rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub value: u128,
    pub display_value: String,
}

impl TokenBalance {
    pub fn from_base_units(value: u128) -> Self {
        Self {
            value,
            display_value: crate::units::format_units(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirdropTarget {
    pub address: Address,
    /// Base units (18 decimals).
    pub amount: u128,
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}
