//! Builds the single-call action list bundled into a mint or transfer
//! proposal. The ledger executes it only after the proposal succeeds.

use crate::error::EncodeError;
use crate::types::{Address, ProposalAction};
use crate::units::parse_units;
use serde::{Deserialize, Serialize};

/// `mint(address,uint256)`
pub const MINT_SELECTOR: [u8; 4] = [0x40, 0xc1, 0x0f, 0x19];
/// `transfer(address,uint256)`
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

const WORD: usize = 32;
const CALL_LEN: usize = 4 + 2 * WORD;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProposalKind {
    /// Mint new tokens into the governance treasury.
    Mint,
    /// Transfer treasury tokens to an address.
    Transfer { to: Address },
}

/// Decoded form of an action's calldata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCall {
    Mint { to: Address, amount: u128 },
    Transfer { to: Address, amount: u128 },
}

/// Encode `mint(governance, amount*10^18)` or `transfer(to, amount*10^18)`
/// against the token module.
pub fn encode_action(
    kind: &ProposalKind,
    amount_whole: &str,
    governance_address: Address,
    token_address: Address,
) -> Result<Vec<ProposalAction>, EncodeError> {
    let amount = parse_units(amount_whole)?;
    let (selector, recipient) = match kind {
        ProposalKind::Mint => (MINT_SELECTOR, governance_address),
        ProposalKind::Transfer { to } => (TRANSFER_SELECTOR, *to),
    };

    let mut data = Vec::with_capacity(CALL_LEN);
    data.extend_from_slice(&selector);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&recipient.0);
    data.extend_from_slice(&[0u8; 16]);
    data.extend_from_slice(&amount.to_be_bytes());

    Ok(vec![ProposalAction {
        to_address: token_address,
        native_token_value: 0,
        transaction_data: data,
    }])
}

impl ProposalAction {
    /// Recognize the two call shapes this client produces. Anything else
    /// (including amounts above `u128`) yields `None`.
    pub fn decode_token_call(&self) -> Option<TokenCall> {
        let data = &self.transaction_data;
        if data.len() != CALL_LEN {
            return None;
        }
        let (selector, args) = data.split_at(4);
        let (addr_word, amount_word) = args.split_at(WORD);
        if addr_word[..12].iter().any(|b| *b != 0) || amount_word[..16].iter().any(|b| *b != 0) {
            return None;
        }
        let mut to = [0u8; 20];
        to.copy_from_slice(&addr_word[12..]);
        let mut amount = [0u8; 16];
        amount.copy_from_slice(&amount_word[16..]);
        let to = Address(to);
        let amount = u128::from_be_bytes(amount);

        if selector == MINT_SELECTOR {
            Some(TokenCall::Mint { to, amount })
        } else if selector == TRANSFER_SELECTOR {
            Some(TokenCall::Transfer { to, amount })
        } else {
            None
        }
    }
}
