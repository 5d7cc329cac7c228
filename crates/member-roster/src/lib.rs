pub mod airdrop;
pub mod membership;
pub mod roster;


pub use airdrop::{plan_airdrop, run_airdrop, run_airdrop_with};
pub use membership::{claim_membership, has_membership};
pub use roster::{build_member_list, MemberSnapshot, RosterSnapshot};
