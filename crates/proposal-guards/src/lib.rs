pub mod coordinator;
pub mod delegation;
pub mod submission;
pub mod view;


pub use coordinator::{list_proposals, Ballot, Execution, ProposalCoordinator, VoteOutcome};
pub use delegation::ensure_delegated;
pub use submission::{submit_proposal, DraftKind, ProposalDraft};
pub use view::{Outcome, ProposalView, DEFAULT_VOTE};
