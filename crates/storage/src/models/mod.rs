mod effort;
mod game;
mod participant;
mod segment;

pub use effort::{Effort, best_effort};
pub use game::{GameMode, Roster, VoteOutcome, VotePolicy, VoteRecord, VoteRejection};
pub use participant::Participant;
pub use segment::{Category, DateWindow, Segment};
