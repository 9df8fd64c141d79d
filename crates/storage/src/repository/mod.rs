pub mod participant;
pub mod vote;
