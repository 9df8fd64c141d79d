pub mod competition;
pub mod game;
pub mod participant;
pub mod ranking;
