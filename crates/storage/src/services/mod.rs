pub mod ledger;
pub mod ranking;
pub mod stats;
pub mod trophies;
