//! # Key-value store
//!
//! Single source of truth for the competition: participant registry, votes,
//! per-day tallies and cached day rankings. Every value is a string; numeric
//! and JSON encoding is the caller's job.
//!
//! The store must provide atomic `INCR` and atomic create-if-absent with
//! expiry (`SET .. NX EX ..`); vote admission relies on the latter.

mod memory;
mod rest;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryKvStore;
pub use rest::RestKvStore;

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// One entry per key, `None` for missing keys.
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Sets `key` only if it does not exist yet. Returns whether it was written.
    async fn set_nx(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<bool>;

    /// Returns the value after the increment.
    async fn incr(&self, key: &str) -> Result<i64>;

    async fn del(&self, key: &str) -> Result<bool>;

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// Returns whether the member was newly added.
    async fn sadd(&self, set: &str, member: &str) -> Result<bool>;

    async fn smembers(&self, set: &str) -> Result<Vec<String>>;

    /// Returns the list length after the push.
    async fn rpush(&self, list: &str, value: &str) -> Result<i64>;
}

/// Parses a stored counter, treating absent or malformed values as zero.
pub fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .map(|v| v.max(0) as u64)
        .unwrap_or(0)
}
