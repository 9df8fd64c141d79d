pub mod cache;
pub mod clock;
pub mod day;
pub mod dto;
pub mod error;
pub mod keys;
pub mod kv;
pub mod models;
pub mod provider;
pub mod repository;
pub mod services;

pub use cache::TtlCache;
pub use clock::{Clock, SystemClock};
pub use day::{DayBoundary, GameDay};
pub use kv::{KvStore, MemoryKvStore, RestKvStore};
pub use provider::{ProviderError, SegmentProvider};
