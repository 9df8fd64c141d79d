use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::KvStore;
use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StorageError};

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Set(BTreeSet<String>),
    List(Vec<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<DateTime<Utc>>,
}

/// In-process store with Redis semantics for the commands the app uses.
///
/// Used for local runs without a configured store and throughout the tests.
/// Expiry is evaluated lazily against the injected clock.
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn deadline(&self, ttl: Option<Duration>) -> Option<DateTime<Utc>> {
        ttl.and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .map(|ttl| self.clock.now() + ttl)
    }

    fn purge_expired(&self, entries: &mut HashMap<String, Entry>, key: &str) {
        let now = self.clock.now();
        if entries
            .get(key)
            .and_then(|e| e.expires_at)
            .is_some_and(|at| at <= now)
        {
            entries.remove(key);
        }
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

fn wrong_type(key: &str) -> StorageError {
    StorageError::Kv(format!(
        "WRONGTYPE Operation against a key holding the wrong kind of value: {}",
        key
    ))
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        self.purge_expired(&mut entries, key);

        match entries.get(key).map(|e| &e.value) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s.clone())),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let mut entries = self.entries.lock().await;

        Ok(keys
            .iter()
            .map(|key| {
                self.purge_expired(&mut entries, key);
                match entries.get(key).map(|e| &e.value) {
                    Some(Value::Str(s)) => Some(s.clone()),
                    _ => None,
                }
            })
            .collect())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let expires_at = self.deadline(ttl);
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value.to_string()),
                expires_at,
            },
        );
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<bool> {
        let expires_at = self.deadline(ttl);
        let mut entries = self.entries.lock().await;
        self.purge_expired(&mut entries, key);

        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value.to_string()),
                expires_at,
            },
        );
        Ok(true)
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut entries = self.entries.lock().await;
        self.purge_expired(&mut entries, key);

        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: Value::Str("0".to_string()),
            expires_at: None,
        });

        let Value::Str(current) = &entry.value else {
            return Err(wrong_type(key));
        };
        let next = current
            .parse::<i64>()
            .map_err(|_| StorageError::Kv("ERR value is not an integer or out of range".into()))?
            + 1;
        entry.value = Value::Str(next.to_string());

        Ok(next)
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        self.purge_expired(&mut entries, key);
        Ok(entries.remove(key).is_some())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let expires_at = self.deadline(Some(ttl));
        let mut entries = self.entries.lock().await;
        self.purge_expired(&mut entries, key);

        match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = expires_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn sadd(&self, set: &str, member: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        self.purge_expired(&mut entries, set);

        let entry = entries.entry(set.to_string()).or_insert_with(|| Entry {
            value: Value::Set(BTreeSet::new()),
            expires_at: None,
        });

        match &mut entry.value {
            Value::Set(members) => Ok(members.insert(member.to_string())),
            _ => Err(wrong_type(set)),
        }
    }

    async fn smembers(&self, set: &str) -> Result<Vec<String>> {
        let mut entries = self.entries.lock().await;
        self.purge_expired(&mut entries, set);

        match entries.get(set).map(|e| &e.value) {
            None => Ok(Vec::new()),
            Some(Value::Set(members)) => Ok(members.iter().cloned().collect()),
            Some(_) => Err(wrong_type(set)),
        }
    }

    async fn rpush(&self, list: &str, value: &str) -> Result<i64> {
        let mut entries = self.entries.lock().await;
        self.purge_expired(&mut entries, list);

        let entry = entries.entry(list.to_string()).or_insert_with(|| Entry {
            value: Value::List(Vec::new()),
            expires_at: None,
        });

        match &mut entry.value {
            Value::List(items) => {
                items.push(value.to_string());
                Ok(items.len() as i64)
            }
            _ => Err(wrong_type(list)),
        }
    }
}
