use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::KvStore;
use crate::error::{Result, StorageError};

/// Client for a Redis-compatible store exposed over the Upstash REST protocol.
///
/// Each command is sent as a JSON array (`["SET", "key", "value"]`) in a POST
/// to the base URL, authenticated with a bearer token. The store replies with
/// `{"result": ...}` or `{"error": "..."}`.
pub struct RestKvStore {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl RestKvStore {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    async fn command(&self, args: &[&str]) -> Result<Value> {
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        let reply: RestReply = serde_json::from_str(&text).map_err(|_| {
            StorageError::Kv(format!("unexpected reply ({}): {}", status, text))
        })?;

        if let Some(error) = reply.error {
            return Err(StorageError::Kv(error));
        }
        if !status.is_success() {
            return Err(StorageError::Kv(format!("store answered {}", status)));
        }

        Ok(reply.result)
    }
}

fn ttl_secs(ttl: Duration) -> String {
    ttl.as_secs().max(1).to_string()
}

fn as_opt_string(value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(StorageError::Kv(format!("expected string, got {}", other))),
    }
}

fn as_i64(value: Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| StorageError::Kv(format!("expected integer, got {}", n))),
        Value::String(s) => s
            .parse()
            .map_err(|_| StorageError::Kv(format!("expected integer, got {}", s))),
        other => Err(StorageError::Kv(format!("expected integer, got {}", other))),
    }
}

#[async_trait]
impl KvStore for RestKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        as_opt_string(self.command(&["GET", key]).await?)
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut args = Vec::with_capacity(keys.len() + 1);
        args.push("MGET");
        args.extend(keys.iter().map(String::as_str));

        match self.command(&args).await? {
            Value::Array(values) => values.into_iter().map(as_opt_string).collect(),
            other => Err(StorageError::Kv(format!("expected array, got {}", other))),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        match ttl {
            Some(ttl) => {
                let secs = ttl_secs(ttl);
                self.command(&["SET", key, value, "EX", &secs]).await?;
            }
            None => {
                self.command(&["SET", key, value]).await?;
            }
        }
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<bool> {
        let reply = match ttl {
            Some(ttl) => {
                let secs = ttl_secs(ttl);
                self.command(&["SET", key, value, "NX", "EX", &secs]).await?
            }
            None => self.command(&["SET", key, value, "NX"]).await?,
        };

        Ok(!reply.is_null())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        as_i64(self.command(&["INCR", key]).await?)
    }

    async fn del(&self, key: &str) -> Result<bool> {
        Ok(as_i64(self.command(&["DEL", key]).await?)? > 0)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let secs = ttl_secs(ttl);
        Ok(as_i64(self.command(&["EXPIRE", key, &secs]).await?)? == 1)
    }

    async fn sadd(&self, set: &str, member: &str) -> Result<bool> {
        Ok(as_i64(self.command(&["SADD", set, member]).await?)? == 1)
    }

    async fn smembers(&self, set: &str) -> Result<Vec<String>> {
        match self.command(&["SMEMBERS", set]).await? {
            Value::Null => Ok(Vec::new()),
            Value::Array(values) => values
                .into_iter()
                .map(|v| as_opt_string(v).map(Option::unwrap_or_default))
                .collect(),
            other => Err(StorageError::Kv(format!("expected array, got {}", other))),
        }
    }

    async fn rpush(&self, list: &str, value: &str) -> Result<i64> {
        as_i64(self.command(&["RPUSH", list, value]).await?)
    }
}
