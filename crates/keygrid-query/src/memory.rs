//! In-memory gateway backed by a sorted map. Used by tests and as a
//! lightweight fixture for downstream consumers; listing semantics match
//! the store contract exactly, so the shapers can be exercised without a
//! live store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::gateway::{GatewayError, GatewayResult, KvGateway};

/// `BTreeMap`-backed [`KvGateway`] implementation. Lexical listing order
/// falls out of the map's key ordering.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    entries: RwLock<BTreeMap<String, String>>,
    fault: RwLock<Option<GatewayError>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a gateway pre-populated with the given entries.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
            fault: RwLock::new(None),
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().await.insert(key.into(), value.into());
    }

    pub async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Makes every subsequent call fail with `error`, for failure-path tests.
    pub async fn fail_with(&self, error: GatewayError) {
        *self.fault.write().await = Some(error);
    }

    async fn check_fault(&self) -> GatewayResult<()> {
        match self.fault.read().await.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl KvGateway for MemoryGateway {
    async fn get(&self, key: &str) -> GatewayResult<Option<String>> {
        self.check_fault().await?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn list_keys(&self, prefix: &str, separator: &str) -> GatewayResult<Vec<String>> {
        self.check_fault().await?;

        let entries = self.entries.read().await;
        let mut keys: Vec<String> = Vec::new();
        for key in entries.keys() {
            let Some(rest) = key.strip_prefix(prefix) else {
                continue;
            };
            let listed = if separator.is_empty() {
                key.clone()
            } else {
                match rest.find(separator) {
                    // Truncate past the first separator after the prefix, so
                    // a subtree shows up once as "<prefix><child><separator>".
                    Some(idx) => key[..prefix.len() + idx + separator.len()].to_string(),
                    None => key.clone(),
                }
            };
            if keys.last() != Some(&listed) {
                keys.push(listed);
            }
        }
        Ok(keys)
    }

    async fn probe(&self) -> GatewayResult<()> {
        self.check_fault().await
    }
}
