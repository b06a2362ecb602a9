//! Capability surface of the hierarchical key-value store.
//!
//! The engine only ever reads: one value by exact key, or a key listing
//! under a prefix with an optional stop-separator. Both calls may block and
//! may fail independently; retry policy belongs to the implementation.

use async_trait::async_trait;
use thiserror::Error;

/// Error raised by a gateway call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("store returned status {0}")]
    UnexpectedStatus(u16),

    #[error("invalid response body: {0}")]
    InvalidResponse(String),
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Read-only access to a hierarchical key-value store.
///
/// Keys are `/`-delimited paths. Implementations must preserve the store's
/// lexical key order in listings, since table row order is derived from it.
#[async_trait]
pub trait KvGateway: Send + Sync {
    /// Read a single value by its full key. `Ok(None)` means the key does
    /// not exist.
    async fn get(&self, key: &str) -> GatewayResult<Option<String>>;

    /// List keys under `prefix`.
    ///
    /// With an empty `separator` the full subtree is returned. With a
    /// non-empty separator, keys are truncated after the first separator
    /// occurrence past the prefix and deduplicated, which yields the
    /// immediate children of the prefix (subtrees appear once, with a
    /// trailing separator).
    async fn list_keys(&self, prefix: &str, separator: &str) -> GatewayResult<Vec<String>>;

    /// Lightweight liveness probe against the store, used by the health
    /// check and by `test` queries. Not a key read.
    async fn probe(&self) -> GatewayResult<()>;
}
