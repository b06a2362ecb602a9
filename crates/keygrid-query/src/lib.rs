//! # keygrid-query
//!
//! Core translation engine mapping panel queries onto a hierarchical
//! key-value store.
//!
//! A batch of `(identifier, JSON payload)` items is decoded into query
//! models, routed by output format to one of two shapers, evaluated against
//! the store's read capabilities, and aggregated into a result map keyed by
//! identifier.
//!
//! ## Architecture
//!
//! - **`path`**: pure key helpers (trailing-slash normalization, `\.`
//!   unescaping, relative column resolution, wildcard compilation)
//! - **`gateway`**: the [`KvGateway`] capability trait the engine consumes
//! - **`parse`**: per-item payload decoding with attached per-query errors
//! - **`timeseries`** / **`table`**: the two result shapers
//! - **`dispatch`**: batch routing, aggregation and cancellation
//! - **`memory`**: an in-memory gateway for tests and fixtures
//!
//! ## Example
//!
//! ```rust,no_run
//! use keygrid_query::{run_batch, BatchItem, MemoryGateway};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), keygrid_query::BatchError> {
//! let gateway = MemoryGateway::from_entries([("env/prod/replicas", "3")]);
//! let items = vec![BatchItem {
//!     ref_id: "A".to_string(),
//!     payload: serde_json::json!({ "target": "env/prod/replicas" }),
//! }];
//!
//! let results = run_batch(&gateway, &items, &CancellationToken::new()).await?;
//! assert!(results["A"].is_ok());
//! # Ok(())
//! # }
//! ```

pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod parse;
pub mod path;
pub mod table;
pub mod timeseries;
pub mod types;

// Re-export commonly used items
pub use dispatch::run_batch;
pub use error::{BatchError, QueryError, Result};
pub use gateway::{GatewayError, GatewayResult, KvGateway};
pub use memory::MemoryGateway;
pub use types::{
    BatchItem, BatchResults, Cell, DataPoint, QueryData, QueryModel, Series, Table, NOT_FOUND,
};
