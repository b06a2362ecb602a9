//! Batch routing and result aggregation.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{BatchError, QueryError};
use crate::gateway::KvGateway;
use crate::parse::{self, ParsedQuery};
use crate::types::{BatchItem, BatchResults, QueryData, QueryModel};
use crate::{table, timeseries};

/// Evaluates a whole batch against one gateway.
///
/// Queries are evaluated sequentially; each failure stays scoped to its
/// identifier. An empty batch is the only whole-request error. A fired
/// cancellation token converts the in-flight and remaining queries to
/// cancellation errors while completed identifiers keep their results.
pub async fn run_batch(
    gateway: &dyn KvGateway,
    items: &[BatchItem],
    cancel: &CancellationToken,
) -> Result<BatchResults, BatchError> {
    if items.is_empty() {
        return Err(BatchError::EmptyBatch);
    }

    let queries = parse::parse_batch(items);

    let mut results = BatchResults::with_capacity(queries.len());
    for (ref_id, parsed) in queries {
        let result = evaluate(gateway, parsed, cancel).await;
        debug!(ref_id = %ref_id, ok = result.is_ok(), "query evaluated");
        results.insert(ref_id, result);
    }
    Ok(results)
}

async fn evaluate(
    gateway: &dyn KvGateway,
    parsed: ParsedQuery,
    cancel: &CancellationToken,
) -> Result<QueryData, QueryError> {
    let query = parsed?;

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(QueryError::Cancelled),
        result = route(gateway, &query) => result,
    }
}

async fn route(gateway: &dyn KvGateway, query: &QueryModel) -> Result<QueryData, QueryError> {
    match query.format.as_str() {
        "" | "timeseries" => timeseries::shape(gateway, query).await.map(QueryData::Series),
        "table" => table::shape(gateway, query).await.map(QueryData::Table),
        other => Err(QueryError::UnknownFormat(other.to_string())),
    }
}
