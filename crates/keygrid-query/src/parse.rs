//! Decoding of raw batch items into query models.

use std::collections::HashMap;

use tracing::debug;

use crate::error::QueryError;
use crate::types::{BatchItem, QueryModel};

/// Outcome of decoding one batch item: a usable model, or the parse error
/// that becomes this identifier's result.
pub type ParsedQuery = Result<QueryModel, QueryError>;

/// Decodes every batch item into a query model keyed by identifier.
///
/// A malformed payload never aborts the batch; the error is attached to the
/// item's identifier instead. The output always holds one entry per input
/// item.
pub fn parse_batch(items: &[BatchItem]) -> HashMap<String, ParsedQuery> {
    let mut queries = HashMap::with_capacity(items.len());
    for item in items {
        let parsed =
            serde_json::from_value::<QueryModel>(item.payload.clone()).map_err(|e| {
                QueryError::InvalidPayload {
                    payload: item.payload.to_string(),
                    reason: e.to_string(),
                }
            });
        debug!(ref_id = %item.ref_id, ok = parsed.is_ok(), "parsed query");
        queries.insert(item.ref_id.clone(), parsed);
    }
    queries
}
