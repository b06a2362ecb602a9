//! Table shaping: wildcard targets with relative column lookups.

use tracing::debug;

use crate::error::{QueryError, Result};
use crate::gateway::KvGateway;
use crate::path;
use crate::types::{Cell, QueryModel, Table};

/// Shapes one table-format query into a single table.
///
/// The target's wildcard decides the row set: the full subtree under the
/// literal prefix is listed, then filtered against the anchored matcher.
/// Listing order (the store's lexical key order) becomes row order. Column
/// names are fixed from the first matching row's resolved column keys.
pub async fn shape(gateway: &dyn KvGateway, query: &QueryModel) -> Result<Table> {
    if query.target.is_empty() {
        return Err(QueryError::EmptyTarget);
    }

    let (prefix, matcher) = path::compile_wildcard(&query.target)?;
    debug!(%prefix, pattern = matcher.as_str(), "table listing");

    let keys = gateway
        .list_keys(&prefix, "")
        .await
        .map_err(|e| QueryError::List {
            prefix: prefix.clone(),
            source: e,
        })?;

    let matching: Vec<String> = keys.into_iter().filter(|k| matcher.is_match(k)).collect();
    let specs: Vec<&str> = query.columns.split(',').collect();

    let mut table = Table::default();
    for (row_idx, key) in matching.iter().enumerate() {
        let mut row = Vec::with_capacity(specs.len());
        for spec in &specs {
            let column_key = path::resolve_relative_column(key, spec);
            // Column names come from the first row's resolved keys; the
            // column exists even when its first-row value is missing.
            if row_idx == 0 {
                table.columns.push(path::last_segment(&column_key).to_string());
            }
            row.push(fetch_cell(gateway, &column_key).await);
        }
        table.rows.push(row);
    }

    Ok(table)
}

/// Reads one column value. A miss of any kind degrades to the sentinel cell
/// rather than erroring the row.
async fn fetch_cell(gateway: &dyn KvGateway, key: &str) -> Cell {
    match gateway.get(key).await {
        Ok(Some(value)) => Cell::from_value(value),
        Ok(None) => Cell::not_found(),
        Err(e) => {
            debug!(key, error = %e, "column lookup failed");
            Cell::not_found()
        }
    }
}
