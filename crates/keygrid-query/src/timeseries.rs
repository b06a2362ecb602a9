//! Time-series shaping: `test`, `get`, `keys`, `tags` and `tagsrec`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{QueryError, Result};
use crate::gateway::KvGateway;
use crate::path;
use crate::types::{QueryModel, Series};

/// Constant sample value for presence markers (`keys`, `tags`, `tagsrec`).
const PRESENCE: f64 = 1.0;

/// Shapes one timeseries-format query into zero or more series.
pub async fn shape(gateway: &dyn KvGateway, query: &QueryModel) -> Result<Vec<Series>> {
    let query_type = if query.query_type.is_empty() {
        "get"
    } else {
        query.query_type.as_str()
    };

    // A test query probes the store; it carries no target.
    if query_type == "test" {
        gateway.probe().await.map_err(QueryError::ProbeFailed)?;
        return Ok(Vec::new());
    }

    if query.target.is_empty() {
        return Err(QueryError::EmptyTarget);
    }

    let target = path::unescape_target(&query.target);

    match query_type {
        "get" => get(gateway, &target).await,
        "keys" => keys(gateway, &target).await,
        "tags" => tags(gateway, &target, false).await,
        "tagsrec" => tags(gateway, &target, true).await,
        other => Err(QueryError::UnknownType(other.to_string())),
    }
}

/// One series named after the key, one point holding the float-parsed value.
async fn get(gateway: &dyn KvGateway, target: &str) -> Result<Vec<Series>> {
    let key = path::strip_trailing_slash(target);
    debug!(key, "timeseries get");

    let value = gateway
        .get(key)
        .await
        .map_err(|e| QueryError::Get {
            key: key.to_string(),
            source: e,
        })?
        .ok_or_else(|| QueryError::KeyNotFound(key.to_string()))?;

    let number: f64 = value.parse().map_err(|_| QueryError::NonNumericValue {
        key: key.to_string(),
        value: value.clone(),
    })?;

    Ok(vec![Series::single(key, number)])
}

/// One presence series per immediate child of the target prefix.
async fn keys(gateway: &dyn KvGateway, target: &str) -> Result<Vec<Series>> {
    let prefix = path::ensure_trailing_slash(target);
    debug!(%prefix, "timeseries keys");

    let keys = gateway
        .list_keys(&prefix, "/")
        .await
        .map_err(|e| QueryError::List {
            prefix: prefix.clone(),
            source: e,
        })?;

    Ok(keys
        .into_iter()
        .map(|key| Series::single(key, PRESENCE))
        .collect())
}

/// One series named after the prefix, carrying child keys as a label map.
/// Labels are the child keys with the prefix stripped and `/` replaced by `.`.
async fn tags(gateway: &dyn KvGateway, target: &str, recursive: bool) -> Result<Vec<Series>> {
    let prefix = path::ensure_trailing_slash(target);
    let separator = if recursive { "" } else { "/" };
    debug!(%prefix, recursive, "timeseries tags");

    let keys = gateway
        .list_keys(&prefix, separator)
        .await
        .map_err(|e| QueryError::List {
            prefix: prefix.clone(),
            source: e,
        })?;

    let mut labels = BTreeMap::new();
    for key in keys {
        let value = match gateway.get(&key).await {
            Ok(Some(value)) => value,
            // A listed key may have been deleted since the listing; skip it.
            Ok(None) => continue,
            Err(e) => return Err(QueryError::Get { key, source: e }),
        };
        let label = key.strip_prefix(&prefix).unwrap_or(&key).replace('/', ".");
        labels.insert(label, value);
    }

    Ok(vec![Series::with_tags(prefix, labels, PRESENCE)])
}
