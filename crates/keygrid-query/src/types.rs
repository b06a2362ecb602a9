use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Sentinel cell text for a column value that could not be resolved.
pub const NOT_FOUND: &str = "Not Found";

/// Wire shape of a single panel query.
///
/// All fields are optional on the wire; an empty `format` defaults to
/// `timeseries` and an empty `type` defaults to `get`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryModel {
    /// Store key path. May contain a `*` wildcard (table format), relative
    /// `../` segments in column specs, and an optional trailing `/`.
    pub target: String,
    /// Output shape: `timeseries` or `table`.
    pub format: String,
    /// Operation for timeseries queries: `get`, `keys`, `tags`, `tagsrec`
    /// or `test`.
    #[serde(rename = "type")]
    pub query_type: String,
    /// Comma-separated column specs, table format only.
    pub columns: String,
}

/// One sample in a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
    pub value: f64,
}

/// A named series with an optional label map and its samples, ordered by
/// timestamp ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    pub points: Vec<DataPoint>,
}

impl Series {
    /// Series with a single just-now sample and no labels.
    pub fn single(name: impl Into<String>, value: f64) -> Self {
        Self::with_tags(name, BTreeMap::new(), value)
    }

    /// Series with a single just-now sample carrying a label map.
    pub fn with_tags(
        name: impl Into<String>,
        tags: BTreeMap<String, String>,
        value: f64,
    ) -> Self {
        Self {
            name: name.into(),
            tags,
            points: vec![DataPoint {
                time: Utc::now(),
                value,
            }],
        }
    }
}

/// A typed table cell: integer when the raw value parses entirely as a
/// base-10 integer, text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Text(String),
}

impl Cell {
    /// Types a fetched raw value.
    pub fn from_value(value: String) -> Self {
        match value.parse::<i64>() {
            Ok(n) => Cell::Integer(n),
            Err(_) => Cell::Text(value),
        }
    }

    /// The sentinel cell for a missed column lookup.
    pub fn not_found() -> Self {
        Cell::Text(NOT_FOUND.to_string())
    }
}

/// Tabular query output. Every row holds exactly `columns.len()` cells,
/// aligned positionally with the column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Successful payload of one query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryData {
    Series(Vec<Series>),
    Table(Table),
}

/// Batch outcome keyed by the caller-assigned query identifier.
pub type BatchResults = HashMap<String, Result<QueryData, QueryError>>;

/// One item of an incoming batch: identifier plus the raw JSON payload it
/// arrived with. Payload decoding is deferred so a malformed payload stays a
/// per-query error.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchItem {
    #[serde(rename = "refId")]
    pub ref_id: String,
    #[serde(flatten)]
    pub payload: serde_json::Value,
}
