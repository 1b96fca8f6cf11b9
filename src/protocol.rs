//! Wire types for the data service API.
//!
//! Field names and shapes here are the contract with the backend and
//! are preserved exactly: operators serialize as their surface symbols,
//! logic and functions as lowercase names. Tabular payloads arrive as a
//! column map (`column -> values`), so row order inside a column is the
//! backend's order and column order is restored by [`display_order`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ast::{AggFunc, FilterClause, FilterLogic};

/// Column-major table payload.
pub type DataMap = HashMap<String, Vec<serde_json::Value>>;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// `POST /api/load`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRequest {
    pub filepath: String,
    pub name: String,
}

/// `POST /api/filter`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    pub dataframe: String,
    pub filters: Vec<FilterClause>,
    pub logic: FilterLogic,
}

/// `POST /api/select`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectRequest {
    pub dataframe: String,
    pub columns: Vec<String>,
}

/// `POST /api/aggregate-simple`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRequest {
    pub dataframe: String,
    pub column: String,
    pub function: AggFunc,
}

/// `POST /api/aggregate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupByRequest {
    pub dataframe: String,
    pub groupby: String,
    pub column: String,
    pub function: AggFunc,
}

/// `POST /api/join`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub left: String,
    pub right: String,
    pub left_on: String,
    pub right_on: String,
    pub how: String,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Successful load summary. `columns` may be truncated server-side;
/// `total_columns` carries the real width when it is.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadResponse {
    pub name: String,
    pub rows: usize,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub total_columns: Option<usize>,
    #[serde(default)]
    pub preview: Option<DataMap>,
}

/// Row data from filter, select, and groupby.
#[derive(Debug, Clone, Deserialize)]
pub struct TableResponse {
    pub rows: usize,
    pub data: DataMap,
    #[serde(default)]
    pub total_columns: Option<usize>,
    #[serde(default)]
    pub displayed_columns: Option<usize>,
}

/// Join result; the backend reports the merged column order.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinResponse {
    pub rows: usize,
    pub columns: Vec<String>,
    pub data: DataMap,
}

/// Single-value aggregate. `result` stays a JSON value since `max` of
/// a string column is a string.
#[derive(Debug, Clone, Deserialize)]
pub struct ScalarResponse {
    pub result: serde_json::Value,
    pub row_count: usize,
}

/// `POST /api/clear`
#[derive(Debug, Clone, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// One entry of the frames listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSummary {
    pub rows: usize,
    pub columns: Vec<String>,
}

/// `GET /api/dataframes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramesResponse {
    pub dataframes: HashMap<String, FrameSummary>,
}

/// `GET /api/info/<name>`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameInfo {
    pub name: String,
    pub rows: usize,
    pub columns: Vec<String>,
    #[serde(default)]
    pub shape: Option<(usize, usize)>,
    #[serde(default)]
    pub preview: Option<DataMap>,
}

/// Failure body: `{ "error": "..." }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Order `data`'s columns for display: the preferred names that are
/// present, in preferred order, then any leftovers alphabetically.
pub fn display_order(preferred: &[String], data: &DataMap) -> Vec<String> {
    let mut ordered: Vec<String> = preferred
        .iter()
        .filter(|name| data.contains_key(*name))
        .cloned()
        .collect();
    let mut rest: Vec<String> = data
        .keys()
        .filter(|name| !preferred.contains(name))
        .cloned()
        .collect();
    rest.sort();
    ordered.extend(rest);
    ordered
}
