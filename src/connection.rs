//! The connection capability seam.
//!
//! The facade and the schema inspector depend on this narrow trait rather
//! than on a concrete driver, so test doubles can implement it directly.
//! Cell values are `serde_json::Value` and rows are name-keyed maps; the
//! accompanying field metadata preserves column order and source tables.

use crate::error::DbResult;
use async_trait::async_trait;
use serde_json::Value;

/// One result row, keyed by column name.
pub type SqlRow = serde_json::Map<String, Value>;

/// Metadata for one result-set column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    /// Column name as it appears in the result set.
    pub name: String,
    /// Source table the column refers to; empty when not derivable.
    pub table: String,
}

impl FieldMeta {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
        }
    }
}

/// A buffered result set with column metadata.
#[derive(Debug, Clone, Default)]
pub struct SqlResult {
    pub fields: Vec<FieldMeta>,
    pub rows: Vec<SqlRow>,
}

impl SqlResult {
    /// The first row, if any.
    pub fn first_row(&self) -> Option<&SqlRow> {
        self.rows.first()
    }

    /// The first column of the first row - the shape of `SELECT @@var` probes.
    pub fn scalar(&self) -> Option<&Value> {
        let field = self.fields.first()?;
        self.rows.first()?.get(&field.name)
    }
}

/// Narrow capability interface over one live server connection.
///
/// All operations are synchronous request/response against the underlying
/// connection: each call blocks the caller until the server replies.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Execute a statement and return the number of affected rows.
    async fn query(&self, sql: &str) -> DbResult<u64>;

    /// Execute a statement, returning `None` instead of failing.
    async fn try_query(&self, sql: &str) -> Option<u64> {
        self.query(sql).await.ok()
    }

    /// Fetch at most one row.
    async fn fetch_single_row(&self, sql: &str) -> DbResult<Option<SqlRow>>;

    /// Fetch a full result set with column metadata.
    async fn fetch_result(&self, sql: &str) -> DbResult<SqlResult>;
}

/// Quote an identifier with backticks, doubling embedded backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Escape a string for inclusion in a single-quoted SQL literal.
pub fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

/// Read a string cell, accepting either a JSON string or null.
pub fn row_string(row: &SqlRow, key: &str) -> Option<String> {
    match row.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Read an unsigned integer cell.
///
/// `SHOW` command output frequently arrives as decimal strings depending on
/// the connection character set, so numeric strings are accepted too.
pub fn row_u64(row: &SqlRow, key: &str) -> Option<u64> {
    match row.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_i64().and_then(|v| u64::try_from(v).ok())),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}
