//! Per-table status metadata.
//!
//! The two introspection strategies return the same information under
//! different key shapes: `SHOW TABLE STATUS` uses legacy mixed-case keys
//! (`Name`, `Engine`, `Rows`) while `information_schema.TABLES` uses catalog
//! uppercase keys (`TABLE_NAME`, `ENGINE`, `TABLE_ROWS`). [`TableStatus`] is
//! the canonical internal form; the external key sets are produced by an
//! explicit serialization step so downstream code depending on either naming
//! convention works unmodified.

use crate::connection::{SqlRow, row_string, row_u64};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Canonical table status, a superset of both strategies' fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableStatus {
    pub name: String,
    /// `BASE TABLE`, `VIEW`, `SYSTEM VIEW`. Only the catalog strategy
    /// reports it directly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_row_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_data_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_free: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_options: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl TableStatus {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build from one `SHOW TABLE STATUS` row (legacy mixed-case keys).
    pub fn from_show_row(row: &SqlRow) -> Self {
        Self {
            name: row_string(row, "Name").unwrap_or_default(),
            table_type: None,
            engine: row_string(row, "Engine"),
            version: row_u64(row, "Version"),
            row_format: row_string(row, "Row_format"),
            rows: row_u64(row, "Rows"),
            avg_row_length: row_u64(row, "Avg_row_length"),
            data_length: row_u64(row, "Data_length"),
            max_data_length: row_u64(row, "Max_data_length"),
            index_length: row_u64(row, "Index_length"),
            data_free: row_u64(row, "Data_free"),
            auto_increment: row_u64(row, "Auto_increment"),
            create_time: row_datetime(row, "Create_time"),
            update_time: row_datetime(row, "Update_time"),
            check_time: row_datetime(row, "Check_time"),
            collation: row_string(row, "Collation"),
            checksum: row_u64(row, "Checksum"),
            create_options: row_string(row, "Create_options"),
            comment: row_string(row, "Comment"),
        }
    }

    /// Build from one `information_schema.TABLES` row (catalog uppercase keys).
    pub fn from_catalog_row(row: &SqlRow) -> Self {
        Self {
            name: row_string(row, "TABLE_NAME").unwrap_or_default(),
            table_type: row_string(row, "TABLE_TYPE"),
            engine: row_string(row, "ENGINE"),
            version: row_u64(row, "VERSION"),
            row_format: row_string(row, "ROW_FORMAT"),
            rows: row_u64(row, "TABLE_ROWS"),
            avg_row_length: row_u64(row, "AVG_ROW_LENGTH"),
            data_length: row_u64(row, "DATA_LENGTH"),
            max_data_length: row_u64(row, "MAX_DATA_LENGTH"),
            index_length: row_u64(row, "INDEX_LENGTH"),
            data_free: row_u64(row, "DATA_FREE"),
            auto_increment: row_u64(row, "AUTO_INCREMENT"),
            create_time: row_datetime(row, "CREATE_TIME"),
            update_time: row_datetime(row, "UPDATE_TIME"),
            check_time: row_datetime(row, "CHECK_TIME"),
            collation: row_string(row, "TABLE_COLLATION"),
            checksum: row_u64(row, "CHECKSUM"),
            create_options: row_string(row, "CREATE_OPTIONS"),
            comment: row_string(row, "TABLE_COMMENT"),
        }
    }

    /// Data plus index bytes, treating missing components as zero.
    pub fn total_length(&self) -> u64 {
        self.data_length.unwrap_or(0) + self.index_length.unwrap_or(0)
    }

    /// Serialize to the legacy `SHOW`-style key set only.
    pub fn legacy_fields(&self) -> SqlRow {
        let mut row = SqlRow::new();
        row.insert("Name".into(), Value::String(self.name.clone()));
        row.insert("Engine".into(), opt_string(&self.engine));
        row.insert("Version".into(), opt_u64(self.version));
        row.insert("Row_format".into(), opt_string(&self.row_format));
        row.insert("Rows".into(), opt_u64(self.rows));
        row.insert("Avg_row_length".into(), opt_u64(self.avg_row_length));
        row.insert("Data_length".into(), opt_u64(self.data_length));
        row.insert("Max_data_length".into(), opt_u64(self.max_data_length));
        row.insert("Index_length".into(), opt_u64(self.index_length));
        row.insert("Data_free".into(), opt_u64(self.data_free));
        row.insert("Auto_increment".into(), opt_u64(self.auto_increment));
        row.insert("Create_time".into(), opt_datetime(self.create_time));
        row.insert("Update_time".into(), opt_datetime(self.update_time));
        row.insert("Check_time".into(), opt_datetime(self.check_time));
        row.insert("Collation".into(), opt_string(&self.collation));
        row.insert("Checksum".into(), opt_u64(self.checksum));
        row.insert("Create_options".into(), opt_string(&self.create_options));
        row.insert("Comment".into(), opt_string(&self.comment));
        row
    }

    /// Serialize to the catalog uppercase key set plus mirrored legacy keys,
    /// so consumers of either convention read the same row.
    ///
    /// `TABLE_TYPE` is synthesized as `BASE TABLE` when the source row did
    /// not carry one.
    pub fn dual_fields(&self) -> SqlRow {
        let mut row = self.legacy_fields();
        row.insert("TABLE_NAME".into(), Value::String(self.name.clone()));
        row.insert(
            "TABLE_TYPE".into(),
            Value::String(
                self.table_type
                    .clone()
                    .unwrap_or_else(|| "BASE TABLE".to_string()),
            ),
        );
        row.insert("ENGINE".into(), opt_string(&self.engine));
        row.insert("VERSION".into(), opt_u64(self.version));
        row.insert("ROW_FORMAT".into(), opt_string(&self.row_format));
        row.insert("TABLE_ROWS".into(), opt_u64(self.rows));
        row.insert("AVG_ROW_LENGTH".into(), opt_u64(self.avg_row_length));
        row.insert("DATA_LENGTH".into(), opt_u64(self.data_length));
        row.insert("MAX_DATA_LENGTH".into(), opt_u64(self.max_data_length));
        row.insert("INDEX_LENGTH".into(), opt_u64(self.index_length));
        row.insert("DATA_FREE".into(), opt_u64(self.data_free));
        row.insert("AUTO_INCREMENT".into(), opt_u64(self.auto_increment));
        row.insert("CREATE_TIME".into(), opt_datetime(self.create_time));
        row.insert("UPDATE_TIME".into(), opt_datetime(self.update_time));
        row.insert("CHECK_TIME".into(), opt_datetime(self.check_time));
        row.insert("TABLE_COLLATION".into(), opt_string(&self.collation));
        row.insert("CHECKSUM".into(), opt_u64(self.checksum));
        row.insert("CREATE_OPTIONS".into(), opt_string(&self.create_options));
        row.insert("TABLE_COMMENT".into(), opt_string(&self.comment));
        row
    }
}

fn row_datetime(row: &SqlRow, key: &str) -> Option<NaiveDateTime> {
    row_string(row, key)
        .and_then(|s| NaiveDateTime::parse_from_str(&s, DATETIME_FORMAT).ok())
}

fn opt_string(value: &Option<String>) -> Value {
    match value {
        Some(s) => Value::String(s.clone()),
        None => Value::Null,
    }
}

fn opt_u64(value: Option<u64>) -> Value {
    match value {
        Some(n) => Value::Number(n.into()),
        None => Value::Null,
    }
}

fn opt_datetime(value: Option<NaiveDateTime>) -> Value {
    match value {
        Some(dt) => Value::String(dt.format(DATETIME_FORMAT).to_string()),
        None => Value::Null,
    }
}
