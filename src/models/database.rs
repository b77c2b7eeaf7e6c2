//! Per-database aggregated metadata.

use crate::models::TableStatus;
use serde::{Deserialize, Serialize};

/// Sort column names accepted by database listing.
pub mod columns {
    pub const NAME: &str = "SCHEMA_NAME";
    pub const COLLATION: &str = "DEFAULT_COLLATION_NAME";
    pub const TABLES: &str = "SCHEMA_TABLES";
    pub const TABLE_ROWS: &str = "SCHEMA_TABLE_ROWS";
    pub const DATA_LENGTH: &str = "SCHEMA_DATA_LENGTH";
    pub const INDEX_LENGTH: &str = "SCHEMA_INDEX_LENGTH";
    pub const DATA_FREE: &str = "SCHEMA_DATA_FREE";
    pub const TOTAL_LENGTH: &str = "SCHEMA_LENGTH";
}

/// Sort direction for database listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Parse from the conventional SQL keyword; anything but DESC ascends.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            Self::Descending
        } else {
            Self::Ascending
        }
    }
}

/// One row of the database listing: rollup of a database's table collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_collation: Option<String>,
    pub tables: u64,
    pub rows: u64,
    pub data_length: u64,
    pub index_length: u64,
    pub data_free: u64,
}

impl DatabaseStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Fold one table's status into the rollup.
    pub fn add_table(&mut self, table: &TableStatus) {
        self.tables += 1;
        self.rows += table.rows.unwrap_or(0);
        self.data_length += table.data_length.unwrap_or(0);
        self.index_length += table.index_length.unwrap_or(0);
        self.data_free += table.data_free.unwrap_or(0);
    }

    /// Data plus index bytes.
    pub fn total_length(&self) -> u64 {
        self.data_length + self.index_length
    }

    /// The numeric value behind a sort column, or `None` for text columns.
    pub fn numeric_field(&self, column: &str) -> Option<u64> {
        match column {
            columns::TABLES => Some(self.tables),
            columns::TABLE_ROWS => Some(self.rows),
            columns::DATA_LENGTH => Some(self.data_length),
            columns::INDEX_LENGTH => Some(self.index_length),
            columns::DATA_FREE => Some(self.data_free),
            columns::TOTAL_LENGTH => Some(self.total_length()),
            _ => None,
        }
    }

    /// The text value behind a sort column; the database name is the
    /// fallback sort key.
    pub fn text_field(&self, column: &str) -> &str {
        match column {
            columns::COLLATION => self.default_collation.as_deref().unwrap_or(""),
            _ => &self.name,
        }
    }
}
