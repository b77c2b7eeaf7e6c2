//! Configuration for the abstraction layer.
//!
//! The surrounding application loads and owns its own configuration; this
//! module only defines the value object consumed read-only by the facade and
//! the schema inspector. A `Settings` instance is passed explicitly into every
//! component constructor - there is no ambient/global lookup.

use serde::{Deserialize, Serialize};

/// Oldest server version (encoded as `major*10000 + minor*100 + patch`) that
/// the tool fully supports. Older servers trigger an upgrade recommendation.
pub const DEFAULT_MIN_SUPPORTED_VERSION: u32 = 50500;

/// Read-only feature flags and scope filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Select the `SHOW`-command introspection strategy instead of
    /// `information_schema` catalog queries.
    pub disable_information_schema: bool,
    /// Debug path selector: issue direct per-database queries instead of
    /// cached/batched lookups. A performance switch, not a semantic one.
    pub debug_sql: bool,
    /// Sort database names with a natural-order comparator (`db2` < `db10`).
    pub natural_order: bool,
    /// Restrict the visible database universe to these names. Empty means no
    /// restriction.
    pub only_db: Vec<String>,
    /// Threshold for the upgrade recommendation.
    pub min_supported_version: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            disable_information_schema: false,
            debug_sql: false,
            natural_order: false,
            only_db: Vec::new(),
            min_supported_version: DEFAULT_MIN_SUPPORTED_VERSION,
        }
    }
}

impl Settings {
    /// Whether a database name is inside the configured scope.
    pub fn database_in_scope(&self, name: &str) -> bool {
        self.only_db.is_empty() || self.only_db.iter().any(|db| db == name)
    }
}
