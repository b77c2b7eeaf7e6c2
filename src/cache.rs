//! Session-scoped memoization cache.
//!
//! A plain in-memory key-value store scoped to one logical session (one
//! authenticated server connection). No TTL and no eviction: entries live
//! until explicitly removed or the owning facade is dropped. Callers must
//! invalidate on state transitions the cache cannot detect itself (e.g. a
//! database switch).

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Well-known cache keys used by the connection facade.
pub mod keys {
    pub const CURRENT_USER: &str = "current_user";
    pub const IS_AMAZON_RDS: &str = "is_amazon_rds";
    pub const SERVER_COLLATION: &str = "server_collation";
    pub const DB_COLLATIONS: &str = "db_collations";
    pub const DATABASE_LIST: &str = "database_list";
}

/// In-memory memoization front for expensive, idempotent probe queries.
#[derive(Debug, Default)]
pub struct SessionCache {
    entries: HashMap<String, Value>,
}

impl SessionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached value. A miss is not an error.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Store a value under the given key, replacing any previous entry.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Remove an entry, forcing the next lookup to re-probe.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Look up and deserialize a cached value.
    ///
    /// Returns `None` on a miss or when the stored value does not match the
    /// requested shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.entries
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Serialize and store a value under the given key.
    pub fn set_as<T: Serialize>(&mut self, key: impl Into<String>, value: &T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.entries.insert(key.into(), v);
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
