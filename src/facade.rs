//! The connection facade.
//!
//! Wraps one live server connection and owns everything session-scoped: the
//! post-connect version probe, the memoization cache, collation handling and
//! the optional control-user connection. Schema introspection and version
//! parsing are stateless and borrow the connection through this facade.
//!
//! One facade instance is one logical connection. Operations that consult or
//! fill the cache take `&mut self`; sharing an instance across threads
//! requires external synchronization.

use crate::cache::{SessionCache, keys};
use crate::config::Settings;
use crate::connection::{Connection, SqlResult, SqlRow, escape_string, row_string};
use crate::error::{DbError, DbResult};
use crate::introspect::SchemaInspector;
use crate::models::{DatabaseStats, SortOrder};
use crate::version::ServerVersion;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

const VERSION_PROBE: &str = "SELECT @@version, @@version_comment";
const CURRENT_USER_PROBE: &str = "SELECT CURRENT_USER();";
const BASEDIR_PROBE: &str = "SELECT @@basedir";
const SERVER_COLLATION_PROBE: &str = "SELECT @@collation_server";
const SHOW_DATABASES: &str = "SHOW DATABASES";

/// Facade over one authenticated server connection.
pub struct ConnectionFacade {
    conn: Box<dyn Connection>,
    control: Option<Box<dyn Connection>>,
    cache: SessionCache,
    settings: Settings,
    version: Option<ServerVersion>,
}

impl ConnectionFacade {
    /// Wrap a live connection.
    pub fn new(conn: Box<dyn Connection>, settings: Settings) -> Self {
        Self {
            conn,
            control: None,
            cache: SessionCache::new(),
            settings,
            version: None,
        }
    }

    /// Attach the elevated-privilege control connection used for
    /// administrative bookkeeping queries.
    pub fn with_control_connection(mut self, control: Box<dyn Connection>) -> Self {
        self.control = Some(control);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Drop a cached entry, forcing the next call to re-probe. Needed on
    /// state transitions the cache cannot detect itself, e.g. a database
    /// switch.
    pub fn invalidate(&mut self, key: &str) {
        self.cache.remove(key);
    }

    // =========================================================================
    // Version handling
    // =========================================================================

    /// Run the post-connect handshake: probe and store the server version.
    ///
    /// Some deployments restrict the probe; an empty result leaves the
    /// version unset and is not an error.
    pub async fn post_connect(&mut self) -> DbResult<()> {
        match self.conn.fetch_single_row(VERSION_PROBE).await? {
            Some(row) => self.set_version(&row),
            None => debug!("Version probe returned no row; version stays unset"),
        }
        Ok(())
    }

    /// Store the version parsed from a probe row. May be called again to
    /// re-set the version explicitly.
    pub fn set_version(&mut self, row: &SqlRow) {
        let version = row_string(row, "@@version").unwrap_or_default();
        let comment = row_string(row, "@@version_comment").unwrap_or_default();
        let parsed = ServerVersion::parse(&version, &comment);
        debug!(
            version = %parsed.raw,
            version_int = parsed.version_int,
            mariadb = parsed.is_mariadb,
            percona = parsed.is_percona,
            "Parsed server version"
        );
        self.version = Some(parsed);
    }

    pub fn server_version(&self) -> Option<&ServerVersion> {
        self.version.as_ref()
    }

    pub fn is_mariadb(&self) -> bool {
        self.version.as_ref().is_some_and(|v| v.is_mariadb)
    }

    pub fn is_percona(&self) -> bool {
        self.version.as_ref().is_some_and(|v| v.is_percona)
    }

    /// Whether the server meets the minimum supported version. Unknown
    /// versions are given the benefit of the doubt.
    pub fn is_version_supported(&self) -> bool {
        self.version
            .as_ref()
            .is_none_or(|v| v.at_least(self.settings.min_supported_version))
    }

    // =========================================================================
    // Session probes
    // =========================================================================

    /// The session's `CURRENT_USER()` as `user@host`.
    ///
    /// The first call issues exactly one probe; the result - including an
    /// empty one from a failed probe - is cached, and later calls return it
    /// without touching the connection until the entry is invalidated.
    pub async fn current_user(&mut self) -> String {
        if let Some(cached) = self.cache.get_as::<String>(keys::CURRENT_USER) {
            return cached;
        }
        let user = match self.conn.fetch_result(CURRENT_USER_PROBE).await {
            Ok(result) => result
                .scalar()
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            Err(e) => {
                warn!(error = %e, "Current user probe failed");
                String::new()
            }
        };
        self.cache.set(keys::CURRENT_USER, Value::String(user.clone()));
        user
    }

    /// The current user split into `(name, host)`; both empty when the
    /// connection identity cannot be determined.
    pub async fn current_user_and_host(&mut self) -> (String, String) {
        split_user_host(&self.current_user().await)
    }

    /// Whether the server runs inside Amazon RDS, judged by its base
    /// directory. Cached after the first probe.
    pub async fn is_amazon_rds(&mut self) -> bool {
        if let Some(cached) = self.cache.get_as::<bool>(keys::IS_AMAZON_RDS) {
            return cached;
        }
        let rds = match self.conn.fetch_result(BASEDIR_PROBE).await {
            Ok(result) => result
                .scalar()
                .and_then(Value::as_str)
                .map(is_rds_base_dir)
                .unwrap_or(false),
            Err(e) => {
                warn!(error = %e, "Base directory probe failed");
                false
            }
        };
        self.cache.set_as(keys::IS_AMAZON_RDS, &rds);
        rds
    }

    // =========================================================================
    // Collations
    // =========================================================================

    /// A database's default collation. See [`SchemaInspector::db_collation`]
    /// for the debug/batched path split.
    pub async fn db_collation(&mut self, db: &str) -> DbResult<String> {
        SchemaInspector::db_collation(&*self.conn, &mut self.cache, &self.settings, db).await
    }

    /// The server-wide default collation, cached.
    pub async fn server_collation(&mut self) -> DbResult<String> {
        if let Some(cached) = self.cache.get_as::<String>(keys::SERVER_COLLATION) {
            return Ok(cached);
        }
        let result = self.conn.fetch_result(SERVER_COLLATION_PROBE).await?;
        let collation = result
            .scalar()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.cache.set_as(keys::SERVER_COLLATION, &collation);
        Ok(collation)
    }

    /// Change the connection collation. Equivalent to issuing the raw
    /// `SET collation_connection` statement.
    pub async fn set_collation(&mut self, name: &str) -> DbResult<()> {
        let sql = format!("SET collation_connection = '{}';", escape_string(name));
        self.conn.query(&sql).await?;
        Ok(())
    }

    // =========================================================================
    // Control user
    // =========================================================================

    /// Run a statement on the control-user connection, failing loudly.
    pub async fn query_as_control_user(&self, sql: &str) -> DbResult<SqlResult> {
        let control = self
            .control
            .as_deref()
            .ok_or(DbError::ControlUserUnavailable)?;
        control.fetch_result(sql).await
    }

    /// Run a statement on the control-user connection, returning `None`
    /// instead of failing.
    pub async fn try_query_as_control_user(&self, sql: &str) -> Option<SqlResult> {
        match self.query_as_control_user(sql).await {
            Ok(result) => Some(result),
            Err(e) => {
                debug!(error = %e, "Control user query failed");
                None
            }
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Re-probe the server's database list and cache it.
    pub async fn refresh_database_list(&mut self) -> DbResult<Vec<String>> {
        let result = self.conn.fetch_result(SHOW_DATABASES).await?;
        let names: Vec<String> = match result.fields.first() {
            Some(field) => result
                .rows
                .iter()
                .filter_map(|row| row_string(row, &field.name))
                .collect(),
            None => Vec::new(),
        };
        debug!(count = names.len(), "Refreshed database list");
        self.cache.set_as(keys::DATABASE_LIST, &names);
        Ok(names)
    }

    /// The known database names, probing only when nothing is cached.
    pub async fn database_list(&mut self) -> DbResult<Vec<String>> {
        if let Some(cached) = self.cache.get_as::<Vec<String>>(keys::DATABASE_LIST) {
            return Ok(cached);
        }
        self.refresh_database_list().await
    }

    /// List tables of one database in the external map form.
    pub async fn list_tables(&self, db: &str) -> DbResult<BTreeMap<String, SqlRow>> {
        SchemaInspector::list_tables(&*self.conn, &self.settings, db).await
    }

    /// Aggregate, sort and slice per-database statistics over the cached
    /// database list.
    pub async fn list_databases(
        &mut self,
        like_pattern: Option<&str>,
        sort_by: &str,
        sort_order: SortOrder,
        limit: usize,
        offset: usize,
    ) -> DbResult<Vec<DatabaseStats>> {
        let names = self.database_list().await?;
        SchemaInspector::list_databases(
            &*self.conn,
            &mut self.cache,
            &self.settings,
            &names,
            like_pattern,
            sort_by,
            sort_order,
            limit,
            offset,
        )
        .await
    }
}

/// Split `user@host` on the last `@`; an empty input yields two empty parts.
fn split_user_host(user: &str) -> (String, String) {
    match user.rsplit_once('@') {
        Some((name, host)) => (name.to_string(), host.to_string()),
        None => (user.to_string(), String::new()),
    }
}

/// Amazon RDS servers run out of `/rdsdbbin/<build>`; the trailing version
/// folder name varies per release.
fn is_rds_base_dir(path: &str) -> bool {
    let p = path.trim().to_ascii_lowercase();
    p == "/rdsdbbin" || p.starts_with("/rdsdbbin/")
}
