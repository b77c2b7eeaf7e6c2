//! Database abstraction layer for a web-based MySQL administration tool.
//!
//! This library wraps a raw MySQL-family connection with version detection,
//! vendor-quirk handling (MariaDB/Percona/Amazon RDS), session-scoped caching
//! of probe results, and schema introspection via either `SHOW` commands or
//! `information_schema` catalog queries.

pub mod cache;
pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod facade;
pub mod introspect;
pub mod models;
pub mod version;

pub use cache::SessionCache;
pub use config::Settings;
pub use connection::{Connection, FieldMeta, SqlResult, SqlRow};
pub use driver::MySqlDriver;
pub use error::{DbError, DbResult};
pub use facade::ConnectionFacade;
pub use introspect::{ColumnMap, SchemaInspector};
pub use models::{DatabaseStats, SortOrder, TableStatus};
pub use version::ServerVersion;
