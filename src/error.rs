//! Error types for the abstraction layer.
//!
//! This module defines all error types using `thiserror` for ergonomic error
//! handling, plus the formatting of raw server error codes into actionable,
//! user-facing messages.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    /// An error reported by the server itself. The message has already been
    /// run through [`format_server_error`].
    #[error("Server error: {message}")]
    Server { code: Option<u16>, message: String },

    #[error("No control user connection is configured")]
    ControlUserUnavailable,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a server error from a raw error code and message.
    ///
    /// The stored message is the formatted, user-facing form; the raw code is
    /// kept for callers that branch on it.
    pub fn server(code: u16, raw_message: &str) -> Self {
        Self::Server {
            code: Some(code),
            message: format_server_error(i32::from(code), raw_message),
        }
    }

    /// Create a server error with no error code (message passes through).
    pub fn server_message(raw_message: impl Into<String>) -> Self {
        Self::Server {
            code: None,
            message: raw_message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Format a raw server error code and message into a user-facing message.
///
/// Known client/server codes get an actionable rewrite that retains the raw
/// text for diagnostics. Unknown codes (including negative sentinel codes
/// meaning "no code") pass the raw message through verbatim. Total function.
pub fn format_server_error(code: i32, message: &str) -> String {
    match code {
        // CR_CONNECTION_ERROR / CR_CONN_HOST_ERROR
        2002 | 2003 => format!(
            "The server is not responding (or the local server's socket is not correctly configured): {message}"
        ),
        // ER_ACCESS_DENIED_NO_PASSWORD: the session was authenticated through
        // a plugin that rejects this operation; a fresh login is required.
        1698 => format!(
            "{message} - log out (/logout) and sign in again with an account that uses password authentication."
        ),
        // ER_CANT_CREATE_TABLE: an OS-level errno in the message means a
        // filesystem permission problem, which trumps the engine hint.
        1005 if message.contains("errno: 13") => format!(
            "{message} - please check privileges of the directory containing the database."
        ),
        1005 => format!("{message} (details in the storage engine status, /server/engines)"),
        _ => message.to_string(),
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                match db_err.try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>() {
                    Some(mysql_err) => DbError::server(mysql_err.number(), mysql_err.message()),
                    None => DbError::server_message(db_err.message().to_string()),
                }
            }
            sqlx::Error::RowNotFound => DbError::server_message("No rows returned"),
            sqlx::Error::PoolTimedOut => DbError::connection(
                "Timed out acquiring a connection from the pool",
                "Check that the server is reachable and not overloaded",
            ),
            sqlx::Error::PoolClosed => {
                DbError::connection("Connection pool is closed", "Reconnect to the server")
            }
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {io_err}"),
                "Check network connectivity and server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {tls_err}"),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {msg}"),
                "Check server compatibility",
            ),
            sqlx::Error::ColumnNotFound(col) => {
                DbError::internal(format!("Column not found: {col}"))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => DbError::internal(format!(
                "Column index {index} out of bounds (len: {len})"
            )),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {index}: {source}"))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {source}")),
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            _ => DbError::internal(format!("Unknown database error: {err}")),
        }
    }
}
