#![allow(dead_code)]

//! Shared test support: a scripted connection double.
//!
//! `StubConnection` implements the `Connection` capability directly, replays
//! canned result sets keyed by SQL text (exact match or substring pattern)
//! and records every statement it receives so tests can assert how many
//! probes actually hit the wire.

use async_trait::async_trait;
use mysql_dbal::{Connection, DbError, DbResult, FieldMeta, SqlResult, SqlRow};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct StubInner {
    responses: Mutex<Vec<(String, SqlResult)>>,
    errors: Mutex<HashMap<String, (u16, String)>>,
    log: Mutex<Vec<String>>,
}

/// Cloneable handle; clones share the same script and log.
#[derive(Clone, Default)]
pub struct StubConnection {
    inner: Arc<StubInner>,
}

impl StubConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a result for statements matching `pattern` (exact SQL or a
    /// substring of it).
    pub fn with_result(self, pattern: &str, result: SqlResult) -> Self {
        self.inner
            .responses
            .lock()
            .unwrap()
            .push((pattern.to_string(), result));
        self
    }

    /// Script a server error for statements matching `pattern`.
    pub fn with_error(self, pattern: &str, code: u16, message: &str) -> Self {
        self.inner
            .errors
            .lock()
            .unwrap()
            .insert(pattern.to_string(), (code, message.to_string()));
        self
    }

    /// Every statement received, in order.
    pub fn queries(&self) -> Vec<String> {
        self.inner.log.lock().unwrap().clone()
    }

    /// How many received statements contain `pattern`.
    pub fn query_count(&self, pattern: &str) -> usize {
        self.inner
            .log
            .lock()
            .unwrap()
            .iter()
            .filter(|sql| sql.contains(pattern))
            .count()
    }

    fn record(&self, sql: &str) {
        self.inner.log.lock().unwrap().push(sql.to_string());
    }

    fn scripted_error(&self, sql: &str) -> Option<DbError> {
        let errors = self.inner.errors.lock().unwrap();
        errors
            .iter()
            .find(|(pattern, _)| sql == pattern.as_str() || sql.contains(pattern.as_str()))
            .map(|(_, (code, message))| DbError::server(*code, message))
    }

    fn lookup(&self, sql: &str) -> Option<SqlResult> {
        let responses = self.inner.responses.lock().unwrap();
        responses
            .iter()
            .find(|(pattern, _)| sql == pattern.as_str() || sql.contains(pattern.as_str()))
            .map(|(_, result)| result.clone())
    }
}

#[async_trait]
impl Connection for StubConnection {
    async fn query(&self, sql: &str) -> DbResult<u64> {
        self.record(sql);
        if let Some(err) = self.scripted_error(sql) {
            return Err(err);
        }
        Ok(0)
    }

    async fn fetch_single_row(&self, sql: &str) -> DbResult<Option<SqlRow>> {
        self.record(sql);
        if let Some(err) = self.scripted_error(sql) {
            return Err(err);
        }
        match self.lookup(sql) {
            Some(result) => Ok(result.rows.first().cloned()),
            None => Ok(None),
        }
    }

    async fn fetch_result(&self, sql: &str) -> DbResult<SqlResult> {
        self.record(sql);
        if let Some(err) = self.scripted_error(sql) {
            return Err(err);
        }
        self.lookup(sql)
            .ok_or_else(|| DbError::internal(format!("unscripted statement: {sql}")))
    }
}

/// Build a result set from field names and rows of values.
pub fn rows_result(fields: &[&str], rows: Vec<Vec<Value>>) -> SqlResult {
    let field_meta = fields
        .iter()
        .map(|name| FieldMeta::new(*name, ""))
        .collect::<Vec<_>>();
    let mapped = rows
        .into_iter()
        .map(|values| {
            fields
                .iter()
                .zip(values)
                .map(|(name, value)| (name.to_string(), value))
                .collect::<SqlRow>()
        })
        .collect();
    SqlResult {
        fields: field_meta,
        rows: mapped,
    }
}

/// Build a one-cell result set - the shape of `SELECT @@var` probes.
pub fn scalar_result(field: &str, value: Value) -> SqlResult {
    rows_result(&[field], vec![vec![value]])
}
