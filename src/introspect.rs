//! Schema introspection.
//!
//! Two mutually exclusive strategies produce the same table metadata:
//! a per-database `SHOW TABLE STATUS` command, or a single
//! `information_schema` catalog query. The strategy is selected by
//! `Settings::disable_information_schema`; both feed the canonical
//! [`TableStatus`] model, which then serializes to the key shape each
//! strategy's consumers expect.

use crate::cache::{SessionCache, keys};
use crate::config::Settings;
use crate::connection::{Connection, FieldMeta, SqlRow, escape_string, quote_identifier, row_string};
use crate::error::DbResult;
use crate::models::{DatabaseStats, SortOrder, TableStatus};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Collation reported for the system catalog database without querying.
const INFORMATION_SCHEMA_COLLATION: &str = "utf8_general_ci";

mod queries {
    /// Explicit column list so the catalog row shape is stable across
    /// server versions.
    pub const CATALOG_TABLES: &str = "SELECT TABLE_NAME, TABLE_TYPE, ENGINE, VERSION, ROW_FORMAT, \
         TABLE_ROWS, AVG_ROW_LENGTH, DATA_LENGTH, MAX_DATA_LENGTH, INDEX_LENGTH, DATA_FREE, \
         AUTO_INCREMENT, CREATE_TIME, UPDATE_TIME, CHECK_TIME, TABLE_COLLATION, CHECKSUM, \
         CREATE_OPTIONS, TABLE_COMMENT FROM information_schema.TABLES";

    pub const CATALOG_SCHEMATA: &str =
        "SELECT SCHEMA_NAME, DEFAULT_COLLATION_NAME FROM information_schema.SCHEMATA";
}

/// A `{table_name, referring_column, real_column}` triple derived from
/// result-set metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub table_name: String,
    pub referring_column: String,
    pub real_column: String,
}

/// Stateless schema inspector; borrows the connection per call.
pub struct SchemaInspector;

impl SchemaInspector {
    /// Fetch the canonical table status of every table in a database.
    pub async fn table_status(
        conn: &dyn Connection,
        settings: &Settings,
        db: &str,
    ) -> DbResult<BTreeMap<String, TableStatus>> {
        let rows = if settings.disable_information_schema {
            let sql = format!("SHOW TABLE STATUS FROM {};", quote_identifier(db));
            let result = conn.fetch_result(&sql).await?;
            result
                .rows
                .iter()
                .map(TableStatus::from_show_row)
                .collect::<Vec<_>>()
        } else {
            let sql = format!(
                "{} WHERE TABLE_SCHEMA = '{}'",
                queries::CATALOG_TABLES,
                escape_string(db)
            );
            let result = conn.fetch_result(&sql).await?;
            result
                .rows
                .iter()
                .map(TableStatus::from_catalog_row)
                .collect::<Vec<_>>()
        };

        debug!(db = %db, count = rows.len(), "Fetched table status");
        Ok(rows
            .into_iter()
            .filter(|t| !t.name.is_empty())
            .map(|t| (t.name.clone(), t))
            .collect())
    }

    /// List tables in the external map form.
    ///
    /// The `SHOW` strategy emits legacy mixed-case keys only; the catalog
    /// strategy emits uppercase catalog keys with mirrored legacy keys so
    /// downstream code depending on either naming convention works
    /// unmodified.
    pub async fn list_tables(
        conn: &dyn Connection,
        settings: &Settings,
        db: &str,
    ) -> DbResult<BTreeMap<String, SqlRow>> {
        let status = Self::table_status(conn, settings, db).await?;
        Ok(status
            .into_iter()
            .map(|(name, table)| {
                let fields = if settings.disable_information_schema {
                    table.legacy_fields()
                } else {
                    table.dual_fields()
                };
                (name, fields)
            })
            .collect())
    }

    /// List bare table names via `SHOW TABLES`.
    pub async fn table_names(conn: &dyn Connection, db: &str) -> DbResult<Vec<String>> {
        let sql = format!("SHOW TABLES FROM {};", quote_identifier(db));
        let result = conn.fetch_result(&sql).await?;
        let Some(field) = result.fields.first().cloned() else {
            return Ok(Vec::new());
        };
        Ok(result
            .rows
            .iter()
            .filter_map(|row| row_string(row, &field.name))
            .collect())
    }

    /// Look up a database's default collation.
    ///
    /// The system catalog database has a fixed, known collation and is never
    /// queried for it. For user databases the debug path issues one direct
    /// query per call; the normal path batches all schemata into one cached
    /// map. Both paths return identical results for identical inputs.
    pub async fn db_collation(
        conn: &dyn Connection,
        cache: &mut SessionCache,
        settings: &Settings,
        db: &str,
    ) -> DbResult<String> {
        if db.eq_ignore_ascii_case("information_schema") {
            return Ok(INFORMATION_SCHEMA_COLLATION.to_string());
        }

        if settings.debug_sql {
            let sql = format!(
                "{} WHERE SCHEMA_NAME = '{}'",
                queries::CATALOG_SCHEMATA,
                escape_string(db)
            );
            let row = conn.fetch_single_row(&sql).await?;
            return Ok(row
                .and_then(|r| row_string(&r, "DEFAULT_COLLATION_NAME"))
                .unwrap_or_default());
        }

        if let Some(map) = cache.get_as::<HashMap<String, String>>(keys::DB_COLLATIONS) {
            return Ok(map.get(db).cloned().unwrap_or_default());
        }

        let result = conn.fetch_result(queries::CATALOG_SCHEMATA).await?;
        let map: HashMap<String, String> = result
            .rows
            .iter()
            .filter_map(|row| {
                let name = row_string(row, "SCHEMA_NAME")?;
                let collation = row_string(row, "DEFAULT_COLLATION_NAME").unwrap_or_default();
                Some((name, collation))
            })
            .collect();
        debug!(count = map.len(), "Cached database collations");
        let collation = map.get(db).cloned().unwrap_or_default();
        cache.set_as(keys::DB_COLLATIONS, &map);
        Ok(collation)
    }

    /// Aggregate per-database statistics over an externally supplied name
    /// universe, then sort and slice.
    ///
    /// Each database in scope contributes one row summing its tables' data,
    /// index and free-space lengths plus row counts, with the database's
    /// default collation attached. Sorting is stable: rows with equal keys
    /// keep their input order.
    #[allow(clippy::too_many_arguments)]
    pub async fn list_databases(
        conn: &dyn Connection,
        cache: &mut SessionCache,
        settings: &Settings,
        database_names: &[String],
        like_pattern: Option<&str>,
        sort_by: &str,
        sort_order: SortOrder,
        limit: usize,
        offset: usize,
    ) -> DbResult<Vec<DatabaseStats>> {
        let mut stats = Vec::new();

        for name in database_names {
            if !settings.database_in_scope(name) {
                continue;
            }
            if let Some(pattern) = like_pattern {
                if !like_matches(pattern, name) {
                    continue;
                }
            }

            let tables = Self::table_status(conn, settings, name).await?;
            let mut row = DatabaseStats::new(name.clone());
            for table in tables.values() {
                row.add_table(table);
            }
            row.default_collation =
                Some(Self::db_collation(conn, cache, settings, name).await?).filter(|c| !c.is_empty());
            stats.push(row);
        }

        sort_stats(&mut stats, sort_by, sort_order, settings.natural_order);

        debug!(
            count = stats.len(),
            sort_by = %sort_by,
            "Aggregated database statistics"
        );
        Ok(stats.into_iter().skip(offset).take(limit).collect())
    }

    /// Zip result-set column metadata with the display names of a view's
    /// columns into `{table_name, referring_column, real_column}` triples.
    ///
    /// # Panics
    ///
    /// The two inputs must have the same length; a mismatch is a programming
    /// contract violation, not a recoverable condition.
    pub fn column_map_from_result(fields: &[FieldMeta], view_columns: &[String]) -> Vec<ColumnMap> {
        assert_eq!(
            fields.len(),
            view_columns.len(),
            "result metadata and view column names must align"
        );
        fields
            .iter()
            .zip(view_columns)
            .map(|(field, real)| ColumnMap {
                table_name: field.table.clone(),
                referring_column: field.name.clone(),
                real_column: real.clone(),
            })
            .collect()
    }
}

/// Stable sort by the requested column. Numeric columns compare numerically;
/// text columns compare as strings, optionally in natural order.
fn sort_stats(stats: &mut [DatabaseStats], sort_by: &str, order: SortOrder, natural: bool) {
    let numeric = stats
        .first()
        .map(|s| s.numeric_field(sort_by).is_some())
        .unwrap_or(false);

    stats.sort_by(|a, b| {
        let ord = if numeric {
            a.numeric_field(sort_by).cmp(&b.numeric_field(sort_by))
        } else if natural {
            natural_compare(a.text_field(sort_by), b.text_field(sort_by))
        } else {
            a.text_field(sort_by).cmp(b.text_field(sort_by))
        };
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });
}

/// Compare strings treating digit runs as numbers, so `db2` sorts before
/// `db10`.
fn natural_compare(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();

    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let na = take_number(&mut ca);
                    let nb = take_number(&mut cb);
                    match na.cmp(&nb) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                } else {
                    match x.cmp(&y) {
                        Ordering::Equal => {
                            ca.next();
                            cb.next();
                        }
                        other => return other,
                    }
                }
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u64 {
    let mut n: u64 = 0;
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        n = n.saturating_mul(10).saturating_add(u64::from(c as u8 - b'0'));
        chars.next();
    }
    n
}

/// SQL LIKE semantics: `%` matches any run, `_` one character,
/// case-insensitive as with the default collations.
fn like_matches(pattern: &str, value: &str) -> bool {
    fn matches(p: &[char], v: &[char]) -> bool {
        match p.split_first() {
            None => v.is_empty(),
            Some((&'%', rest)) => (0..=v.len()).any(|i| matches(rest, &v[i..])),
            Some((&'_', rest)) => !v.is_empty() && matches(rest, &v[1..]),
            Some((&c, rest)) => v.first() == Some(&c) && matches(rest, &v[1..]),
        }
    }
    let p: Vec<char> = pattern.to_lowercase().chars().collect();
    let v: Vec<char> = value.to_lowercase().chars().collect();
    matches(&p, &v)
}
