//! Integration tests for schema introspection.
//!
//! Cover both introspection strategies, their agreement on shared semantic
//! fields, and the database-listing aggregation (sums, sorting, slicing).

mod common;

use common::{StubConnection, rows_result};
use mysql_dbal::cache::keys;
use mysql_dbal::models::database::columns;
use mysql_dbal::{ConnectionFacade, SchemaInspector, SessionCache, Settings, SortOrder};
use serde_json::json;

const SHOW_STATUS_FIELDS: &[&str] = &[
    "Name",
    "Engine",
    "Rows",
    "Data_length",
    "Index_length",
    "Data_free",
    "Collation",
];

const CATALOG_FIELDS: &[&str] = &[
    "TABLE_NAME",
    "TABLE_TYPE",
    "ENGINE",
    "TABLE_ROWS",
    "DATA_LENGTH",
    "INDEX_LENGTH",
    "DATA_FREE",
    "TABLE_COLLATION",
];

fn show_settings() -> Settings {
    Settings {
        disable_information_schema: true,
        ..Settings::default()
    }
}

/// The same two tables, as each strategy's source rows report them.
fn show_status_rows() -> Vec<Vec<serde_json::Value>> {
    vec![
        vec![
            json!("actor"),
            json!("InnoDB"),
            json!(200),
            json!(16384),
            json!(8192),
            json!(0),
            json!("utf8mb4_general_ci"),
        ],
        vec![
            json!("film"),
            json!("InnoDB"),
            json!(1000),
            json!(65536),
            json!(16384),
            json!(512),
            json!("utf8mb4_general_ci"),
        ],
    ]
}

fn catalog_rows() -> Vec<Vec<serde_json::Value>> {
    vec![
        vec![
            json!("actor"),
            json!("BASE TABLE"),
            json!("InnoDB"),
            json!(200),
            json!(16384),
            json!(8192),
            json!(0),
            json!("utf8mb4_general_ci"),
        ],
        vec![
            json!("film"),
            json!("BASE TABLE"),
            json!("InnoDB"),
            json!(1000),
            json!(65536),
            json!(16384),
            json!(512),
            json!("utf8mb4_general_ci"),
        ],
    ]
}

// =============================================================================
// Strategy A: SHOW TABLE STATUS
// =============================================================================

#[tokio::test]
async fn test_show_strategy_emits_legacy_keys_only() {
    let stub = StubConnection::new().with_result(
        "SHOW TABLE STATUS FROM `sakila`;",
        rows_result(SHOW_STATUS_FIELDS, show_status_rows()),
    );

    let tables = SchemaInspector::list_tables(&stub, &show_settings(), "sakila")
        .await
        .unwrap();

    assert_eq!(tables.len(), 2);
    let actor = &tables["actor"];
    assert_eq!(actor.get("Name"), Some(&json!("actor")));
    assert_eq!(actor.get("Engine"), Some(&json!("InnoDB")));
    assert_eq!(actor.get("Rows"), Some(&json!(200)));
    assert!(!actor.contains_key("TABLE_NAME"));
    assert!(!actor.contains_key("TABLE_TYPE"));
}

#[tokio::test]
async fn test_show_strategy_quotes_database_name() {
    let stub = StubConnection::new().with_result(
        "SHOW TABLE STATUS FROM `we``ird`;",
        rows_result(SHOW_STATUS_FIELDS, vec![]),
    );

    let tables = SchemaInspector::list_tables(&stub, &show_settings(), "we`ird")
        .await
        .unwrap();

    assert!(tables.is_empty());
    assert_eq!(stub.query_count("SHOW TABLE STATUS"), 1);
}

// =============================================================================
// Strategy B: information_schema catalog
// =============================================================================

#[tokio::test]
async fn test_catalog_strategy_emits_both_key_sets() {
    let stub = StubConnection::new().with_result(
        "TABLE_SCHEMA = 'sakila'",
        rows_result(CATALOG_FIELDS, catalog_rows()),
    );

    let tables = SchemaInspector::list_tables(&stub, &Settings::default(), "sakila")
        .await
        .unwrap();

    let film = &tables["film"];
    assert_eq!(film.get("TABLE_NAME"), Some(&json!("film")));
    assert_eq!(film.get("Name"), Some(&json!("film")));
    assert_eq!(film.get("TABLE_ROWS"), film.get("Rows"));
    assert_eq!(film.get("ENGINE"), film.get("Engine"));
    assert_eq!(film.get("TABLE_TYPE"), Some(&json!("BASE TABLE")));
}

#[tokio::test]
async fn test_catalog_strategy_synthesizes_table_type() {
    // A source row without TABLE_TYPE still carries one in the output.
    let stub = StubConnection::new().with_result(
        "TABLE_SCHEMA = 'sakila'",
        rows_result(
            &["TABLE_NAME", "ENGINE"],
            vec![vec![json!("actor"), json!("InnoDB")]],
        ),
    );

    let tables = SchemaInspector::list_tables(&stub, &Settings::default(), "sakila")
        .await
        .unwrap();

    assert_eq!(tables["actor"].get("TABLE_TYPE"), Some(&json!("BASE TABLE")));
}

#[tokio::test]
async fn test_strategies_agree_on_shared_semantic_fields() {
    let show_stub = StubConnection::new().with_result(
        "SHOW TABLE STATUS FROM `sakila`;",
        rows_result(SHOW_STATUS_FIELDS, show_status_rows()),
    );
    let catalog_stub = StubConnection::new().with_result(
        "TABLE_SCHEMA = 'sakila'",
        rows_result(CATALOG_FIELDS, catalog_rows()),
    );

    let via_show = SchemaInspector::table_status(&show_stub, &show_settings(), "sakila")
        .await
        .unwrap();
    let via_catalog =
        SchemaInspector::table_status(&catalog_stub, &Settings::default(), "sakila")
            .await
            .unwrap();

    assert_eq!(via_show.len(), via_catalog.len());
    for (name, show_table) in &via_show {
        let catalog_table = &via_catalog[name];
        assert_eq!(show_table.name, catalog_table.name);
        assert_eq!(show_table.engine, catalog_table.engine);
        assert_eq!(show_table.rows, catalog_table.rows);
        assert_eq!(show_table.data_length, catalog_table.data_length);
    }
}

// =============================================================================
// SHOW TABLES
// =============================================================================

#[tokio::test]
async fn test_table_names() {
    let stub = StubConnection::new().with_result(
        "SHOW TABLES FROM `sakila`;",
        rows_result(
            &["Tables_in_sakila"],
            vec![vec![json!("actor")], vec![json!("film")]],
        ),
    );

    let names = SchemaInspector::table_names(&stub, "sakila").await.unwrap();
    assert_eq!(names, vec!["actor", "film"]);
}

// =============================================================================
// Database listing aggregation
// =============================================================================

/// Two databases with known sums: db_small (rows 10, data 1000, index 100),
/// db_big (rows 5000, data 200000, index 50000).
fn aggregation_stub() -> StubConnection {
    StubConnection::new()
        .with_result(
            "TABLE_SCHEMA = 'db_small'",
            rows_result(
                CATALOG_FIELDS,
                vec![vec![
                    json!("t1"),
                    json!("BASE TABLE"),
                    json!("InnoDB"),
                    json!(10),
                    json!(1000),
                    json!(100),
                    json!(0),
                    json!("utf8mb4_general_ci"),
                ]],
            ),
        )
        .with_result(
            "TABLE_SCHEMA = 'db_big'",
            rows_result(
                CATALOG_FIELDS,
                vec![
                    vec![
                        json!("t1"),
                        json!("BASE TABLE"),
                        json!("InnoDB"),
                        json!(2000),
                        json!(100000),
                        json!(30000),
                        json!(0),
                        json!("utf8mb4_general_ci"),
                    ],
                    vec![
                        json!("t2"),
                        json!("BASE TABLE"),
                        json!("InnoDB"),
                        json!(3000),
                        json!(100000),
                        json!(20000),
                        json!(512),
                        json!("utf8mb4_general_ci"),
                    ],
                ],
            ),
        )
        .with_result(
            "information_schema.SCHEMATA",
            rows_result(
                &["SCHEMA_NAME", "DEFAULT_COLLATION_NAME"],
                vec![
                    vec![json!("db_small"), json!("utf8mb4_general_ci")],
                    vec![json!("db_big"), json!("latin1_swedish_ci")],
                ],
            ),
        )
}

fn names() -> Vec<String> {
    vec!["db_small".to_string(), "db_big".to_string()]
}

#[tokio::test]
async fn test_list_databases_aggregates_sums() {
    let stub = aggregation_stub();
    let mut cache = SessionCache::new();

    let stats = SchemaInspector::list_databases(
        &stub,
        &mut cache,
        &Settings::default(),
        &names(),
        None,
        columns::NAME,
        SortOrder::Ascending,
        100,
        0,
    )
    .await
    .unwrap();

    assert_eq!(stats.len(), 2);
    let big = stats.iter().find(|s| s.name == "db_big").unwrap();
    assert_eq!(big.tables, 2);
    assert_eq!(big.rows, 5000);
    assert_eq!(big.data_length, 200000);
    assert_eq!(big.index_length, 50000);
    assert_eq!(big.data_free, 512);
    assert_eq!(big.total_length(), 250000);
    assert_eq!(big.default_collation.as_deref(), Some("latin1_swedish_ci"));
}

#[tokio::test]
async fn test_list_databases_sorts_by_numeric_aggregate() {
    let stub = aggregation_stub();
    let mut cache = SessionCache::new();

    // Descending by summed row count: db_big first despite its name sorting
    // after db_small.
    let stats = SchemaInspector::list_databases(
        &stub,
        &mut cache,
        &Settings::default(),
        &names(),
        None,
        columns::TABLE_ROWS,
        SortOrder::Descending,
        100,
        0,
    )
    .await
    .unwrap();

    let ordered: Vec<&str> = stats.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(ordered, ["db_big", "db_small"]);
}

#[tokio::test]
async fn test_list_databases_limit_does_not_drop_short_results() {
    let stub = aggregation_stub();
    let mut cache = SessionCache::new();

    let stats = SchemaInspector::list_databases(
        &stub,
        &mut cache,
        &Settings::default(),
        &names(),
        None,
        columns::NAME,
        SortOrder::Ascending,
        100,
        0,
    )
    .await
    .unwrap();

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].name, "db_big");
    assert_eq!(stats[1].name, "db_small");
}

#[tokio::test]
async fn test_list_databases_offset_slices_after_sort() {
    let stub = aggregation_stub();
    let mut cache = SessionCache::new();

    let stats = SchemaInspector::list_databases(
        &stub,
        &mut cache,
        &Settings::default(),
        &names(),
        None,
        columns::NAME,
        SortOrder::Ascending,
        1,
        1,
    )
    .await
    .unwrap();

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].name, "db_small");
}

#[tokio::test]
async fn test_list_databases_like_pattern_filters_names() {
    let stub = aggregation_stub();
    let mut cache = SessionCache::new();

    let stats = SchemaInspector::list_databases(
        &stub,
        &mut cache,
        &Settings::default(),
        &names(),
        Some("%small"),
        columns::NAME,
        SortOrder::Ascending,
        100,
        0,
    )
    .await
    .unwrap();

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].name, "db_small");
    // The filtered-out database is never introspected.
    assert_eq!(stub.query_count("TABLE_SCHEMA = 'db_big'"), 0);
}

#[tokio::test]
async fn test_list_databases_respects_only_db_scope() {
    let stub = aggregation_stub();
    let mut cache = SessionCache::new();
    let settings = Settings {
        only_db: vec!["db_big".to_string()],
        ..Settings::default()
    };

    let stats = SchemaInspector::list_databases(
        &stub,
        &mut cache,
        &settings,
        &names(),
        None,
        columns::NAME,
        SortOrder::Ascending,
        100,
        0,
    )
    .await
    .unwrap();

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].name, "db_big");
}

#[tokio::test]
async fn test_facade_list_databases_uses_cached_database_list() {
    let stub = aggregation_stub().with_result(
        "SHOW DATABASES",
        rows_result(
            &["Database"],
            vec![vec![json!("db_small")], vec![json!("db_big")]],
        ),
    );
    let mut facade = ConnectionFacade::new(Box::new(stub.clone()), Settings::default());

    let stats = facade
        .list_databases(None, columns::TABLE_ROWS, SortOrder::Descending, 100, 0)
        .await
        .unwrap();

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].name, "db_big");
    assert_eq!(stub.query_count("SHOW DATABASES"), 1);

    // A second listing reuses both the database list and the collation map.
    facade
        .list_databases(None, columns::TABLE_ROWS, SortOrder::Descending, 100, 0)
        .await
        .unwrap();
    assert_eq!(stub.query_count("SHOW DATABASES"), 1);
    assert_eq!(stub.query_count("SCHEMATA"), 1);

    // Invalidating the cached list forces a fresh probe.
    facade.invalidate(keys::DATABASE_LIST);
    facade
        .list_databases(None, columns::TABLE_ROWS, SortOrder::Descending, 100, 0)
        .await
        .unwrap();
    assert_eq!(stub.query_count("SHOW DATABASES"), 2);
}
