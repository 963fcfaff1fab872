//! End-to-end tests for the consolidation engine.

use std::path::{Path, PathBuf};

use dbmerge_core::{MergeConfig, TransferOutcome};
use dbmerge_engine::{ConsolidationEngine, EngineError};
use rusqlite::Connection;

/// Creates a SQLite database at `dir/name` by running `sql`.
fn create_db(dir: &Path, name: &str, sql: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(sql).unwrap();
    path
}

fn config(sources: Vec<PathBuf>, destination: PathBuf) -> MergeConfig {
    MergeConfig {
        sources,
        destination,
        ..MergeConfig::default()
    }
}

fn run(config: MergeConfig) -> dbmerge_core::Summary {
    ConsolidationEngine::new(config).unwrap().run().unwrap()
}

fn rows(db: &Path, sql: &str) -> Vec<(i64, String)> {
    let conn = Connection::open(db).unwrap();
    let mut stmt = conn.prepare(sql).unwrap();
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    rows
}

fn table_names(db: &Path) -> Vec<String> {
    let conn = Connection::open(db).unwrap();
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    let names = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();
    names
}

const T_SCHEMA: &str = "CREATE TABLE T (id INTEGER PRIMARY KEY, v TEXT);";

fn two_overlapping_sources(dir: &Path) -> PathBuf {
    let sources = dir.join("sources");
    create_db(
        &sources,
        "first.db",
        &format!("{T_SCHEMA} INSERT INTO T VALUES (1, 'a'), (2, 'b');"),
    );
    create_db(
        &sources,
        "nested/second.sqlite",
        &format!("{T_SCHEMA} INSERT INTO T VALUES (2, 'b'), (3, 'c');"),
    );
    sources
}

#[test]
fn merges_overlapping_rows_without_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let sources = two_overlapping_sources(dir.path());
    let destination = dir.path().join("result.db");

    let summary = run(config(vec![sources], destination.clone()));

    assert_eq!(summary.databases_found, 2);
    assert_eq!(summary.tables_copied, 2);
    assert_eq!(summary.tables_failed, 0);
    assert_eq!(summary.rows_inserted, 3);
    assert_eq!(
        rows(&destination, "SELECT id, v FROM T ORDER BY id"),
        vec![(1, "a".into()), (2, "b".into()), (3, "c".into())]
    );
}

#[test]
fn second_run_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let sources = two_overlapping_sources(dir.path());
    let destination = dir.path().join("result.db");

    run(config(vec![sources.clone()], destination.clone()));
    let before = rows(&destination, "SELECT id, v FROM T ORDER BY id");

    let summary = run(config(vec![sources], destination.clone()));
    assert_eq!(summary.tables_failed, 0);
    assert_eq!(summary.rows_inserted, 0);
    assert_eq!(rows(&destination, "SELECT id, v FROM T ORDER BY id"), before);
}

#[test]
fn allowlist_limits_transferred_tables() {
    let dir = tempfile::tempdir().unwrap();
    let src = create_db(
        dir.path(),
        "src/app.db",
        "CREATE TABLE USERS (id INTEGER PRIMARY KEY, name TEXT);
         CREATE TABLE POSTS (id INTEGER PRIMARY KEY, body TEXT);
         CREATE TABLE LOGS (id INTEGER PRIMARY KEY, line TEXT);
         INSERT INTO USERS VALUES (1, 'ann');
         INSERT INTO POSTS VALUES (1, 'hello');
         INSERT INTO LOGS VALUES (1, 'boot');",
    );
    let destination = dir.path().join("result.db");

    let summary = run(MergeConfig {
        tables: vec!["USERS".into(), "POSTS".into()],
        ..config(vec![src], destination.clone())
    });

    assert_eq!(summary.tables_copied, 2);
    assert_eq!(table_names(&destination), vec!["POSTS", "USERS"]);
    let skipped = summary.sources[0]
        .tables
        .iter()
        .find(|t| t.table == "LOGS")
        .unwrap();
    assert_eq!(skipped.outcome, TransferOutcome::Skipped);
}

#[test]
fn failing_table_does_not_affect_siblings_or_other_sources() {
    let dir = tempfile::tempdir().unwrap();
    let sources = dir.path().join("sources");
    create_db(
        &sources,
        "x.db",
        "CREATE TABLE USERS (id INTEGER PRIMARY KEY, name TEXT);
         CREATE TABLE POSTS (id INTEGER PRIMARY KEY, body TEXT);
         INSERT INTO USERS VALUES (1, 'ann');
         INSERT INTO POSTS VALUES (1, 'hello');",
    );
    create_db(
        &sources,
        "y.db",
        "CREATE TABLE COMMENTS (id INTEGER PRIMARY KEY, text TEXT);
         INSERT INTO COMMENTS VALUES (1, 'nice');",
    );

    // POSTS already exists in the destination with an incompatible shape.
    let destination = create_db(
        dir.path(),
        "result.db",
        "CREATE TABLE POSTS (id INTEGER PRIMARY KEY, title TEXT NOT NULL);",
    );

    let summary = run(config(vec![sources], destination.clone()));

    assert_eq!(summary.databases_found, 2);
    assert_eq!(summary.tables_copied, 2);
    assert_eq!(summary.tables_failed, 1);
    assert_eq!(
        rows(&destination, "SELECT id, name FROM USERS"),
        vec![(1, "ann".into())]
    );
    assert_eq!(
        rows(&destination, "SELECT id, text FROM COMMENTS"),
        vec![(1, "nice".into())]
    );

    let x = summary
        .sources
        .iter()
        .find(|s| s.path.ends_with("x.db"))
        .unwrap();
    let posts = x.tables.iter().find(|t| t.table == "POSTS").unwrap();
    assert!(posts.outcome.is_failed());
}

#[test]
fn empty_table_creates_schema_only() {
    let dir = tempfile::tempdir().unwrap();
    let src = create_db(dir.path(), "src/empty.db", T_SCHEMA);
    let destination = dir.path().join("result.db");

    let summary = run(config(vec![src], destination.clone()));

    assert_eq!(summary.tables_copied, 1);
    assert_eq!(summary.rows_inserted, 0);
    assert_eq!(table_names(&destination), vec!["T"]);
    assert!(rows(&destination, "SELECT id, v FROM T").is_empty());
}

#[test]
fn unreadable_source_is_reported_and_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let sources = dir.path().join("sources");
    create_db(
        &sources,
        "good.db",
        &format!("{T_SCHEMA} INSERT INTO T VALUES (1, 'a');"),
    );
    std::fs::write(sources.join("broken.db"), "not a database\n".repeat(64)).unwrap();
    let destination = dir.path().join("result.db");

    let summary = run(config(vec![sources], destination.clone()));

    assert_eq!(summary.databases_found, 2);
    assert_eq!(summary.tables_copied, 1);
    let broken = summary
        .sources
        .iter()
        .find(|s| s.path.ends_with("broken.db"))
        .unwrap();
    assert!(broken.error.is_some());
    assert!(broken.tables.is_empty());
}

#[test]
fn non_matching_extensions_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let sources = dir.path().join("sources");
    create_db(&sources, "a.db", &format!("{T_SCHEMA} INSERT INTO T VALUES (1, 'a');"));
    create_db(&sources, "c.txt", &format!("{T_SCHEMA} INSERT INTO T VALUES (9, 'z');"));
    let destination = dir.path().join("result.db");

    let summary = run(config(vec![sources], destination.clone()));

    assert_eq!(summary.databases_found, 1);
    assert_eq!(
        rows(&destination, "SELECT id, v FROM T"),
        vec![(1, "a".into())]
    );
}

#[test]
fn destination_inside_source_tree_is_not_a_source() {
    let dir = tempfile::tempdir().unwrap();
    create_db(
        dir.path(),
        "a.db",
        &format!("{T_SCHEMA} INSERT INTO T VALUES (1, 'a');"),
    );
    let destination = dir.path().join("result.db");

    run(config(vec![dir.path().to_path_buf()], destination.clone()));
    // The destination now exists inside the scanned root.
    let summary = run(config(vec![dir.path().to_path_buf()], destination.clone()));

    assert_eq!(summary.databases_found, 1);
    assert_eq!(summary.tables_failed, 0);
}

#[test]
fn small_parameter_limit_still_copies_everything() {
    let dir = tempfile::tempdir().unwrap();
    let inserts: Vec<String> = (1..=50)
        .map(|i| format!("INSERT INTO T VALUES ({i}, 'v{i}');"))
        .collect();
    let src = create_db(
        dir.path(),
        "src/many.db",
        &format!("{T_SCHEMA} {}", inserts.join("\n")),
    );
    let destination = dir.path().join("result.db");

    let summary = run(MergeConfig {
        max_bind_parameters: 7,
        ..config(vec![src], destination.clone())
    });

    assert_eq!(summary.rows_inserted, 50);
    assert_eq!(rows(&destination, "SELECT id, v FROM T ORDER BY id").len(), 50);
}

#[test]
fn too_wide_table_fails_alone() {
    let dir = tempfile::tempdir().unwrap();
    let src = create_db(
        dir.path(),
        "src/mixed.db",
        "CREATE TABLE narrow (id INTEGER PRIMARY KEY);
         CREATE TABLE wide (a, b, c, d);
         INSERT INTO narrow VALUES (1);
         INSERT INTO wide VALUES (1, 2, 3, 4);",
    );
    let destination = dir.path().join("result.db");

    let summary = run(MergeConfig {
        max_bind_parameters: 3,
        ..config(vec![src], destination.clone())
    });

    assert_eq!(summary.tables_copied, 1);
    assert_eq!(summary.tables_failed, 1);
    assert_eq!(table_names(&destination), vec!["narrow"]);
}

#[test]
fn many_sources_write_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let sources = dir.path().join("sources");
    for i in 0..16 {
        create_db(
            &sources,
            &format!("db{i}.db"),
            &format!("{T_SCHEMA} INSERT INTO T VALUES ({i}, 'from {i}'), (100, 'shared');"),
        );
    }
    let destination = dir.path().join("result.db");

    let summary = run(MergeConfig {
        jobs: Some(8),
        ..config(vec![sources], destination.clone())
    });

    assert_eq!(summary.databases_found, 16);
    assert_eq!(summary.tables_copied, 16);
    assert_eq!(summary.tables_failed, 0);
    assert_eq!(rows(&destination, "SELECT id, v FROM T").len(), 17);
}

#[test]
fn missing_root_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let result = ConsolidationEngine::new(config(
        vec![dir.path().join("absent")],
        dir.path().join("result.db"),
    ))
    .unwrap()
    .run();

    assert!(matches!(result, Err(EngineError::Discovery(_))));
    assert!(!dir.path().join("result.db").exists());
}

#[test]
fn zero_databases_is_a_valid_run() {
    let dir = tempfile::tempdir().unwrap();
    let empty = dir.path().join("empty");
    std::fs::create_dir_all(&empty).unwrap();

    let summary = run(config(vec![empty], dir.path().join("result.db")));
    assert_eq!(summary.databases_found, 0);
    assert_eq!(summary.tables_copied, 0);
    assert!(summary.destination.is_absolute());
}

const KEYLESS: &str = "CREATE TABLE log (id INT, v TEXT); INSERT INTO log VALUES (1, 'a'), (2, 'b');";

#[test]
fn overlapping_roots_spelled_differently_read_each_file_once() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("a");
    create_db(&root, "x.db", KEYLESS);

    let summary = run(config(
        vec![root.clone(), root.join("..").join("a")],
        dir.path().join("result.db"),
    ));

    assert_eq!(summary.databases_found, 1);
    assert_eq!(
        rows(&dir.path().join("result.db"), "SELECT id, v FROM log").len(),
        2
    );
}

#[test]
fn keyless_table_rows_repeat_on_second_run() {
    let dir = tempfile::tempdir().unwrap();
    let src = create_db(dir.path(), "src/keyless.db", KEYLESS);
    let destination = dir.path().join("result.db");

    run(config(vec![src.clone()], destination.clone()));
    let summary = run(config(vec![src], destination.clone()));

    // Without a key, OR IGNORE has nothing to conflict on.
    assert_eq!(summary.rows_inserted, 2);
    assert_eq!(rows(&destination, "SELECT id, v FROM log").len(), 4);
}

#[test]
fn fts5_table_counts_as_one_table() {
    let dir = tempfile::tempdir().unwrap();
    let src = create_db(
        dir.path(),
        "src/search.db",
        "CREATE VIRTUAL TABLE docs USING fts5(title, body);
         INSERT INTO docs VALUES ('rust', 'ownership');",
    );

    let summary = run(config(vec![src], dir.path().join("result.db")));
    assert_eq!(summary.tables_copied, 1);
    assert_eq!(summary.tables_failed, 0);
}
