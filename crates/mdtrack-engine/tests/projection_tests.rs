//! Projection export tests: fixed queries to typed record sets.

use mdtrack_core::errors::TrackErrorKind;
use mdtrack_core::model::RowValue;
use mdtrack_engine::projection::{export_projections, load_defs, run_projections, ProjectionDef};
use mdtrack_store::SqliteSource;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn seeded_db(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("master.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE text_data (id INTEGER, category INTEGER, "index" INTEGER, text TEXT);
        INSERT INTO text_data VALUES (1, 5, 100, 'Card A'), (2, 5, 101, 'Card B'), (3, 7, 100, 'Other');
        "#,
    )
    .unwrap();
    path
}

fn defs() -> Vec<ProjectionDef> {
    vec![ProjectionDef {
        name: "cards".to_string(),
        query: "SELECT \"index\" AS id, text AS name FROM text_data WHERE category=5".to_string(),
    }]
}

#[test]
fn test_projection_maps_columns_to_fields() {
    let dir = TempDir::new().unwrap();
    let source = SqliteSource::open(seeded_db(&dir)).unwrap();

    let sets = run_projections(&source, &defs()).unwrap();
    let cards = sets.get("cards").unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].get("id"), Some(&RowValue::Integer(100)));
    assert_eq!(cards[0].get("name"), Some(&RowValue::Text("Card A".into())));
}

#[test]
fn test_bad_query_is_source_access_error() {
    let dir = TempDir::new().unwrap();
    let source = SqliteSource::open(seeded_db(&dir)).unwrap();

    let bad = vec![ProjectionDef {
        name: "broken".to_string(),
        query: "SELECT missing FROM nowhere".to_string(),
    }];
    let err = run_projections(&source, &bad).unwrap_err();
    assert_eq!(err.kind(), TrackErrorKind::SourceAccess);
}

#[test]
fn test_export_writes_compressed_document() {
    let dir = TempDir::new().unwrap();
    let source = SqliteSource::open(seeded_db(&dir)).unwrap();
    let out = dir.path().join("projections.json.zst");

    let counts = export_projections(&source, &defs(), &out).unwrap();
    assert_eq!(counts.get("cards"), Some(&2));

    let compressed = fs::read(&out).unwrap();
    let json = zstd::decode_all(compressed.as_slice()).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(value["cards"][1]["name"], "Card B");
}

#[test]
fn test_load_defs_rejects_duplicates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("defs.json");
    fs::write(
        &path,
        r#"[{"name":"a","query":"SELECT 1"},{"name":"a","query":"SELECT 2"}]"#,
    )
    .unwrap();

    let err = load_defs(&path).unwrap_err();
    assert_eq!(err.kind(), TrackErrorKind::InvalidInput);
}

#[test]
fn test_load_defs_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("defs.json");
    fs::write(
        &path,
        r#"[{"name":"cards","query":"SELECT id FROM text_data"}]"#,
    )
    .unwrap();

    let defs = load_defs(&path).unwrap();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].name, "cards");
}
