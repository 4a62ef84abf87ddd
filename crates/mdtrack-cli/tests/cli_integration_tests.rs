//! CLI integration tests
//!
//! These tests verify the CLI drives the tracking pipeline end to end:
//! recording versions, short-circuiting unchanged sources, and listing
//! history.

use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn seeded_db(temp_dir: &TempDir) -> PathBuf {
    let db_path = temp_dir.path().join("master.db");
    let conn = Connection::open(&db_path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE skill (id INTEGER, name TEXT);
        INSERT INTO skill VALUES (1, 'Sprint'), (2, 'Stamina');
        "#,
    )
    .unwrap();
    db_path
}

fn run_cli(temp_dir: &TempDir, args: &[&str]) -> std::process::Output {
    let cli_bin = env!("CARGO_BIN_EXE_mdtrack");
    Command::new(cli_bin)
        .current_dir(temp_dir.path())
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn run_tracking(temp_dir: &TempDir, db: &Path) -> std::process::Output {
    run_cli(
        temp_dir,
        &["run", "--db", db.to_str().unwrap(), "--out", "artifacts"],
    )
}

#[test]
fn test_cli_run_records_then_short_circuits() {
    let temp_dir = TempDir::new().unwrap();
    let db = seeded_db(&temp_dir);

    // First run records a version
    let first = run_tracking(&temp_dir, &db);
    assert!(
        first.status.success(),
        "first run should succeed. Stderr: {}",
        String::from_utf8_lossy(&first.stderr)
    );
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(stdout.contains("Version recorded"));
    assert!(stdout.contains("first version"));

    // Second run on the unchanged source is a no-op
    let second = run_tracking(&temp_dir, &db);
    assert!(second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("Source unchanged"));

    // Exactly one ledger entry on disk
    let ledger: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(temp_dir.path().join("artifacts/versions.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(ledger.as_array().unwrap().len(), 1);
}

#[test]
fn test_cli_records_change_and_lists_history() {
    let temp_dir = TempDir::new().unwrap();
    let db = seeded_db(&temp_dir);

    assert!(run_tracking(&temp_dir, &db).status.success());

    let conn = Connection::open(&db).unwrap();
    conn.execute("INSERT INTO skill VALUES (3, 'Guts')", [])
        .unwrap();
    drop(conn);

    let second = run_tracking(&temp_dir, &db);
    assert!(second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("tables_changed: 1"));

    let history = run_cli(&temp_dir, &["history", "--out", "artifacts"]);
    assert!(history.status.success());
    let stdout = String::from_utf8_lossy(&history.stdout);
    assert!(stdout.contains("initial version"));
    assert!(stdout.contains("1 tables changed (+1 -0 ~0)"));
    assert_eq!(stdout.lines().count(), 2);
}

#[test]
fn test_cli_show_prints_recorded_diff() {
    let temp_dir = TempDir::new().unwrap();
    let db = seeded_db(&temp_dir);

    assert!(run_tracking(&temp_dir, &db).status.success());

    let conn = Connection::open(&db).unwrap();
    conn.execute("UPDATE skill SET name='Sprint+' WHERE id=1", [])
        .unwrap();
    drop(conn);
    assert!(run_tracking(&temp_dir, &db).status.success());

    // The second ledger entry names the diff artifact
    let ledger: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(temp_dir.path().join("artifacts/versions.json")).unwrap(),
    )
    .unwrap();
    let short_hash = ledger[1]["short_hash"].as_str().unwrap();

    let show = run_cli(&temp_dir, &["show", short_hash, "--out", "artifacts"]);
    assert!(
        show.status.success(),
        "show should succeed. Stderr: {}",
        String::from_utf8_lossy(&show.stderr)
    );
    let stdout = String::from_utf8_lossy(&show.stdout);
    assert!(stdout.contains("skill: +0 -0 ~1"));
}

#[test]
fn test_cli_missing_source_fails_with_error() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_cli(
        &temp_dir,
        &["run", "--db", "absent.db", "--out", "artifacts"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_SOURCE_ACCESS"));

    // Nothing was written
    assert!(!temp_dir.path().join("artifacts/versions.json").exists());
    assert!(!temp_dir.path().join("artifacts/meta.json").exists());
}

#[test]
fn test_cli_export_projections() {
    let temp_dir = TempDir::new().unwrap();
    let db = seeded_db(&temp_dir);

    fs::write(
        temp_dir.path().join("defs.json"),
        r#"[{"name":"skills","query":"SELECT id, name FROM skill"}]"#,
    )
    .unwrap();

    let output = run_cli(
        &temp_dir,
        &[
            "export",
            "--db",
            db.to_str().unwrap(),
            "--defs",
            "defs.json",
            "--output",
            "artifacts/projections.json.zst",
        ],
    );
    assert!(
        output.status.success(),
        "export should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("skills: 2 records"));
    assert!(temp_dir.path().join("artifacts/projections.json.zst").exists());
}

#[test]
fn test_cli_assets_pack() {
    let temp_dir = TempDir::new().unwrap();
    let assets = temp_dir.path().join("assets");
    fs::create_dir_all(assets.join("icons")).unwrap();
    fs::write(assets.join("icons/a.png"), b"img-a").unwrap();
    fs::write(assets.join("data.json"), b"{}").unwrap();

    let output = run_cli(
        &temp_dir,
        &["assets", "pack", "--src", "assets", "--output", "out.pack.zst"],
    );
    assert!(
        output.status.success(),
        "pack should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Packed 2 entries"));
    assert!(temp_dir.path().join("out.pack.zst").exists());
}
