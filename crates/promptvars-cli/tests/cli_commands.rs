//! End-to-end tests for the `pv` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn pv(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pv").unwrap();
    cmd.env_remove("PROMPTVARS_DB_PATH")
        .env_remove("RUST_LOG")
        .arg("--db")
        .arg(db);
    cmd
}

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn reconcile_then_list() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("vars.db");
    let vars = write(
        &dir,
        "vars.json",
        r#"[{"name": "topic", "required": true}, {"name": "tone", "type": "ENUM", "options": ["formal", "casual"]}]"#,
    );

    pv(&db)
        .args(["-f", "json", "reconcile", "prompt-1"])
        .arg(&vars)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"orderIndex\": 1"))
        .stdout(predicate::str::contains("\"type\": \"ENUM\""));

    pv(&db)
        .args(["list", "prompt-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("topic"))
        .stdout(predicate::str::contains("formal, casual"));
}

#[test]
fn plan_after_reconcile_is_empty() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("vars.db");
    let vars = write(&dir, "vars.json", r#"[{"name": "a"}, {"name": "b"}]"#);

    pv(&db).args(["reconcile", "p"]).arg(&vars).assert().success();

    pv(&db)
        .args(["plan", "p"])
        .arg(&vars)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "0 insert, 0 update, 2 unchanged, 0 delete",
        ));

    let next = write(&dir, "next.json", r#"[{"name": "b"}]"#);
    pv(&db)
        .args(["plan", "p"])
        .arg(&next)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 insert, 1 update, 0 unchanged, 1 delete"));

    pv(&db)
        .args(["-f", "json", "plan", "p"])
        .arg(&next)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"actions\": [\n    \"update\"\n  ]"));
}

#[test]
fn clear_empties_prompt() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("vars.db");
    let vars = write(&dir, "vars.json", r#"[{"name": "a"}]"#);

    pv(&db).args(["reconcile", "p"]).arg(&vars).assert().success();
    pv(&db).args(["clear", "p"]).assert().success();

    pv(&db)
        .args(["list", "p"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No variables."));
}

#[test]
fn duplicate_names_fail() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("vars.db");
    let vars = write(&dir, "vars.json", r#"[{"name": "a"}, {"name": "a"}]"#);

    pv(&db)
        .args(["reconcile", "p"])
        .arg(&vars)
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate variable name 'a'"));
}

#[test]
fn config_file_supplies_database() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("from-config.db");
    let config = write(
        &dir,
        "config.toml",
        &format!("[database]\npath = {:?}\n", db.to_str().unwrap()),
    );

    let mut cmd = Command::cargo_bin("pv").unwrap();
    cmd.env_remove("PROMPTVARS_DB_PATH")
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("from-config.db"));
}
