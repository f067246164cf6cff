use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tabrecon() -> Command {
    Command::cargo_bin("tabrecon").unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.display().to_string()
}

fn facility_files(dir: &TempDir, chart_avg: &str) -> (String, String) {
    let chart = write(
        dir.path(),
        "chart.csv",
        &format!(
            "Facility Type,Visit Date,Average Time Spent\nGym,2024-01-01,{}\nPool,2024-01-01,12.25\n",
            chart_avg
        ),
    );
    let export = write(
        dir.path(),
        "export.json",
        r#"[
            {"facility_type": "Pool", "visit_date": "2024-01-01", "avg_time_spent": 12.25},
            {"facility_type": "Gym", "visit_date": "2024-01-01", "avg_time_spent": 41.0}
        ]"#,
    );
    (chart, export)
}

fn reconcile_args<'a>(chart: &'a str, export: &'a str) -> Vec<&'a str> {
    vec![
        "reconcile",
        chart,
        export,
        "--key",
        "facility_type,visit_date",
        "--measure",
        "avg_time_spent",
        "--alias",
        "average_time_spent=avg_time_spent",
        "--left-label",
        "html",
        "--right-label",
        "parquet",
    ]
}

#[test]
fn reconcile_clean_exits_zero() {
    let dir = TempDir::new().unwrap();
    let (chart, export) = facility_files(&dir, "41.00");

    tabrecon()
        .args(reconcile_args(&chart, &export))
        .assert()
        .success()
        .stdout(predicate::str::contains("No discrepancies found."));
}

#[test]
fn reconcile_mismatch_exits_one() {
    let dir = TempDir::new().unwrap();
    let (chart, export) = facility_files(&dir, "40.5");

    let mut args = reconcile_args(&chart, &export);
    args.extend(["--format", "json"]);
    tabrecon()
        .args(args)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "(facility_type=Gym, visit_date=2024-01-01) has different avg_time_spent: html=40.5 parquet=41",
        ));
}

#[test]
fn reconcile_unified_output() {
    let dir = TempDir::new().unwrap();
    let (chart, export) = facility_files(&dir, "40.5");

    let mut args = reconcile_args(&chart, &export);
    args.extend(["--format", "unified"]);
    tabrecon()
        .args(args)
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("--- html\n+++ parquet\n"))
        .stdout(predicate::str::contains("-40.5\n+41\n"));
}

#[test]
fn reconcile_unknown_key_is_an_error() {
    let dir = TempDir::new().unwrap();
    let (chart, export) = facility_files(&dir, "41");

    tabrecon()
        .args(["reconcile", &chart, &export, "--key", "facility_id"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("facility_id"));
}

#[test]
fn reconcile_rejects_negative_tolerance() {
    let dir = TempDir::new().unwrap();
    let (chart, export) = facility_files(&dir, "40.5");

    let mut args = reconcile_args(&chart, &export);
    args.push("--tolerance=-1");
    tabrecon()
        .args(args)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("non-negative"));
}

#[test]
fn reconcile_infinite_measures_agree() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.csv", "id,v\n1,inf\n2,-inf\n");
    let b = write(dir.path(), "b.csv", "id,v\n2,-inf\n1,inf\n");

    tabrecon()
        .args(["reconcile", &a, &b, "--key", "id", "--measure", "v"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No discrepancies found."));
}

#[test]
fn schema_reports_missing_column() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "players.csv", "id,name,email\n1,Ann,a@x.io\n");

    tabrecon()
        .args(["schema", &file, "--expected", "id,name,email,age"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAIL schema"))
        .stdout(predicate::str::contains("Missing columns: [\"age\"]"));

    tabrecon()
        .args(["schema", &file, "--expected", "id,name", "--allow-extra"])
        .assert()
        .success();
}

#[test]
fn check_reports_null_columns() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "players.csv", "id,email\n1,a@x.io\n2,\n");

    tabrecon()
        .args(["check", &file, "--no-nulls", "email"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Null values found in columns: [\"email\"]",
        ));

    tabrecon()
        .args(["check", &file, "--no-nulls", "id", "--not-empty"])
        .assert()
        .success();
}

#[test]
fn compare_sorted_tables() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.csv", "id,v\n2,b\n1,a\n");
    let b = write(dir.path(), "b.csv", "id,v\n1,a\n2,b\n");

    tabrecon()
        .args(["compare", &a, &b])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Source and target tables do not match."));

    tabrecon()
        .args(["compare", &a, &b, "--sort-by", "id"])
        .assert()
        .success();
}

#[test]
fn run_suite_file() {
    let dir = TempDir::new().unwrap();
    facility_files(&dir, "41");
    write(
        dir.path(),
        "suite.toml",
        r#"
name = "facility_type_avg_time_spent_per_visit_date"

[source]
path = "chart.csv"
label = "html"

[target]
path = "export.json"
label = "parquet"

[checks]
not_empty = true
row_count_match = true
no_duplicates = ["facility_type", "visit_date"]

[reconcile]
keys = ["facility_type", "visit_date"]
measures = ["avg_time_spent"]
aliases = { average_time_spent = "avg_time_spent" }
"#,
    );

    tabrecon()
        .args(["run", &dir.path().join("suite.toml").display().to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS reconcile"))
        .stdout(predicate::str::contains("Result: 4 passed, 0 failed"));
}

#[test]
fn missing_file_exits_two() {
    tabrecon()
        .args(["check", "does-not-exist.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}
