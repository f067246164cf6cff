//! Declarative check suites.
//!
//! A suite is a TOML file naming a source and a target dataset and the
//! checks to run over them. Every configured check runs, even after an
//! earlier one fails, and the outcomes are collected into a [`SuiteReport`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{validate_tolerance, Config};
use crate::error::CheckResult;
use crate::model::Table;
use crate::parser::ParserFactory;
use crate::recon::{Reconciler, ReconciliationReport};
use crate::validate::{self, quality, SchemaDiff, SchemaPolicy};

/// One dataset of a suite
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSource {
    /// File or Parquet directory, relative to the suite file
    pub path: PathBuf,
    #[serde(default)]
    pub sort_by: Vec<String>,
    pub label: Option<String>,
    #[serde(default = "default_true")]
    pub include_subfolders: bool,
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaSpec {
    pub expected: Vec<String>,
    #[serde(default)]
    pub allow_extra: bool,
    #[serde(default = "default_true")]
    pub check_order: bool,
}

/// Quality checks to run. List-valued checks take column names; an empty
/// list means every column.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecksSpec {
    #[serde(default)]
    pub not_empty: bool,
    #[serde(default)]
    pub row_count_match: bool,
    #[serde(default)]
    pub full_equality: bool,
    pub no_duplicates: Option<Vec<String>>,
    pub no_nulls: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconcileSpec {
    pub keys: Vec<String>,
    #[serde(default)]
    pub measures: Vec<String>,
    pub tolerance: Option<f64>,
    #[serde(default)]
    pub aliases: IndexMap<String, String>,
    #[serde(default)]
    pub ignore_case: bool,
}

/// A parsed suite file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteConfig {
    pub name: String,
    pub source: TableSource,
    pub target: TableSource,
    pub schema: Option<SchemaSpec>,
    #[serde(default)]
    pub checks: ChecksSpec,
    pub reconcile: Option<ReconcileSpec>,
}

fn default_true() -> bool {
    true
}

impl SuiteConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let suite: SuiteConfig = toml::from_str(s).context("Invalid suite file")?;
        if let Some(tolerance) = suite.reconcile.as_ref().and_then(|r| r.tolerance) {
            validate_tolerance(tolerance)
                .map_err(anyhow::Error::msg)
                .context("Invalid suite file")?;
        }
        Ok(suite)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read suite file: {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("In {}", path.display()))
    }
}

/// Result of one named check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckOutcome {
    pub fn from_result(name: &str, result: CheckResult) -> Self {
        match result {
            Ok(()) => Self {
                name: name.to_string(),
                passed: true,
                message: None,
            },
            Err(failure) => Self::failed(name, failure.message()),
        }
    }

    pub fn failed(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: Some(message.into()),
        }
    }

    /// Outcome of a schema comparison under `policy`; a failure carries
    /// every line of the diff
    pub fn schema(diff: &SchemaDiff, policy: SchemaPolicy) -> Self {
        match diff.enforce(policy) {
            Ok(()) => Self::from_result("schema", Ok(())),
            Err(_) => Self::failed("schema", diff.to_string()),
        }
    }
}

/// Outcomes of every check in a suite, in execution order
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub name: String,
    pub source: String,
    pub target: String,
    pub outcomes: Vec<CheckOutcome>,
    /// Present when the suite has a `[reconcile]` section that ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<ReconciliationReport>,
}

impl SuiteReport {
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }
}

fn load_table(
    factory: &ParserFactory,
    source: &TableSource,
    base_dir: &Path,
    default_label: &str,
) -> Result<Table> {
    let path = base_dir.join(&source.path);
    let mut config = Config::default()
        .with_include_subfolders(source.include_subfolders)
        .with_sort_by(source.sort_by.clone());
    if let Some(ref sheet) = source.sheet {
        config = config.with_sheet_name(sheet.clone());
    }

    let table = factory
        .parse(&path, &config)
        .with_context(|| format!("Failed to load {} table", default_label))?;
    Ok(table.with_label(source.label.as_deref().unwrap_or(default_label)))
}

/// Column selection for a list-valued check; empty means every column
pub fn columns_arg(columns: &[String]) -> Option<Vec<&str>> {
    if columns.is_empty() {
        None
    } else {
        Some(columns.iter().map(String::as_str).collect())
    }
}

/// Load both datasets and run every configured check.
///
/// Relative paths in the suite resolve against `base_dir`. Failing checks
/// are reported as outcomes; only load failures are errors.
pub fn run_suite(suite: &SuiteConfig, base_dir: &Path) -> Result<SuiteReport> {
    let factory = ParserFactory::new();
    let source = load_table(&factory, &suite.source, base_dir, "source")?;
    let target = load_table(&factory, &suite.target, base_dir, "target")?;
    info!(
        suite = %suite.name,
        source_rows = source.row_count(),
        target_rows = target.row_count(),
        "running suite"
    );

    let mut outcomes = Vec::new();
    let mut reconciliation = None;

    if let Some(ref schema) = suite.schema {
        let diff = validate::validate_table(&target, &schema.expected);
        let policy = SchemaPolicy {
            allow_extra: schema.allow_extra,
            check_order: schema.check_order,
        };
        outcomes.push(CheckOutcome::schema(&diff, policy));
    }

    let checks = &suite.checks;
    if checks.not_empty {
        outcomes.push(CheckOutcome::from_result(
            "not_empty",
            quality::not_empty(&target),
        ));
    }
    if let Some(ref columns) = checks.no_nulls {
        let columns = columns_arg(columns);
        outcomes.push(CheckOutcome::from_result(
            "no_nulls",
            quality::no_nulls(&target, columns.as_deref()),
        ));
    }
    if let Some(ref columns) = checks.no_duplicates {
        let columns = columns_arg(columns);
        outcomes.push(CheckOutcome::from_result(
            "no_duplicates",
            quality::no_duplicates(&target, columns.as_deref()),
        ));
    }
    if checks.row_count_match {
        outcomes.push(CheckOutcome::from_result(
            "row_count_match",
            quality::row_count_match(&source, &target),
        ));
    }
    if checks.full_equality {
        outcomes.push(CheckOutcome::from_result(
            "full_equality",
            quality::full_equality(&source, &target),
        ));
    }

    if let Some(ref spec) = suite.reconcile {
        let mut config = Config::default()
            .with_key_columns(spec.keys.clone())
            .with_measure_columns(spec.measures.clone())
            .with_labels(source.label(), target.label())
            .with_ignore_case(spec.ignore_case)
            .with_aliases(
                spec.aliases
                    .iter()
                    .map(|(from, to)| (from.clone(), to.clone()))
                    .collect(),
            );
        if let Some(tolerance) = spec.tolerance {
            config = config.with_numeric_tolerance(tolerance);
        }

        match Reconciler::new(config).reconcile(&source, &target) {
            Ok(report) => {
                outcomes.push(CheckOutcome::from_result("reconcile", report.ensure_clean()));
                reconciliation = Some(report);
            }
            // Bad keys or measures are a failed check, not an aborted suite
            Err(err) => outcomes.push(CheckOutcome::failed("reconcile", err.to_string())),
        }
    }

    for outcome in &outcomes {
        if outcome.passed {
            debug!(check = %outcome.name, "passed");
        } else {
            warn!(
                check = %outcome.name,
                message = outcome.message.as_deref().unwrap_or_default(),
                "failed"
            );
        }
    }

    Ok(SuiteReport {
        name: suite.name.clone(),
        source: source.label().to_string(),
        target: target.label().to_string(),
        outcomes,
        reconciliation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUITE: &str = r#"
name = "players"

[source]
path = "source.csv"
sort_by = ["id"]
label = "db"

[target]
path = "target.csv"
sort_by = ["id"]

[schema]
expected = ["id", "email", "score"]

[checks]
not_empty = true
row_count_match = true
full_equality = true
no_duplicates = ["id"]
no_nulls = []

[reconcile]
keys = ["id"]
measures = ["score"]
tolerance = 0.01
"#;

    fn write_inputs(dir: &Path, target: &str) {
        fs::write(
            dir.join("source.csv"),
            "id,email,score\n2,b@x.io,4.5\n1,a@x.io,3\n",
        )
        .unwrap();
        fs::write(dir.join("target.csv"), target).unwrap();
    }

    fn outcome<'a>(report: &'a SuiteReport, name: &str) -> &'a CheckOutcome {
        report.outcomes.iter().find(|o| o.name == name).unwrap()
    }

    #[test]
    fn test_parse_suite() {
        let suite = SuiteConfig::from_toml_str(SUITE).unwrap();
        assert_eq!(suite.name, "players");
        assert_eq!(suite.source.label.as_deref(), Some("db"));
        assert!(suite.target.include_subfolders);
        assert_eq!(suite.checks.no_nulls, Some(vec![]));
        assert_eq!(suite.reconcile.unwrap().tolerance, Some(0.01));
    }

    #[test]
    fn test_invalid_tolerance_rejected() {
        for bad in ["-0.5", "nan"] {
            let text = SUITE.replace("tolerance = 0.01", &format!("tolerance = {}", bad));
            let err = SuiteConfig::from_toml_str(&text).unwrap_err();
            assert!(format!("{:#}", err).contains("non-negative"), "{bad}");
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = SuiteConfig::from_toml_str("name = \"x\"\nbogus = 1\n").unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid suite file"));
    }

    #[test]
    fn test_passing_suite() {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(dir.path(), "id,email,score\n1,a@x.io,3.0\n2,b@x.io,4.5\n");

        let suite = SuiteConfig::from_toml_str(SUITE).unwrap();
        let report = run_suite(&suite, dir.path()).unwrap();

        let names: Vec<_> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "schema",
                "not_empty",
                "no_nulls",
                "no_duplicates",
                "row_count_match",
                "full_equality",
                "reconcile"
            ]
        );
        assert!(report.all_passed(), "{:?}", report.failures().collect::<Vec<_>>());
        assert_eq!(report.source, "db");
        assert_eq!(report.target, "target");
        assert!(report.reconciliation.unwrap().is_clean());
    }

    #[test]
    fn test_failures_do_not_stop_later_checks() {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(dir.path(), "id,email,score\n1,,3.5\n");

        let suite = SuiteConfig::from_toml_str(SUITE).unwrap();
        let report = run_suite(&suite, dir.path()).unwrap();

        assert!(!report.all_passed());
        assert!(outcome(&report, "schema").passed);
        assert_eq!(
            outcome(&report, "no_nulls").message.as_deref(),
            Some("Null values found in columns: [\"email\"]")
        );
        assert_eq!(
            outcome(&report, "row_count_match").message.as_deref(),
            Some("Row count mismatch: source=2, target=1")
        );
        assert!(!outcome(&report, "full_equality").passed);

        let recon = outcome(&report, "reconcile").message.clone().unwrap();
        assert_eq!(
            recon,
            "(id=1) has different score: db=3 target=3.5\n\
             (id=2) is present in db but missing in target"
        );
    }

    #[test]
    fn test_reconcile_error_is_a_failed_check() {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(dir.path(), "id,email,score\n1,a@x.io,3\n1,c@x.io,3\n");

        let suite = SuiteConfig::from_toml_str(SUITE).unwrap();
        let report = run_suite(&suite, dir.path()).unwrap();

        assert!(!outcome(&report, "no_duplicates").passed);
        let recon = outcome(&report, "reconcile");
        assert!(!recon.passed);
        assert!(recon.message.as_deref().unwrap().contains("not unique"));
        assert!(report.reconciliation.is_none());
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let suite = SuiteConfig::from_toml_str(SUITE).unwrap();
        assert!(run_suite(&suite, dir.path()).is_err());
    }
}
