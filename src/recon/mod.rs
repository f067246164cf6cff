//! Key-based reconciliation of two tables

pub mod compare;
mod join;
mod report;

use crate::config::{validate_tolerance, Config};
use crate::error::{Error, Result, ValidationFailure};
use crate::model::{normalize_column_name, Table};

pub use compare::CellComparator;
pub use join::{JoinedRow, MatchStatus, RowMatcher};
pub use report::{Discrepancy, DiscrepancyKind, MeasureValue, ReconStats, ReconciliationReport};

/// Reconciliation engine
pub struct Reconciler {
    config: Config,
    cell_comparator: CellComparator,
}

impl Reconciler {
    /// Create a reconciler; keys and measures come from `config`
    pub fn new(config: Config) -> Self {
        let cell_comparator = CellComparator::new(
            config.ignore_case,
            config.ignore_whitespace,
            config.numeric_tolerance,
        );
        Self {
            config,
            cell_comparator,
        }
    }

    fn aliases(&self) -> Vec<(String, String)> {
        self.config
            .aliases
            .iter()
            .map(|(from, to)| (normalize_column_name(from), normalize_column_name(to)))
            .collect()
    }

    /// Requested column name in the same canonical form as the tables
    fn canonical_name(&self, name: &str, aliases: &[(String, String)]) -> String {
        let name = normalize_column_name(name);
        aliases
            .iter()
            .find(|(from, _)| *from == name)
            .map(|(_, to)| to.clone())
            .unwrap_or(name)
    }

    /// Normalize names, project onto keys then measures, coerce the keys and
    /// sort by them
    fn prepare(
        &self,
        table: &Table,
        label: &str,
        keys: &[String],
        measures: &[String],
        aliases: &[(String, String)],
    ) -> Result<Table> {
        let columns: Vec<&String> = keys.iter().chain(measures).collect();
        table
            .with_normalized_column_names()?
            .rename_columns(aliases)?
            .with_label(label)
            .select(&columns)?
            .with_coerced_columns(keys)?
            .sorted_by(keys)
    }

    /// Reconcile `left` against `right`
    pub fn reconcile(&self, left: &Table, right: &Table) -> Result<ReconciliationReport> {
        if self.config.key_columns.is_empty() {
            return Err(Error::Validation(ValidationFailure::new(
                "Reconciliation requires at least one join key column",
            )));
        }
        validate_tolerance(self.config.numeric_tolerance)
            .map_err(|message| Error::Validation(ValidationFailure::new(message)))?;

        let aliases = self.aliases();
        let keys: Vec<String> = self
            .config
            .key_columns
            .iter()
            .map(|k| self.canonical_name(k, &aliases))
            .collect();
        let measures: Vec<String> = self
            .config
            .measure_columns
            .iter()
            .map(|m| self.canonical_name(m, &aliases))
            .collect();

        let left = self.prepare(left, &self.config.left_label, &keys, &measures, &aliases)?;
        let right = self.prepare(right, &self.config.right_label, &keys, &measures, &aliases)?;

        let matcher = RowMatcher::new(&left, &keys)?;
        let joined = matcher.match_rows(&left, &right)?;

        let mut report = ReconciliationReport {
            left_label: self.config.left_label.clone(),
            right_label: self.config.right_label.clone(),
            key_columns: keys.clone(),
            measure_columns: measures.clone(),
            discrepancies: Vec::new(),
            stats: ReconStats {
                left_rows: left.row_count(),
                right_rows: right.row_count(),
                keys_total: joined.len(),
                ..ReconStats::default()
            },
        };

        // Measures follow the keys in both prepared tables
        let offset = keys.len();
        let measure_values = |row: &crate::model::Row| -> Vec<MeasureValue> {
            measures
                .iter()
                .enumerate()
                .map(|(i, column)| MeasureValue {
                    column: column.clone(),
                    value: row.cells[offset + i].clone(),
                })
                .collect()
        };

        for entry in joined {
            match (entry.left, entry.right) {
                (Some(l), Some(r)) => {
                    let before = report.discrepancies.len();
                    for (i, column) in measures.iter().enumerate() {
                        let (lv, rv) = (&l.cells[offset + i], &r.cells[offset + i]);
                        if !self.cell_comparator.equal(lv, rv) {
                            report.discrepancies.push(Discrepancy::ValueMismatch {
                                key: entry.key.clone(),
                                column: column.clone(),
                                left: lv.clone(),
                                right: rv.clone(),
                            });
                        }
                    }
                    let found = report.discrepancies.len() - before;
                    if found == 0 {
                        report.stats.matched += 1;
                    } else {
                        report.stats.mismatched_rows += 1;
                        report.stats.value_mismatches += found;
                    }
                }
                (Some(l), None) => {
                    report.stats.left_only += 1;
                    report.discrepancies.push(Discrepancy::LeftOnly {
                        key: entry.key,
                        measures: measure_values(l),
                    });
                }
                (None, Some(r)) => {
                    report.stats.right_only += 1;
                    report.discrepancies.push(Discrepancy::RightOnly {
                        key: entry.key,
                        measures: measure_values(r),
                    });
                }
                // The join never yields a key with neither side
                (None, None) => {}
            }
        }

        Ok(report)
    }
}

/// Reconcile two tables on `join_keys`, comparing `measure_columns`, with
/// default options
pub fn reconcile<K: AsRef<str>, M: AsRef<str>>(
    left: &Table,
    right: &Table,
    join_keys: &[K],
    measure_columns: &[M],
) -> Result<ReconciliationReport> {
    let config = Config::new()
        .with_key_columns(join_keys.iter().map(|k| k.as_ref().to_string()).collect())
        .with_measure_columns(measure_columns.iter().map(|m| m.as_ref().to_string()).collect());
    Reconciler::new(config).reconcile(left, right)
}
