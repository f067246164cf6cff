//! Reconciliation report types

use serde::Serialize;

use crate::error::{CheckResult, ValidationFailure};
use crate::model::{CellValue, KeyTuple};

/// Discrepancy kinds, in report order within one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    LeftOnly,
    RightOnly,
    ValueMismatch,
}

impl std::fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscrepancyKind::LeftOnly => write!(f, "left_only"),
            DiscrepancyKind::RightOnly => write!(f, "right_only"),
            DiscrepancyKind::ValueMismatch => write!(f, "value_mismatch"),
        }
    }
}

/// A measure value carried by an unmatched row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureValue {
    pub column: String,
    pub value: CellValue,
}

/// One unit of reconciliation output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discrepancy {
    /// Key present only in the left table
    LeftOnly {
        key: KeyTuple,
        measures: Vec<MeasureValue>,
    },
    /// Key present only in the right table
    RightOnly {
        key: KeyTuple,
        measures: Vec<MeasureValue>,
    },
    /// Key on both sides with a differing measure
    ValueMismatch {
        key: KeyTuple,
        column: String,
        left: CellValue,
        right: CellValue,
    },
}

impl Discrepancy {
    pub fn kind(&self) -> DiscrepancyKind {
        match self {
            Discrepancy::LeftOnly { .. } => DiscrepancyKind::LeftOnly,
            Discrepancy::RightOnly { .. } => DiscrepancyKind::RightOnly,
            Discrepancy::ValueMismatch { .. } => DiscrepancyKind::ValueMismatch,
        }
    }

    pub fn key(&self) -> &KeyTuple {
        match self {
            Discrepancy::LeftOnly { key, .. }
            | Discrepancy::RightOnly { key, .. }
            | Discrepancy::ValueMismatch { key, .. } => key,
        }
    }
}

/// Counts over the joined keys.
///
/// `keys_total == left_only + right_only + matched + mismatched_rows`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReconStats {
    pub left_rows: usize,
    pub right_rows: usize,
    pub keys_total: usize,
    pub left_only: usize,
    pub right_only: usize,
    /// Keys on both sides with every measure in agreement
    pub matched: usize,
    /// Keys on both sides with at least one differing measure
    pub mismatched_rows: usize,
    pub value_mismatches: usize,
}

/// Result of reconciling two tables.
///
/// Discrepancies are ordered by key, then kind, then declared measure order,
/// so two runs over the same inputs render identically.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub left_label: String,
    pub right_label: String,
    pub key_columns: Vec<String>,
    pub measure_columns: Vec<String>,
    pub discrepancies: Vec<Discrepancy>,
    pub stats: ReconStats,
}

impl ReconciliationReport {
    /// True when there are no discrepancies
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }

    /// Human-readable line for one discrepancy
    pub fn message(&self, discrepancy: &Discrepancy) -> String {
        let key = discrepancy.key().render(&self.key_columns);
        match discrepancy {
            Discrepancy::LeftOnly { .. } => format!(
                "{} is present in {} but missing in {}",
                key, self.left_label, self.right_label
            ),
            Discrepancy::RightOnly { .. } => format!(
                "{} is present in {} but missing in {}",
                key, self.right_label, self.left_label
            ),
            Discrepancy::ValueMismatch {
                column,
                left,
                right,
                ..
            } => format!(
                "{} has different {}: {}={} {}={}",
                key, column, self.left_label, left, self.right_label, right
            ),
        }
    }

    /// All discrepancy lines, or `None` when there is nothing to report
    pub fn messages(&self) -> Option<Vec<String>> {
        if self.is_clean() {
            None
        } else {
            Some(self.discrepancies.iter().map(|d| self.message(d)).collect())
        }
    }

    /// Turn a non-empty report into a check failure listing every line
    pub fn ensure_clean(&self) -> CheckResult {
        match self.messages() {
            None => Ok(()),
            Some(lines) => Err(ValidationFailure::new(lines.join("\n"))),
        }
    }

    pub fn of_kind(&self, kind: DiscrepancyKind) -> impl Iterator<Item = &Discrepancy> {
        self.discrepancies.iter().filter(move |d| d.kind() == kind)
    }
}

impl std::fmt::Display for ReconciliationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.messages() {
            None => write!(f, "no discrepancies"),
            Some(lines) => write!(f, "{}", lines.join("\n")),
        }
    }
}
