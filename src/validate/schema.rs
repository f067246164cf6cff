//! Column list validation against an expected schema

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Table;

/// A column found at the wrong offset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMismatch {
    pub position: usize,
    pub expected: String,
    pub actual: String,
}

/// Classification of how an actual column list departs from the expected one.
///
/// A diff is not an error by itself; see [`SchemaDiff::enforce`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDiff {
    /// Expected names absent from the actual list, in expected order
    pub missing: IndexSet<String>,
    /// Actual names absent from the expected list, in actual order
    pub extra: IndexSet<String>,
    pub order_mismatches: Vec<OrderMismatch>,
}

/// Which parts of a [`SchemaDiff`] the caller treats as failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaPolicy {
    pub allow_extra: bool,
    pub check_order: bool,
}

impl SchemaPolicy {
    /// Fail on missing, extra and misordered columns
    pub fn strict() -> Self {
        Self {
            allow_extra: false,
            check_order: true,
        }
    }

    /// Fail only when an expected column is absent
    pub fn missing_only() -> Self {
        Self {
            allow_extra: true,
            check_order: false,
        }
    }
}

impl Default for SchemaPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

impl SchemaDiff {
    /// True when actual and expected agree exactly
    pub fn is_match(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty() && self.order_mismatches.is_empty()
    }

    /// Apply a failure policy to this diff
    pub fn enforce(&self, policy: SchemaPolicy) -> Result<()> {
        let failed = !self.missing.is_empty()
            || (!policy.allow_extra && !self.extra.is_empty())
            || (policy.check_order && !self.order_mismatches.is_empty());
        if failed {
            Err(Error::SchemaMismatch(self.clone()))
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Display for SchemaDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut lines = Vec::new();
        if !self.missing.is_empty() {
            lines.push(format!("Missing columns: {:?}", self.missing.iter().collect::<Vec<_>>()));
        }
        if !self.extra.is_empty() {
            lines.push(format!("Extra columns: {:?}", self.extra.iter().collect::<Vec<_>>()));
        }
        for m in &self.order_mismatches {
            lines.push(format!(
                "Column order mismatch at position {}: expected {}, got {}",
                m.position, m.expected, m.actual
            ));
        }
        if lines.is_empty() {
            write!(f, "schema matches")
        } else {
            write!(f, "{}", lines.join("\n"))
        }
    }
}

/// Compare an actual column list with the expected one
pub fn validate<A: AsRef<str>, E: AsRef<str>>(actual: &[A], expected: &[E]) -> SchemaDiff {
    let actual: Vec<&str> = actual.iter().map(AsRef::as_ref).collect();
    let expected: Vec<&str> = expected.iter().map(AsRef::as_ref).collect();

    let missing = expected
        .iter()
        .filter(|name| !actual.contains(*name))
        .map(|name| name.to_string())
        .collect();

    let extra = actual
        .iter()
        .filter(|name| !expected.contains(*name))
        .map(|name| name.to_string())
        .collect();

    let order_mismatches = expected
        .iter()
        .zip(actual.iter())
        .enumerate()
        .filter(|(_, (e, a))| e != a)
        .map(|(position, (e, a))| OrderMismatch {
            position,
            expected: e.to_string(),
            actual: a.to_string(),
        })
        .collect();

    SchemaDiff {
        missing,
        extra,
        order_mismatches,
    }
}

/// [`validate`] over a table's column names
pub fn validate_table<E: AsRef<str>>(table: &Table, expected: &[E]) -> SchemaDiff {
    validate(&table.column_names(), expected)
}
