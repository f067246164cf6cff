//! Composite join keys

use serde::{Deserialize, Serialize};

use super::table::{CellValue, Row, Table};
use crate::error::Result;

/// An ordered tuple of key values, compared lexicographically
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyTuple(pub Vec<CellValue>);

impl KeyTuple {
    pub fn values(&self) -> &[CellValue] {
        &self.0
    }

    /// Render as `(city=X, date=2024-01-01)` using the key column names
    pub fn render<S: AsRef<str>>(&self, names: &[S]) -> String {
        let parts: Vec<String> = self
            .0
            .iter()
            .enumerate()
            .map(|(i, value)| match names.get(i) {
                Some(name) => format!("{}={}", name.as_ref(), value.display()),
                None => value.display().into_owned(),
            })
            .collect();
        format!("({})", parts.join(", "))
    }
}

impl std::fmt::Display for KeyTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<_> = self.0.iter().map(|c| c.display()).collect();
        write!(f, "({})", parts.join(", "))
    }
}

/// Builds composite keys from a fixed set of key columns
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    column_indices: Vec<usize>,
}

impl KeyBuilder {
    /// Key on the named columns of a table, in the given order
    pub fn for_columns<S: AsRef<str>>(table: &Table, names: &[S]) -> Result<Self> {
        Ok(Self {
            column_indices: table.resolve_columns(names)?,
        })
    }

    /// Build the key of a row
    pub fn build_key(&self, row: &Row) -> KeyTuple {
        KeyTuple(
            self.column_indices
                .iter()
                .filter_map(|&i| row.get(i).cloned())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_key_from_names() {
        let table = Table::from_rows(
            &["city", "date", "avg"],
            vec![vec!["X".into(), "2024-01-01".into(), 5.0.into()]],
        )
        .unwrap();
        let builder = KeyBuilder::for_columns(&table, &["date", "city"]).unwrap();
        let key = builder.build_key(&table.rows()[0]);
        assert_eq!(key, KeyTuple(vec!["2024-01-01".into(), "X".into()]));
        assert_eq!(key.render(&["date", "city"]), "(date=2024-01-01, city=X)");
    }

    #[test]
    fn test_unknown_key_column_rejected() {
        let table = Table::from_rows(&["a", "b"], vec![vec![1i64.into(), "x".into()]]).unwrap();
        assert!(KeyBuilder::for_columns(&table, &["c"]).is_err());
    }

    #[test]
    fn test_key_ordering_is_lexicographic() {
        let a = KeyTuple(vec!["A".into(), 2i64.into()]);
        let b = KeyTuple(vec!["A".into(), 10i64.into()]);
        let c = KeyTuple(vec!["B".into(), 1i64.into()]);
        assert!(a < b && b < c);
    }
}
