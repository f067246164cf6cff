//! Key-based full outer join

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::{KeyBuilder, KeyTuple, Row, Table};

/// Which side(s) of the join a key was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    LeftOnly,
    RightOnly,
    Both,
}

/// One output row of the outer join
#[derive(Debug, Clone)]
pub struct JoinedRow<'a> {
    pub key: KeyTuple,
    pub left: Option<&'a Row>,
    pub right: Option<&'a Row>,
}

impl JoinedRow<'_> {
    pub fn status(&self) -> MatchStatus {
        match (self.left, self.right) {
            (Some(_), Some(_)) => MatchStatus::Both,
            (Some(_), None) => MatchStatus::LeftOnly,
            (None, _) => MatchStatus::RightOnly,
        }
    }
}

/// Row matcher over an ordered key index
pub struct RowMatcher {
    keys: KeyBuilder,
    key_names: Vec<String>,
}

impl RowMatcher {
    /// Match on the named key columns, which must exist on both sides at the
    /// same positions (the reconciler projects keys to the front)
    pub fn new(table: &Table, key_names: &[String]) -> Result<Self> {
        Ok(Self {
            keys: KeyBuilder::for_columns(table, key_names)?,
            key_names: key_names.to_vec(),
        })
    }

    fn index<'a>(&self, table: &'a Table) -> Result<BTreeMap<KeyTuple, &'a Row>> {
        let mut index = BTreeMap::new();
        for row in table.rows() {
            let key = self.keys.build_key(row);
            if index.contains_key(&key) {
                return Err(Error::NonUniqueKey {
                    side: table.label().to_string(),
                    key: key.render(&self.key_names),
                });
            }
            index.insert(key, row);
        }
        Ok(index)
    }

    /// Full outer join: exactly one entry per distinct key across both
    /// sides, in ascending key order. A key repeated within one side is an
    /// error rather than a fan-out.
    pub fn match_rows<'a>(&self, left: &'a Table, right: &'a Table) -> Result<Vec<JoinedRow<'a>>> {
        let left_index = self.index(left)?;
        let right_index = self.index(right)?;

        let mut joined: BTreeMap<KeyTuple, JoinedRow<'a>> = BTreeMap::new();
        for (key, row) in left_index {
            joined.insert(
                key.clone(),
                JoinedRow {
                    key,
                    left: Some(row),
                    right: None,
                },
            );
        }
        for (key, row) in right_index {
            joined
                .entry(key.clone())
                .or_insert_with(|| JoinedRow {
                    key,
                    left: None,
                    right: None,
                })
                .right = Some(row);
        }

        Ok(joined.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    fn keys() -> Vec<String> {
        vec!["k".to_string()]
    }

    #[test]
    fn test_outer_join_statuses_in_key_order() {
        let left = Table::from_rows(
            &["k", "v"],
            vec![
                vec!["c".into(), 1i64.into()],
                vec!["a".into(), 2i64.into()],
            ],
        )
        .unwrap();
        let right = Table::from_rows(
            &["k", "v"],
            vec![
                vec!["b".into(), 3i64.into()],
                vec!["a".into(), 4i64.into()],
            ],
        )
        .unwrap();

        let matcher = RowMatcher::new(&left, &keys()).unwrap();
        let joined = matcher.match_rows(&left, &right).unwrap();
        let summary: Vec<_> = joined
            .iter()
            .map(|j| (j.key.values()[0].clone(), j.status()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (CellValue::from("a"), MatchStatus::Both),
                (CellValue::from("b"), MatchStatus::RightOnly),
                (CellValue::from("c"), MatchStatus::LeftOnly),
            ]
        );
    }

    #[test]
    fn test_repeated_key_is_rejected() {
        let left = Table::from_rows(
            &["k", "v"],
            vec![
                vec!["a".into(), 1i64.into()],
                vec!["a".into(), 2i64.into()],
            ],
        )
        .unwrap()
        .with_label("html");
        let right = Table::from_rows(&["k", "v"], vec![]).unwrap();

        let matcher = RowMatcher::new(&left, &keys()).unwrap();
        let err = matcher.match_rows(&left, &right).unwrap_err();
        assert!(matches!(err, Error::NonUniqueKey { side, key } if side == "html" && key == "(k=a)"));
    }
}
