//! Data-quality checks over one or two tables.
//!
//! Every check is all-or-nothing: it returns `Ok(())` or a
//! [`ValidationFailure`] whose message stands on its own. Checks never
//! mutate their inputs; canonicalize (sort, project) before calling
//! [`full_equality`].

use std::ops::RangeInclusive;

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::error::{CheckResult, ValidationFailure};
use crate::model::{CellValue, Table};

fn resolve(table: &Table, columns: Option<&[&str]>) -> Result<Vec<usize>, ValidationFailure> {
    match columns {
        None => Ok((0..table.column_count()).collect()),
        Some(names) => names
            .iter()
            .map(|name| {
                table
                    .column_index(name)
                    .ok_or_else(|| ValidationFailure::new(format!("Column not found: {:?}", name)))
            })
            .collect(),
    }
}

fn require_column(table: &Table, name: &str) -> Result<usize, ValidationFailure> {
    resolve(table, Some(std::slice::from_ref(&name))).map(|idx| idx[0])
}

/// Fails when the table has no rows
pub fn not_empty(table: &Table) -> CheckResult {
    if table.is_empty() {
        return Err(ValidationFailure::new("Table is empty."));
    }
    Ok(())
}

/// Fails when any selected column (default: all) holds a null.
///
/// The message names exactly the offending columns, never rows, so it stays
/// bounded for large tables.
pub fn no_nulls(table: &Table, columns: Option<&[&str]>) -> CheckResult {
    let indices = resolve(table, columns)?;
    let null_columns: Vec<&str> = indices
        .iter()
        .filter(|&&i| table.rows().iter().any(|row| row.cells[i].is_null()))
        .map(|&i| table.columns()[i].name.as_str())
        .collect();

    if !null_columns.is_empty() {
        return Err(ValidationFailure::new(format!(
            "Null values found in columns: {:?}",
            null_columns
        )));
    }
    Ok(())
}

/// Number of rows whose selected values are shared with at least one other
/// row. Every member of a repeated group counts, including its first
/// occurrence: `[a, a, b]` yields 2.
pub fn duplicate_count(table: &Table, columns: Option<&[&str]>) -> Result<usize, ValidationFailure> {
    let indices = resolve(table, columns)?;
    let mut groups: FxHashMap<Vec<&CellValue>, usize> = FxHashMap::default();
    for row in table.rows() {
        let key: Vec<&CellValue> = indices.iter().map(|&i| &row.cells[i]).collect();
        *groups.entry(key).or_insert(0) += 1;
    }
    Ok(groups.values().filter(|&&n| n > 1).sum())
}

/// Fails when two rows are equal on the selected columns (default: all)
pub fn no_duplicates(table: &Table, columns: Option<&[&str]>) -> CheckResult {
    let count = duplicate_count(table, columns)?;
    if count > 0 {
        let scope = match columns {
            Some(names) => format!(" on columns {:?}", names),
            None => String::new(),
        };
        return Err(ValidationFailure::new(format!(
            "Found {} duplicate rows{}",
            count, scope
        )));
    }
    Ok(())
}

/// Fails when the two tables have different row counts
pub fn row_count_match(source: &Table, target: &Table) -> CheckResult {
    if source.row_count() != target.row_count() {
        return Err(ValidationFailure::new(format!(
            "Row count mismatch: source={}, target={}",
            source.row_count(),
            target.row_count()
        )));
    }
    Ok(())
}

/// Strict positional equality: same column list, same row count, and equal
/// values cell for cell. Row order matters.
pub fn full_equality(source: &Table, target: &Table) -> CheckResult {
    let same = source.column_names() == target.column_names()
        && source.row_count() == target.row_count()
        && source
            .rows()
            .iter()
            .zip(target.rows())
            .all(|(a, b)| a.cells == b.cells);

    if !same {
        return Err(ValidationFailure::new(
            "Source and target tables do not match.",
        ));
    }
    Ok(())
}

fn row_failures(lines: Vec<String>) -> CheckResult {
    if lines.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure::new(lines.join("\n")))
    }
}

/// Fails for every non-null value of `column` that does not match `pattern`
/// at its start. Offending rows are identified by `id_column`.
pub fn values_match_pattern(
    table: &Table,
    column: &str,
    pattern: &Regex,
    id_column: &str,
) -> CheckResult {
    let col = require_column(table, column)?;
    let id = require_column(table, id_column)?;

    let lines = table
        .rows()
        .iter()
        .filter(|row| !row.cells[col].is_null())
        .filter(|row| {
            let text = row.cells[col].display();
            !pattern.find(&text).is_some_and(|m| m.start() == 0)
        })
        .map(|row| {
            format!(
                "Row with {} = {} has invalid {} \"{}\"",
                id_column, row.cells[id], column, row.cells[col]
            )
        })
        .collect();
    row_failures(lines)
}

/// Fails for every non-null value of `column` outside `range` (inclusive)
/// or not numeric at all
pub fn values_in_range(
    table: &Table,
    column: &str,
    range: RangeInclusive<f64>,
    id_column: &str,
) -> CheckResult {
    let col = require_column(table, column)?;
    let id = require_column(table, id_column)?;

    let lines = table
        .rows()
        .iter()
        .filter(|row| {
            let value = &row.cells[col];
            !value.is_null() && !value.as_f64().is_some_and(|v| range.contains(&v))
        })
        .map(|row| {
            format!(
                "Row with {} = {} has invalid {} {}",
                id_column, row.cells[id], column, row.cells[col]
            )
        })
        .collect();
    row_failures(lines)
}

/// Fails unless the first row whose `key_column` equals `key` has
/// `column == expected`
pub fn value_equals(
    table: &Table,
    key_column: &str,
    key: &CellValue,
    column: &str,
    expected: &CellValue,
) -> CheckResult {
    let key_idx = require_column(table, key_column)?;
    let col = require_column(table, column)?;
    let key = key.coerce();

    let row = table
        .rows()
        .iter()
        .find(|row| row.cells[key_idx].coerce() == key)
        .ok_or_else(|| ValidationFailure::new(format!("No row with {} = {}", key_column, key)))?;

    let actual = &row.cells[col];
    if actual.coerce() != expected.coerce() {
        return Err(ValidationFailure::new(format!(
            "Row with {} = {} has {} = {}, expected = {}",
            key_column, key, column, actual, expected
        )));
    }
    Ok(())
}
