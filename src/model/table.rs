//! Table, Row, and Cell data structures

use std::borrow::Cow;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::schema::{normalize_column_name, CellType, Column};
use crate::error::{Error, Result};

/// A cell value with type information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Cow<'static, str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            // Cross-type numeric comparison
            (CellValue::Int(a), CellValue::Float(b)) => exact_int(*b) == Some(*a),
            (CellValue::Float(a), CellValue::Int(b)) => exact_int(*a) == Some(*b),
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Integral floats hash like the equal Int so Hash agrees with Eq
        match self {
            CellValue::Null => 0u8.hash(state),
            CellValue::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            CellValue::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            CellValue::Float(f) => {
                if let Some(i) = exact_int(*f) {
                    2u8.hash(state);
                    i.hash(state);
                } else if f.is_nan() {
                    3u8.hash(state);
                    f64::NAN.to_bits().hash(state);
                } else {
                    3u8.hash(state);
                    f.to_bits().hash(state);
                }
            }
            CellValue::String(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            CellValue::Date(d) => {
                5u8.hash(state);
                d.hash(state);
            }
            CellValue::DateTime(dt) => {
                6u8.hash(state);
                dt.hash(state);
            }
        }
    }
}

/// 2^63, the first float above every `i64`
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// The `i64` a float is exactly equal to, if any
fn exact_int(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f >= -I64_BOUND && f < I64_BOUND).then_some(f as i64)
}

/// Order an int against a float without rounding the int through `f64`
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    if f.is_nan() {
        return Ordering::Less;
    }
    if f >= I64_BOUND {
        return Ordering::Less;
    }
    if f < -I64_BOUND {
        return Ordering::Greater;
    }
    // In range, so the floor is a representable i64 and `floor <= f < floor + 1`
    let floor = f.floor() as i64;
    match i.cmp(&floor) {
        Ordering::Equal if f.fract() != 0.0 => Ordering::Less,
        ord => ord,
    }
}

/// Parse numeric text as an `Int`, or as a finite `Float` written with digits.
/// Words such as `nan` or `inf` are not numbers here.
pub(crate) fn parse_number(s: &str) -> Option<CellValue> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(CellValue::Int(i));
    }
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(CellValue::Float)
}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Total order: `Null < Bool < number < Date < DateTime < String`.
/// Ints and floats compare by exact numeric value; NaN sorts after every number.
impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::String(a), CellValue::String(b)) => a.cmp(b),
            (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a.cmp(b),
            (CellValue::Float(x), CellValue::Float(y)) => x
                .partial_cmp(y)
                .unwrap_or_else(|| x.is_nan().cmp(&y.is_nan())),
            (CellValue::Int(i), CellValue::Float(f)) => cmp_int_float(*i, *f),
            (CellValue::Float(f), CellValue::Int(i)) => cmp_int_float(*i, *f).reverse(),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl CellValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    fn rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Int(_) | CellValue::Float(_) => 2,
            CellValue::Date(_) => 3,
            CellValue::DateTime(_) => 4,
            CellValue::String(_) => 5,
        }
    }

    /// The type this single value contributes to column inference
    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::Null => CellType::Null,
            CellValue::Bool(_) => CellType::Bool,
            CellValue::Int(_) => CellType::Int,
            CellValue::Float(_) => CellType::Float,
            CellValue::String(_) => CellType::String,
            CellValue::Date(_) => CellType::Date,
            CellValue::DateTime(_) => CellType::DateTime,
        }
    }

    /// Numeric view of the value. Strings that parse as numbers count.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Convert to a display string
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed("NULL"),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
            CellValue::String(s) => Cow::Borrowed(s.as_ref()),
            CellValue::Date(d) => Cow::Owned(d.to_string()),
            CellValue::DateTime(dt) => Cow::Owned(dt.to_string()),
        }
    }

    /// Bring representational variants onto one comparable form.
    ///
    /// Strings are trimmed and parsed as integer, finite float, ISO date or
    /// ISO datetime; a datetime at midnight becomes a date. Anything else is
    /// returned unchanged.
    pub fn coerce(&self) -> CellValue {
        match self {
            CellValue::String(s) => {
                let trimmed = s.trim();
                if let Some(number) = parse_number(trimmed) {
                    return number;
                }
                if let Some(value) = parse_temporal(trimmed) {
                    return value;
                }
                CellValue::String(Cow::Owned(trimmed.to_string()))
            }
            CellValue::DateTime(dt) if dt.time() == NaiveTime::MIN => CellValue::Date(dt.date()),
            other => other.clone(),
        }
    }

    /// Compare ignoring case (for strings)
    pub fn equals_ignore_case(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::String(a), CellValue::String(b)) => a.eq_ignore_ascii_case(b),
            _ => self == other,
        }
    }

    /// Compare ignoring whitespace (for strings)
    pub fn equals_ignore_whitespace(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::String(a), CellValue::String(b)) => a.trim() == b.trim(),
            _ => self == other,
        }
    }
}

/// Parse ISO dates and datetimes
pub(crate) fn parse_temporal(s: &str) -> Option<CellValue> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(CellValue::Date(date));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            if dt.time() == NaiveTime::MIN {
                return Some(CellValue::Date(dt.date()));
            }
            return Some(CellValue::DateTime(dt));
        }
    }
    None
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Cow::Owned(s.to_string()))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(Cow::Owned(s))
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// A row in the table
#[derive(Debug, Clone)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<CellValue>,
    /// Original line/row number in source file (1-indexed)
    pub source_line: usize,
}

impl Row {
    pub fn new(cells: Vec<CellValue>, source_line: usize) -> Self {
        Self { cells, source_line }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A table: uniquely named columns and rows of exactly that width.
///
/// Checks never mutate a table; every transform returns a new one.
#[derive(Debug, Clone)]
pub struct Table {
    label: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table with column definitions
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = IndexSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(Error::DuplicateColumn(column.name.clone()));
            }
        }
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(index, column)| Column { index, ..column })
            .collect();
        Ok(Self {
            label: "table".to_string(),
            columns,
            rows: Vec::new(),
        })
    }

    /// Build a table from column names and row-major values, inferring types
    pub fn from_rows<S: AsRef<str>>(names: &[S], rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let columns = names
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(name.as_ref(), i))
            .collect();
        let mut table = Self::new(columns)?;
        for (i, cells) in rows.into_iter().enumerate() {
            table.push_row(cells, i + 1)?;
        }
        table.infer_column_types();
        Ok(table)
    }

    /// Build a table from per-column value lists, the shape a rendered chart
    /// yields. Rows are truncated to the shortest column and blank headers
    /// become `unknown`.
    pub fn from_column_values(headers: &[String], values: Vec<Vec<CellValue>>) -> Result<Self> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| {
                let h = h.trim();
                if h.is_empty() {
                    "unknown".to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();
        let row_count = values.iter().map(Vec::len).min().unwrap_or(0);
        let rows = (0..row_count)
            .map(|i| values.iter().map(|col| col[i].clone()).collect())
            .collect();
        Self::from_rows(&names, rows)
    }

    /// Set the label used to name this table in errors and reports
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Append a row, rejecting it if its width does not match the columns
    pub fn push_row(&mut self, cells: Vec<CellValue>, source_line: usize) -> Result<()> {
        if cells.len() != self.columns.len() {
            return Err(Error::RowWidth {
                line: source_line,
                expected: self.columns.len(),
                found: cells.len(),
            });
        }
        self.rows.push(Row::new(cells, source_line));
        Ok(())
    }

    /// Infer column types from data
    pub fn infer_column_types(&mut self) {
        for (col_idx, column) in self.columns.iter_mut().enumerate() {
            column.inferred_type = self
                .rows
                .iter()
                .filter_map(|row| row.get(col_idx))
                .fold(CellType::Null, |acc, cell| acc.widen(cell.cell_type()));
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Resolve column names to indices, failing on the first unknown name
    pub fn resolve_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                self.column_index(name.as_ref())
                    .ok_or_else(|| Error::UnknownColumn {
                        table: self.label.clone(),
                        column: name.as_ref().to_string(),
                    })
            })
            .collect()
    }

    /// Value of `column` in row `row_idx`
    pub fn value(&self, row_idx: usize, column: &str) -> Option<&CellValue> {
        let col_idx = self.column_index(column)?;
        self.rows.get(row_idx)?.get(col_idx)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Project onto `names`, in that order
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let indices = self.resolve_columns(names)?;
        let columns = indices.iter().map(|&i| self.columns[i].clone()).collect();
        let mut table = Table::new(columns)?.with_label(self.label.clone());
        table.rows = self
            .rows
            .iter()
            .map(|row| {
                let cells = indices.iter().map(|&i| row.cells[i].clone()).collect();
                Row::new(cells, row.source_line)
            })
            .collect();
        Ok(table)
    }

    /// Stable ascending sort by the tuple of `names`
    pub fn sorted_by<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let indices = self.resolve_columns(names)?;
        let mut table = self.clone();
        table.rows.sort_by(|a, b| {
            indices
                .iter()
                .map(|&i| a.cells[i].cmp(&b.cells[i]))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        Ok(table)
    }

    /// Copy with every column name in canonical form
    pub fn with_normalized_column_names(&self) -> Result<Table> {
        self.map_column_names(|name| normalize_column_name(name))
    }

    /// Copy with columns renamed per `(from, to)` pairs; unmatched pairs are ignored
    pub fn rename_columns(&self, aliases: &[(String, String)]) -> Result<Table> {
        self.map_column_names(|name| {
            aliases
                .iter()
                .find(|(from, _)| from == name)
                .map(|(_, to)| to.clone())
                .unwrap_or_else(|| name.to_string())
        })
    }

    fn map_column_names(&self, f: impl Fn(&str) -> String) -> Result<Table> {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: f(&c.name),
                ..c.clone()
            })
            .collect();
        let mut table = Table::new(columns)?.with_label(self.label.clone());
        table.rows = self.rows.clone();
        Ok(table)
    }

    /// Copy with the named columns passed through [`CellValue::coerce`]
    pub fn with_coerced_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let indices = self.resolve_columns(names)?;
        let mut table = self.clone();
        for row in &mut table.rows {
            for &i in &indices {
                row.cells[i] = row.cells[i].coerce();
            }
        }
        table.infer_column_types();
        Ok(table)
    }

    /// Copy keeping only the rows matching `predicate`
    pub fn filter(&self, predicate: impl Fn(&Row) -> bool) -> Table {
        let mut table = self.clone();
        table.rows.retain(|row| predicate(row));
        table
    }

    /// Concatenate tables into one. Columns are the union in first-seen
    /// order; cells a part lacks become `Null`.
    pub fn concat(parts: Vec<Table>) -> Table {
        let mut names: IndexMap<String, CellType> = IndexMap::new();
        for part in &parts {
            for column in &part.columns {
                names
                    .entry(column.name.clone())
                    .and_modify(|t| *t = t.widen(column.inferred_type))
                    .or_insert(column.inferred_type);
            }
        }
        let columns = names
            .iter()
            .enumerate()
            .map(|(i, (name, t))| Column::with_type(name.clone(), i, *t))
            .collect();
        let label = parts.first().map(|p| p.label.clone()).unwrap_or_default();

        let mut rows = Vec::with_capacity(parts.iter().map(Table::row_count).sum());
        for part in parts {
            let mapping: Vec<Option<usize>> =
                names.keys().map(|name| part.column_index(name)).collect();
            for row in part.rows {
                let cells = mapping
                    .iter()
                    .map(|idx| idx.and_then(|i| row.cells.get(i).cloned()).unwrap_or(CellValue::Null))
                    .collect();
                rows.push(Row::new(cells, rows.len() + 1));
            }
        }

        Table {
            label,
            columns,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(names: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        Table::from_rows(names, rows).unwrap()
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Table::from_rows(&["id", "id"], vec![]).unwrap_err();
        assert!(matches!(err, Error::DuplicateColumn(name) if name == "id"));
    }

    #[test]
    fn test_row_width_enforced() {
        let err = Table::from_rows(&["id", "name"], vec![vec![1i64.into()]]).unwrap_err();
        assert!(matches!(err, Error::RowWidth { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_cross_type_numeric_equality_and_hash() {
        use std::collections::hash_map::DefaultHasher;

        let hash = |v: &CellValue| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        assert_eq!(CellValue::Int(5), CellValue::Float(5.0));
        assert_eq!(hash(&CellValue::Int(5)), hash(&CellValue::Float(5.0)));
        assert_eq!(CellValue::Int(5).cmp(&CellValue::Float(5.0)), Ordering::Equal);
    }

    #[test]
    fn test_int_float_equality_is_exact_beyond_f64_precision() {
        use std::collections::hash_map::DefaultHasher;

        let hash = |v: &CellValue| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        // 2^53 + 1 rounds to 2^53 as a float
        let big = CellValue::Int(9_007_199_254_740_993);
        let near = CellValue::Float(9_007_199_254_740_992.0);
        assert_ne!(big, near);
        assert_eq!(big.cmp(&near), Ordering::Greater);
        assert_eq!(near.cmp(&big), Ordering::Less);

        let exact = CellValue::Int(9_007_199_254_740_992);
        assert_eq!(exact, near);
        assert_eq!(hash(&exact), hash(&near));
        assert_eq!(exact.cmp(&near), Ordering::Equal);

        assert_ne!(CellValue::Int(i64::MAX), CellValue::Float(i64::MAX as f64));
        assert_eq!(
            CellValue::Int(i64::MAX).cmp(&CellValue::Float(i64::MAX as f64)),
            Ordering::Less
        );
        assert_eq!(CellValue::Int(2).cmp(&CellValue::Float(2.5)), Ordering::Less);
        assert_eq!(CellValue::Int(3).cmp(&CellValue::Float(2.5)), Ordering::Greater);
        assert_eq!(CellValue::Int(-3).cmp(&CellValue::Float(-2.5)), Ordering::Less);
        assert_eq!(CellValue::Int(-2).cmp(&CellValue::Float(-2.5)), Ordering::Greater);
        assert_eq!(CellValue::Int(0).cmp(&CellValue::Float(f64::NAN)), Ordering::Less);
    }

    #[test]
    fn test_total_order_across_types() {
        let mut values = vec![
            CellValue::from("b"),
            CellValue::Float(2.5),
            CellValue::Null,
            CellValue::Int(1),
            CellValue::Bool(true),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                CellValue::Null,
                CellValue::Bool(true),
                CellValue::Int(1),
                CellValue::Float(2.5),
                CellValue::from("b"),
            ]
        );
    }

    #[test]
    fn test_coerce() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(CellValue::from(" 2024-01-01 ").coerce(), CellValue::Date(date));
        assert_eq!(CellValue::from("2024-01-01 00:00:00").coerce(), CellValue::Date(date));
        assert_eq!(CellValue::from("5.00").coerce(), CellValue::Float(5.0));
        assert_eq!(CellValue::from("42").coerce(), CellValue::Int(42));
        assert_eq!(CellValue::from("X ").coerce(), CellValue::from("X"));
        assert_eq!(CellValue::from("1e3").coerce(), CellValue::Float(1000.0));
        assert_eq!(
            CellValue::DateTime(date.and_time(NaiveTime::MIN)).coerce(),
            CellValue::Date(date)
        );
    }

    #[test]
    fn test_coerce_keeps_number_like_words_as_text() {
        for word in ["Nan", "NaN", "inf", "Infinity", "-inf", " nan "] {
            assert_eq!(
                CellValue::from(word).coerce(),
                CellValue::from(word.trim()),
                "{word}"
            );
        }
        assert_eq!(CellValue::from("1e400").coerce(), CellValue::from("1e400"));
    }

    #[test]
    fn test_select_reorders_and_rejects_unknown() {
        let t = table(&["a", "b", "c"], vec![vec![1i64.into(), 2i64.into(), 3i64.into()]]);
        let projected = t.select(&["c", "a"]).unwrap();
        assert_eq!(projected.column_names(), vec!["c", "a"]);
        assert_eq!(projected.rows()[0].cells, vec![CellValue::Int(3), CellValue::Int(1)]);
        assert_eq!(projected.columns()[1].index, 1);

        let err = t.select(&["z"]).unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { column, .. } if column == "z"));
    }

    #[test]
    fn test_sorted_by_is_stable_and_leaves_input_untouched() {
        let t = table(
            &["k", "v"],
            vec![
                vec!["b".into(), 1i64.into()],
                vec!["a".into(), 2i64.into()],
                vec!["b".into(), 3i64.into()],
            ],
        );
        let sorted = t.sorted_by(&["k"]).unwrap();
        let values: Vec<_> = sorted.rows().iter().map(|r| r.cells[1].clone()).collect();
        assert_eq!(values, vec![CellValue::Int(2), CellValue::Int(1), CellValue::Int(3)]);
        assert_eq!(t.rows()[0].cells[0], CellValue::from("b"));
    }

    #[test]
    fn test_normalized_and_renamed_columns() {
        let t = table(&[" Facility Type", "Average Time Spent"], vec![]);
        let t = t
            .with_normalized_column_names()
            .unwrap()
            .rename_columns(&[("average_time_spent".into(), "avg_time_spent".into())])
            .unwrap();
        assert_eq!(t.column_names(), vec!["facility_type", "avg_time_spent"]);
    }

    #[test]
    fn test_normalization_collision_rejected() {
        let t = table(&["Visit Date", "visit_date"], vec![]);
        assert!(matches!(
            t.with_normalized_column_names(),
            Err(Error::DuplicateColumn(_))
        ));
    }

    #[test]
    fn test_concat_unions_columns() {
        let a = table(&["id", "x"], vec![vec![1i64.into(), 10i64.into()]]);
        let b = table(&["id", "y"], vec![vec![2i64.into(), "q".into()]]);
        let merged = Table::concat(vec![a, b]);
        assert_eq!(merged.column_names(), vec!["id", "x", "y"]);
        assert_eq!(merged.row_count(), 2);
        assert_eq!(merged.rows()[1].cells[1], CellValue::Null);
        assert_eq!(merged.rows()[0].cells[2], CellValue::Null);
    }

    #[test]
    fn test_from_column_values_truncates_to_shortest() {
        let t = Table::from_column_values(
            &["Facility Type".to_string(), " ".to_string()],
            vec![
                vec!["A".into(), "B".into()],
                vec!["1".into()],
            ],
        )
        .unwrap();
        assert_eq!(t.column_names(), vec!["Facility Type", "unknown"]);
        assert_eq!(t.row_count(), 1);
    }
}
