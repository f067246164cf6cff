//! Measure value comparison

use crate::config::DEFAULT_NUMERIC_TOLERANCE;
use crate::model::CellValue;

/// Cell comparator with configurable options
#[derive(Debug, Clone)]
pub struct CellComparator {
    ignore_case: bool,
    ignore_whitespace: bool,
    numeric_tolerance: f64,
}

impl CellComparator {
    /// Create a new cell comparator
    pub fn new(ignore_case: bool, ignore_whitespace: bool, numeric_tolerance: f64) -> Self {
        Self {
            ignore_case,
            ignore_whitespace,
            numeric_tolerance,
        }
    }

    /// Compare two cell values for equality.
    ///
    /// Null equals only null. Values with a numeric reading (numbers and
    /// numeric strings) compare as `f64` within the absolute tolerance, so
    /// `"5.00"` equals `5.0`. Equal infinities match and NaN matches only
    /// NaN. Dates compare after string coercion.
    pub fn equal(&self, a: &CellValue, b: &CellValue) -> bool {
        match (a.is_null(), b.is_null()) {
            (true, true) => return true,
            (true, false) | (false, true) => return false,
            (false, false) => {}
        }

        if let (CellValue::Int(x), CellValue::Int(y)) = (a, b) {
            return (*x as i128 - *y as i128).unsigned_abs() as f64 <= self.numeric_tolerance;
        }

        if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
            if x.is_nan() || y.is_nan() {
                return x.is_nan() && y.is_nan();
            }
            // inf - inf is NaN, so identical infinities need the equality test
            return x == y || (x - y).abs() <= self.numeric_tolerance;
        }

        if is_temporal(a) || is_temporal(b) {
            return a.coerce() == b.coerce();
        }

        match (self.ignore_case, self.ignore_whitespace) {
            (true, true) => match (a, b) {
                (CellValue::String(x), CellValue::String(y)) => {
                    x.trim().eq_ignore_ascii_case(y.trim())
                }
                _ => a == b,
            },
            (true, false) => a.equals_ignore_case(b),
            (false, true) => a.equals_ignore_whitespace(b),
            (false, false) => a == b,
        }
    }
}

impl Default for CellComparator {
    fn default() -> Self {
        Self::new(false, false, DEFAULT_NUMERIC_TOLERANCE)
    }
}

fn is_temporal(value: &CellValue) -> bool {
    matches!(value, CellValue::Date(_) | CellValue::DateTime(_))
}

/// Calculate percentage change for numeric values
pub fn percentage_change(old: &CellValue, new: &CellValue) -> Option<f64> {
    let old_num = old.as_f64()?;
    let new_num = new.as_f64()?;

    if old_num == 0.0 {
        if new_num == 0.0 {
            Some(0.0)
        } else {
            None // Infinite change
        }
    } else {
        Some((new_num - old_num) / old_num * 100.0)
    }
}
