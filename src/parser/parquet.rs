//! Parquet file and directory parser

use std::borrow::Cow;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, BooleanArray, LargeStringArray, PrimitiveArray, StringArray};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType as ArrowType, Date32Type, Date64Type, Float32Type, Float64Type,
    Int16Type, Int32Type, Int64Type, Int8Type, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::{DateTime, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Error;
use crate::model::{CellType, CellValue, Column, Table};

use super::Parser;

/// Parser for Parquet files
pub struct ParquetParser;

impl Parser for ParquetParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open Parquet file: {}", path.display()))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .with_context(|| format!("Failed to create Parquet reader for {}", path.display()))?;

        let schema = builder.schema().clone();
        let reader = builder.build().context("Failed to build Parquet reader")?;

        let columns: Vec<Column> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| {
                Column::with_type(field.name().clone(), i, arrow_type_to_cell_type(field.data_type()))
            })
            .collect();

        let mut table = Table::new(columns)?;

        let mut line_num = 0usize;
        for batch_result in reader {
            let batch = batch_result.context("Failed to read Parquet batch")?;

            for row_idx in 0..batch.num_rows() {
                line_num += 1;
                let cells: Vec<CellValue> = batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell_value(col, row_idx))
                    .collect();

                table.push_row(cells, line_num)?;
            }
        }

        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "parquet" | "pq")
    }
}

impl ParquetParser {
    /// Read every Parquet file under `dir` into one table.
    ///
    /// Files are read in parallel and concatenated in sorted path order.
    pub fn parse_dir(&self, dir: &Path, config: &Config) -> Result<Table> {
        let files = collect_parquet_files(dir, config.include_subfolders)?;
        info!(dir = %dir.display(), files = files.len(), "reading parquet directory");

        let parts = files
            .par_iter()
            .map(|file| {
                let table = self.parse(file, config)?;
                debug!(file = %file.display(), rows = table.row_count(), "read parquet file");
                Ok(table)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Table::concat(parts))
    }
}

/// List `*.parquet` files under `root`, sorted. Fails with
/// [`Error::EmptyInput`] when there are none.
pub fn collect_parquet_files(root: &Path, include_subfolders: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("Failed to list directory: {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                if include_subfolders {
                    pending.push(path);
                }
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("parquet"))
            {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        return Err(Error::EmptyInput {
            path: root.to_path_buf(),
            reason: "no parquet files found".to_string(),
        }
        .into());
    }

    files.sort();
    Ok(files)
}

fn arrow_type_to_cell_type(arrow_type: &ArrowType) -> CellType {
    match arrow_type {
        ArrowType::Null => CellType::Null,
        ArrowType::Boolean => CellType::Bool,
        ArrowType::Int8
        | ArrowType::Int16
        | ArrowType::Int32
        | ArrowType::Int64
        | ArrowType::UInt8
        | ArrowType::UInt16
        | ArrowType::UInt32
        | ArrowType::UInt64 => CellType::Int,
        ArrowType::Float16
        | ArrowType::Float32
        | ArrowType::Float64
        | ArrowType::Decimal128(_, _)
        | ArrowType::Decimal256(_, _) => CellType::Float,
        ArrowType::Utf8 | ArrowType::LargeUtf8 => CellType::String,
        ArrowType::Date32 | ArrowType::Date64 => CellType::Date,
        ArrowType::Timestamp(_, _) => CellType::DateTime,
        _ => CellType::String, // Fallback to string for complex types
    }
}

fn primitive<T: ArrowPrimitiveType>(array: &ArrayRef, row_idx: usize) -> Option<T::Native> {
    array
        .as_any()
        .downcast_ref::<PrimitiveArray<T>>()
        .map(|arr| arr.value(row_idx))
}

fn formatted(array: &ArrayRef, row_idx: usize) -> Option<String> {
    ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default())
        .ok()
        .map(|fmt| fmt.value(row_idx).to_string())
}

fn timestamp(nanos: Option<i64>) -> Option<CellValue> {
    nanos.map(|n| CellValue::DateTime(DateTime::from_timestamp_nanos(n).naive_utc()))
}

fn extract_cell_value(array: &ArrayRef, row_idx: usize) -> CellValue {
    if array.is_null(row_idx) {
        return CellValue::Null;
    }

    let value = match array.data_type() {
        ArrowType::Boolean => array
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|arr| CellValue::Bool(arr.value(row_idx))),
        ArrowType::Int8 => primitive::<Int8Type>(array, row_idx).map(|v| CellValue::Int(v.into())),
        ArrowType::Int16 => primitive::<Int16Type>(array, row_idx).map(|v| CellValue::Int(v.into())),
        ArrowType::Int32 => primitive::<Int32Type>(array, row_idx).map(|v| CellValue::Int(v.into())),
        ArrowType::Int64 => primitive::<Int64Type>(array, row_idx).map(CellValue::Int),
        ArrowType::UInt8 => primitive::<UInt8Type>(array, row_idx).map(|v| CellValue::Int(v.into())),
        ArrowType::UInt16 => primitive::<UInt16Type>(array, row_idx).map(|v| CellValue::Int(v.into())),
        ArrowType::UInt32 => primitive::<UInt32Type>(array, row_idx).map(|v| CellValue::Int(v.into())),
        ArrowType::UInt64 => primitive::<UInt64Type>(array, row_idx).map(|v| {
            i64::try_from(v)
                .map(CellValue::Int)
                .unwrap_or(CellValue::Float(v as f64))
        }),
        ArrowType::Float32 => {
            primitive::<Float32Type>(array, row_idx).map(|v| CellValue::Float(v.into()))
        }
        ArrowType::Float64 => primitive::<Float64Type>(array, row_idx).map(CellValue::Float),
        ArrowType::Decimal128(_, _) | ArrowType::Decimal256(_, _) => formatted(array, row_idx)
            .and_then(|s| s.parse::<f64>().ok())
            .map(CellValue::Float),
        ArrowType::Utf8 => array
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|arr| CellValue::String(Cow::Owned(arr.value(row_idx).to_string()))),
        ArrowType::LargeUtf8 => array
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .map(|arr| CellValue::String(Cow::Owned(arr.value(row_idx).to_string()))),
        ArrowType::Date32 => primitive::<Date32Type>(array, row_idx).and_then(|days| {
            // Days since the Unix epoch, which is day 719163 of the common era
            NaiveDate::from_num_days_from_ce_opt(days + 719_163).map(CellValue::Date)
        }),
        ArrowType::Date64 => primitive::<Date64Type>(array, row_idx)
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| CellValue::Date(dt.naive_utc().date())),
        ArrowType::Timestamp(unit, _) => {
            let nanos = match unit {
                TimeUnit::Second => primitive::<TimestampSecondType>(array, row_idx)
                    .and_then(|v| v.checked_mul(1_000_000_000)),
                TimeUnit::Millisecond => primitive::<TimestampMillisecondType>(array, row_idx)
                    .and_then(|v| v.checked_mul(1_000_000)),
                TimeUnit::Microsecond => primitive::<TimestampMicrosecondType>(array, row_idx)
                    .and_then(|v| v.checked_mul(1_000)),
                TimeUnit::Nanosecond => primitive::<TimestampNanosecondType>(array, row_idx),
            };
            timestamp(nanos)
        }
        _ => None,
    };

    value
        .or_else(|| formatted(array, row_idx).map(|s| CellValue::String(Cow::Owned(s))))
        .unwrap_or(CellValue::Null)
}
