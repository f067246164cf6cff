//! CSV file parser

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::model::{parse_number, parse_temporal, CellValue, Column, Table};

use super::Parser;

/// Parser for CSV and TSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(BufReader::new(file));

        let headers = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .clone();

        let columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(name.to_string(), i))
            .collect();

        let mut table = Table::new(columns)?;

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2; // 1-indexing plus header
            let record = result.with_context(|| format!("Failed to read CSV row {}", line))?;

            let mut cells: Vec<CellValue> = record.iter().map(parse_cell_value).collect();

            // Pad with nulls if row has fewer columns
            if cells.len() < table.column_count() {
                cells.resize(table.column_count(), CellValue::Null);
            }

            table
                .push_row(cells, line)
                .with_context(|| format!("Malformed CSV row in {}", path.display()))?;
        }

        table.infer_column_types();
        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

/// Parse a string value into a CellValue with type inference
fn parse_cell_value(s: &str) -> CellValue {
    let trimmed = s.trim();

    // Check for empty/null
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") || trimmed == "NA" {
        return CellValue::Null;
    }

    if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("yes") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("no") {
        return CellValue::Bool(false);
    }

    if let Some(number) = parse_number(trimmed) {
        return number;
    }

    if let Some(value) = parse_temporal(trimmed) {
        return value;
    }

    CellValue::String(Cow::Owned(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellType;

    #[test]
    fn test_parse_cell_value() {
        assert_eq!(parse_cell_value(""), CellValue::Null);
        assert_eq!(parse_cell_value("null"), CellValue::Null);
        assert_eq!(parse_cell_value("true"), CellValue::Bool(true));
        assert_eq!(parse_cell_value("false"), CellValue::Bool(false));
        assert_eq!(parse_cell_value("42"), CellValue::Int(42));
        assert_eq!(parse_cell_value("3.14"), CellValue::Float(3.14));
        assert_eq!(parse_cell_value("Nan"), CellValue::from("Nan"));
        assert_eq!(parse_cell_value("inf"), CellValue::from("inf"));
        assert_eq!(
            parse_cell_value("2024-01-01"),
            CellValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert_eq!(
            parse_cell_value("hello"),
            CellValue::String(Cow::Owned("hello".to_string()))
        );
    }

    #[test]
    fn test_short_rows_are_padded_and_types_inferred() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.csv");
        std::fs::write(&path, "id,name,age\n1,Ann,34\n2,Bob\n").unwrap();

        let table = CsvParser.parse(&path, &Config::default()).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value(1, "age"), Some(&CellValue::Null));
        assert_eq!(table.column("age").unwrap().inferred_type, CellType::Int);
        assert_eq!(table.rows()[1].source_line, 3);
    }

    #[test]
    fn test_long_row_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "id,name\n1,Ann,extra\n").unwrap();
        assert!(CsvParser.parse(&path, &Config::default()).is_err());
    }

    #[test]
    fn test_tsv_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.tsv");
        std::fs::write(&path, "id\tname\n1\tAnn\n").unwrap();
        let table = CsvParser.parse(&path, &Config::default()).unwrap();
        assert_eq!(table.column_names(), vec!["id", "name"]);
    }
}
