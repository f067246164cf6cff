//! Adapters that materialize a [`Table`] from files on disk

mod csv;
mod excel;
mod json;
mod parquet;

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::config::Config;
use crate::model::Table;

pub use self::csv::CsvParser;
pub use self::excel::ExcelParser;
pub use self::json::JsonParser;
pub use self::parquet::{collect_parquet_files, ParquetParser};

/// Trait for parsing tabular data files
pub trait Parser: Send + Sync {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path, config: &Config) -> Result<Table>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for creating parsers based on file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(CsvParser),
                Box::new(ExcelParser),
                Box::new(ParquetParser),
                Box::new(JsonParser),
            ],
        }
    }

    /// Get a parser for the given file path
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => detect_format(path).unwrap_or("csv").to_string(),
        };

        for parser in &self.parsers {
            if parser.supports_extension(&ext) {
                return Ok(parser.as_ref());
            }
        }

        bail!("Unsupported file format: {}", ext)
    }

    /// Read a file, or a directory of Parquet files, into one table.
    ///
    /// The table is labelled with the path and sorted by `config.sort_by`
    /// when that is set.
    pub fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let table = if path.is_dir() {
            ParquetParser.parse_dir(path, config)?
        } else {
            self.get_parser(path)?.parse(path, config)?
        };
        debug!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "read table"
        );

        let table = table.with_label(path.display().to_string());
        if config.sort_by.is_empty() {
            Ok(table)
        } else {
            table
                .sorted_by(&config.sort_by)
                .with_context(|| format!("Failed to sort {}", path.display()))
        }
    }
}

/// Detect file format from content (for files without extension)
pub fn detect_format(path: &Path) -> Option<&'static str> {
    use std::fs::File;
    use std::io::{BufRead, BufReader, Read};

    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8];
    let bytes_read = reader.read(&mut buffer).ok()?;

    if bytes_read < 4 {
        return None;
    }

    // Check for Parquet magic bytes
    if &buffer[0..4] == b"PAR1" {
        return Some("parquet");
    }

    // Check for Excel ZIP format (xlsx)
    if &buffer[0..4] == b"PK\x03\x04" {
        return Some("xlsx");
    }

    // Check for old Excel format (xls)
    if &buffer[0..4] == b"\xD0\xCF\x11\xE0" {
        return Some("xls");
    }

    // Try to detect JSON
    reader.seek_relative(-(bytes_read as i64)).ok()?;
    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let trimmed = line.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Some("json");
    }

    // Default to CSV
    Some("csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_dispatch_by_extension() {
        let factory = ParserFactory::new();
        assert!(factory.get_parser(Path::new("a.csv")).is_ok());
        assert!(factory.get_parser(Path::new("a.PARQUET")).is_ok());
        assert!(factory.get_parser(Path::new("a.xlsx")).is_ok());
        assert!(factory.get_parser(Path::new("a.json")).is_ok());
        assert!(factory.get_parser(Path::new("a.xml")).is_err());
    }

    #[test]
    fn test_detect_json_without_extension() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[{{\"id\": 1}}]").unwrap();
        assert_eq!(detect_format(file.path()), Some("json"));
    }

    #[test]
    fn test_parse_labels_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.csv");
        std::fs::write(&path, "id,name\n2,Bob\n1,Ann\n").unwrap();

        let config = Config::new().with_sort_by(vec!["id".into()]);
        let table = ParserFactory::new().parse(&path, &config).unwrap();
        assert_eq!(table.label(), path.display().to_string());
        assert_eq!(table.value(0, "name").unwrap().to_string(), "Ann");
    }
}
