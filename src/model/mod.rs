//! Data model for tabular data representation

mod key;
mod schema;
mod table;

pub use key::{KeyBuilder, KeyTuple};
pub use schema::{normalize_column_name, CellType, Column};
pub use table::{CellValue, Row, Table};

pub(crate) use table::{parse_number, parse_temporal};
