//! Schema validation and data-quality checks

pub mod quality;
mod schema;

pub use schema::{validate, validate_table, OrderMismatch, SchemaDiff, SchemaPolicy};
