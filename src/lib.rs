//! tabrecon - Reconciliation and data-quality checks for tabular data
//!
//! Compares a source and a target dataset (CSV, Excel, Parquet, JSON) for
//! structural and value-level agreement: schema validation, single-table and
//! paired quality checks, and key-based reconciliation with a structured
//! discrepancy report.

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod recon;
pub mod suite;
pub mod validate;

pub use config::Config;
pub use error::{CheckResult, Error, ValidationFailure};
pub use model::{CellValue, Table};
pub use recon::{reconcile, Reconciler, ReconciliationReport};
pub use suite::{run_suite, SuiteConfig, SuiteReport};
