//! Error types shared by the model, checks and reconciler

use std::path::PathBuf;

use thiserror::Error;

use crate::validate::SchemaDiff;

/// Outcome of a single quality check
pub type CheckResult = Result<(), ValidationFailure>;

/// A failed data-quality assertion.
///
/// The message is complete on its own; callers never need to look anything
/// up to understand what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    message: String,
}

impl ValidationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised by the table model, schema policy and reconciler
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("schema mismatch:\n{0}")]
    SchemaMismatch(SchemaDiff),

    /// An adapter could not materialize any data at all
    #[error("no data could be read from {}: {reason}", path.display())]
    EmptyInput { path: PathBuf, reason: String },

    #[error("join key {key} is not unique in {side}")]
    NonUniqueKey { side: String, key: String },

    #[error("column '{column}' not found in {table}")]
    UnknownColumn { table: String, column: String },

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("row at line {line} has {found} cells, expected {expected}")]
    RowWidth {
        line: usize,
        expected: usize,
        found: usize,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
