// src/error.rs

use std::{fmt::Display, path::PathBuf};
use thiserror::Error;

/// Errors raised while loading sources or evaluating a query.
///
/// An empty filter result is never an error: every query operation returns an
/// empty-but-valid value instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A source file is missing, unreadable, malformed, or does not carry the
    /// expected columns. Fatal at startup.
    #[error("failed to load {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    /// A requested column is not part of the table it was asked of.
    #[error("column `{column}` is not present in table `{table}`")]
    SchemaDrift { table: String, column: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("polars: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl PipelineError {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl Display) -> Self {
        PipelineError::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn drift(table: &str, column: &str) -> Self {
        PipelineError::SchemaDrift {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
