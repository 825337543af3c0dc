//src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a filtering run.
#[derive(Error, Debug)]
pub enum OtuSubsetError {
    #[error("Required input(s) not found: {}", .0.join(", "))]
    MissingInput(Vec<String>),

    #[error("Missing column '{column}' in {artifact}")]
    MissingColumn { column: String, artifact: PathBuf },

    #[error("Invalid count value '{value}' at row {row}, column '{column}'")]
    InvalidCount {
        value: String,
        row: usize,
        column: String,
    },

    #[error("Row {row} has {actual} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported format for {path}: {reason}")]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
}

pub type Result<T> = std::result::Result<T, OtuSubsetError>;
