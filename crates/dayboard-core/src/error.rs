//! Error types for DayBoard

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Rejected input (unsupported filing status, negative income, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Input that is valid but not implemented yet (married filing status)
    #[error("Not yet supported: {0}")]
    Unsupported(String),

    /// State has no bracket table and strict jurisdiction checking is on
    #[error("Unknown tax jurisdiction: {0}")]
    UnknownJurisdiction(String),

    #[error("Bracket lookup failed: {0}")]
    BracketLookup(String),

    #[error("Invalid bracket table: {0}")]
    InvalidTable(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
