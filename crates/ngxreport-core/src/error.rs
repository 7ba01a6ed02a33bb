use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report rows: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },

    #[error("Log file name has an invalid date: {0}")]
    InvalidLogName(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error(
        "Errors threshold exceeded for {}: {rate}% of lines failed to parse (limit {threshold}%)",
        .path.display()
    )]
    ErrorThresholdExceeded {
        path: PathBuf,
        rate: f64,
        threshold: f64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
