use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// A log file selected for processing, identified by the date in its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileRef {
    pub path: PathBuf,
    pub date: NaiveDate,
    pub compressed: bool,
}

/// One successfully parsed access log line
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub url: String,
    /// Seconds, rounded to 3 decimals
    pub request_time: f64,
}

/// Why a line did not match the expected `ui_short` layout
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineError {
    #[error("line has {0} fields, expected at least 8")]
    TooFewFields(usize),

    #[error("url field is empty")]
    EmptyUrl,

    #[error("request time is missing")]
    MissingTime,

    #[error("request time {0:?} is not a non-negative number")]
    InvalidTime(String),
}
