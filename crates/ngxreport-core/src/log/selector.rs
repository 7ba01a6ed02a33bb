use super::types::LogFileRef;
use crate::{Error, Result};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;

const LOG_PREFIX: &str = "nginx-access-ui";

lazy_static! {
    static ref LOG_NAME: Regex = Regex::new(r"^nginx-access-ui\.log-(\d{8})(\.gz)?$").unwrap();
}

/// Log files of a directory in ascending date order.
///
/// Finite and single-pass; collect it if the files are needed twice.
#[derive(Debug)]
pub struct LogFiles {
    files: std::vec::IntoIter<LogFileRef>,
}

impl LogFiles {
    /// The newest file, consuming the selection
    pub fn latest(self) -> Option<LogFileRef> {
        self.files.last()
    }
}

impl Iterator for LogFiles {
    type Item = LogFileRef;

    fn next(&mut self) -> Option<Self::Item> {
        self.files.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.files.size_hint()
    }
}

/// Find the nginx access logs in `dir`, sorted by the date in their names
pub fn select_log_files(dir: &Path) -> Result<LogFiles> {
    tracing::debug!("Scanning for log files in: {}", dir.display());

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with(LOG_PREFIX) {
            continue;
        }
        let Some((date, compressed)) = parse_log_name(name)? else {
            tracing::debug!("Ignoring {}: name does not match the log pattern", name);
            continue;
        };
        files.push(LogFileRef {
            path,
            date,
            compressed,
        });
    }

    files.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.path.cmp(&b.path)));

    if files.is_empty() {
        tracing::info!("No log files found in {}", dir.display());
    } else {
        tracing::debug!("Found {} log files", files.len());
    }

    Ok(LogFiles {
        files: files.into_iter(),
    })
}

/// Match a file name against the log pattern, returning its date and
/// whether it is gzip-compressed.
///
/// `Ok(None)` means the name is not a log file; a matching name with an
/// impossible date is an error.
fn parse_log_name(name: &str) -> Result<Option<(NaiveDate, bool)>> {
    let Some(caps) = LOG_NAME.captures(name) else {
        return Ok(None);
    };

    let date = NaiveDate::parse_from_str(&caps[1], "%Y%m%d")
        .map_err(|_| Error::InvalidLogName(name.to_string()))?;

    Ok(Some((date, caps.get(2).is_some())))
}
