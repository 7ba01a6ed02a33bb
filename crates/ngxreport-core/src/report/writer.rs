use super::template::Template;
use crate::Result;
use crate::analysis::ReportRow;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the template placeholder that receives the rows
pub const TABLE_PLACEHOLDER: &str = "table_json";

pub struct ReportWriter;

impl ReportWriter {
    /// `<dir>/report_<YYYY.MM.DD>.html` for the log of `date`
    pub fn report_path(dir: &Path, date: NaiveDate) -> PathBuf {
        dir.join(format!("report_{}.html", date.format("%Y.%m.%d")))
    }

    /// Render rows as a JSON array into the template
    pub fn render(template: &Template, rows: &[ReportRow]) -> Result<String> {
        let json = serde_json::to_string(rows)?;
        let vars = HashMap::from([(TABLE_PLACEHOLDER, json)]);
        Ok(template.safe_substitute(&vars))
    }

    /// Write a report, creating its directory if needed.
    ///
    /// Content goes to a temporary file next to `path` that is renamed into
    /// place, so a failed write never leaves a partial report behind.
    pub fn to_file(path: &Path, contents: &str) -> Result<()> {
        tracing::debug!("Writing report to: {}", path.display());

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;

        tracing::info!("Report saved to {}", path.display());

        Ok(())
    }
}
