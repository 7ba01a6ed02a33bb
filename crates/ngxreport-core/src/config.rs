use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Keys recognized in a `KEY: value` config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    /// Maximum number of rows in a report
    ReportSize,
    /// Directory reports are written to
    ReportDir,
    /// Directory scanned for nginx access logs
    LogDir,
    /// HTML template containing the `$table_json` placeholder
    ReportTemplate,
    /// Maximum tolerated share of unparseable lines, in percent
    ErrorThreshold,
    /// Diagnostic log target; empty means standard output
    LogFile,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::ReportSize,
        ConfigKey::ReportDir,
        ConfigKey::LogDir,
        ConfigKey::ReportTemplate,
        ConfigKey::ErrorThreshold,
        ConfigKey::LogFile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ReportSize => "REPORT_SIZE",
            ConfigKey::ReportDir => "REPORT_DIR",
            ConfigKey::LogDir => "LOG_DIR",
            ConfigKey::ReportTemplate => "REPORT_TEMPLATE",
            ConfigKey::ErrorThreshold => "ERROR_THRESHOLD",
            ConfigKey::LogFile => "LOG_FILE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    fn default_value(&self) -> &'static str {
        match self {
            ConfigKey::ReportSize => "1000",
            ConfigKey::ReportDir => "./reports",
            ConfigKey::LogDir => "./log",
            ConfigKey::ReportTemplate => "./report.html",
            ConfigKey::ErrorThreshold => "40",
            ConfigKey::LogFile => "",
        }
    }
}

/// String-valued settings, built from defaults plus optional file overrides.
///
/// Values are kept exactly as written in the file; the typed accessors parse
/// them on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    values: BTreeMap<ConfigKey, String>,
}

impl Default for Config {
    fn default() -> Self {
        let values = ConfigKey::ALL
            .into_iter()
            .map(|key| (key, key.default_value().to_string()))
            .collect();
        Self { values }
    }
}

impl Config {
    /// Load the defaults, overridden by `path` when one is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        tracing::debug!("Reading config file: {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::ConfigNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;

        Ok(Self::default().merge(parse_overrides(&content)))
    }

    /// Return a new config with `overrides` applied on top of this one
    pub fn merge<I>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (ConfigKey, String)>,
    {
        let mut values = self.values.clone();
        values.extend(overrides);
        Self { values }
    }

    pub fn get(&self, key: ConfigKey) -> &str {
        self.values.get(&key).map(String::as_str).unwrap_or_default()
    }

    pub fn report_size(&self) -> Result<usize> {
        self.parse_value(ConfigKey::ReportSize)
    }

    pub fn error_threshold(&self) -> Result<f64> {
        let threshold: f64 = self.parse_value(ConfigKey::ErrorThreshold)?;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(self.invalid(ConfigKey::ErrorThreshold));
        }
        Ok(threshold)
    }

    pub fn report_dir(&self) -> PathBuf {
        PathBuf::from(self.get(ConfigKey::ReportDir))
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(self.get(ConfigKey::LogDir))
    }

    pub fn report_template(&self) -> PathBuf {
        PathBuf::from(self.get(ConfigKey::ReportTemplate))
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        let value = self.get(ConfigKey::LogFile);
        (!value.is_empty()).then(|| PathBuf::from(value))
    }

    fn parse_value<T: std::str::FromStr>(&self, key: ConfigKey) -> Result<T> {
        self.get(key).parse().map_err(|_| self.invalid(key))
    }

    fn invalid(&self, key: ConfigKey) -> Error {
        Error::InvalidConfig {
            key: key.as_str(),
            value: self.get(key).to_string(),
        }
    }
}

/// Extract `KEY: value` pairs for recognized keys, ignoring everything else.
///
/// A line must start with the key name itself; indented lines and a space
/// before the colon do not count as overrides.
fn parse_overrides(content: &str) -> Vec<(ConfigKey, String)> {
    content
        .lines()
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            let key = ConfigKey::from_name(name)?;
            let value = value.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'');
            Some((key, value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_path() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.get(ConfigKey::ReportSize), "1000");
        assert_eq!(config.get(ConfigKey::ReportDir), "./reports");
        assert_eq!(config.get(ConfigKey::LogDir), "./log");
        assert_eq!(config.report_size().unwrap(), 1000);
        assert_eq!(config.error_threshold().unwrap(), 40.0);
        assert!(config.log_file().is_none());
    }

    #[test]
    fn test_overrides_are_kept_as_strings() {
        let file = config_file("REPORT_SIZE: 1000\nLOG_DIR: ./log\n");
        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.get(ConfigKey::ReportSize), "1000");
        assert_eq!(config.get(ConfigKey::LogDir), "./log");
    }

    #[test]
    fn test_quotes_and_unknown_lines() {
        let file = config_file(
            "# comment\nREPORT_DIR: \"/var/reports\"\nUNKNOWN: 5\nREPORT_SIZE: '20'\n\nLOG_DIR\n",
        );
        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.get(ConfigKey::ReportDir), "/var/reports");
        assert_eq!(config.report_size().unwrap(), 20);
        assert_eq!(config.get(ConfigKey::LogDir), "./log");
    }

    #[test]
    fn test_key_must_start_the_line() {
        let file = config_file("  REPORT_SIZE: 5\nREPORT_SIZE : 6\n\tLOG_DIR: /tmp/logs\n");
        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.get(ConfigKey::ReportSize), "1000");
        assert_eq!(config.get(ConfigKey::LogDir), "./log");
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let file = config_file("LOG_FILE: C:/logs/analyzer.log\n");
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(
            config.log_file(),
            Some(PathBuf::from("C:/logs/analyzer.log"))
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Config::load(Some(Path::new("/definitely/not/here.conf")));
        assert!(matches!(result, Err(Error::ConfigNotFound(_))));
    }

    #[test]
    fn test_merge_does_not_touch_defaults() {
        let base = Config::default();
        let merged = base.merge([(ConfigKey::ReportSize, "5".to_string())]);

        assert_eq!(merged.get(ConfigKey::ReportSize), "5");
        assert_eq!(base.get(ConfigKey::ReportSize), "1000");
        assert_eq!(Config::default(), base);
    }

    #[test]
    fn test_invalid_numbers() {
        let config = Config::default().merge([
            (ConfigKey::ReportSize, "lots".to_string()),
            (ConfigKey::ErrorThreshold, "-3".to_string()),
        ]);

        assert!(matches!(
            config.report_size(),
            Err(Error::InvalidConfig { key: "REPORT_SIZE", .. })
        ));
        assert!(matches!(
            config.error_threshold(),
            Err(Error::InvalidConfig { key: "ERROR_THRESHOLD", .. })
        ));
    }
}
