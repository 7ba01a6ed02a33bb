use anyhow::{Context, Result};
use ngxreport_core::analysis::Aggregator;
use ngxreport_core::log::{LineReader, LogFileRef, parse_line, select_log_files};
use ngxreport_core::report::{ReportWriter, Template};
use ngxreport_core::{Config, Error};
use std::path::PathBuf;

/// Flags that change which logs a run looks at
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Consider only the newest log in the directory
    pub latest_only: bool,
}

/// Config values resolved to their typed form
#[derive(Debug, Clone)]
pub struct Settings {
    pub log_dir: PathBuf,
    pub report_dir: PathBuf,
    pub report_template: PathBuf,
    pub report_size: usize,
    pub error_threshold: f64,
}

impl Settings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            log_dir: config.log_dir(),
            report_dir: config.report_dir(),
            report_template: config.report_template(),
            report_size: config.report_size()?,
            error_threshold: config.error_threshold()?,
        })
    }

    pub fn report_path(&self, log_file: &LogFileRef) -> PathBuf {
        ReportWriter::report_path(&self.report_dir, log_file.date)
    }
}

/// What happened to one log file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// A report for this log already existed
    Skipped(PathBuf),
    /// A new report was written to this path
    Written(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_selected: usize,
    pub files_skipped: usize,
    pub reports_written: usize,
}

/// Write a report for every selected log that does not have one yet.
///
/// Stops at the first log whose share of unparseable lines exceeds the
/// configured threshold.
pub fn execute(config: &Config, options: &RunOptions) -> Result<RunSummary> {
    let settings = Settings::from_config(config).context("Invalid configuration")?;

    tracing::debug!("Looking for logs in {}", settings.log_dir.display());

    let selection = select_log_files(&settings.log_dir).with_context(|| {
        format!(
            "Failed to select log files in {}",
            settings.log_dir.display()
        )
    })?;
    let files: Vec<LogFileRef> = if options.latest_only {
        selection.latest().into_iter().collect()
    } else {
        selection.collect()
    };

    let mut summary = RunSummary {
        files_selected: files.len(),
        ..RunSummary::default()
    };

    let pending: Vec<&LogFileRef> = files
        .iter()
        .filter(|file| {
            let done = settings.report_path(file).exists();
            if done {
                log_skip(file);
                summary.files_skipped += 1;
            }
            !done
        })
        .collect();

    if pending.is_empty() {
        return Ok(summary);
    }

    let template = Template::from_file(&settings.report_template).with_context(|| {
        format!(
            "Failed to load template {}",
            settings.report_template.display()
        )
    })?;

    for file in pending {
        let outcome = process_file(file, &template, &settings)
            .with_context(|| format!("Failed to process {}", file.path.display()))?;
        match outcome {
            FileOutcome::Written(_) => summary.reports_written += 1,
            FileOutcome::Skipped(_) => summary.files_skipped += 1,
        }
    }

    Ok(summary)
}

/// Parse one log, check its error rate and write its report
pub fn process_file(
    log_file: &LogFileRef,
    template: &Template,
    settings: &Settings,
) -> Result<FileOutcome> {
    let report_path = settings.report_path(log_file);
    if report_path.exists() {
        log_skip(log_file);
        return Ok(FileOutcome::Skipped(report_path));
    }

    tracing::info!("Processing {}", log_file.path.display());

    let mut aggregator = Aggregator::new();
    for line in LineReader::open(log_file)? {
        aggregator.observe(parse_line(&line?));
    }

    let rate = aggregator.error_rate();
    tracing::debug!(
        "{}: {} lines, {} unparseable ({}%), {} urls",
        log_file.path.display(),
        aggregator.total_lines(),
        aggregator.error_count(),
        rate,
        aggregator.url_count()
    );

    if rate > settings.error_threshold {
        return Err(Error::ErrorThresholdExceeded {
            path: log_file.path.clone(),
            rate,
            threshold: settings.error_threshold,
        }
        .into());
    }

    let rows = aggregator.into_rows(settings.report_size);
    let html = ReportWriter::render(template, &rows)?;
    ReportWriter::to_file(&report_path, &html)?;

    Ok(FileOutcome::Written(report_path))
}

fn log_skip(log_file: &LogFileRef) {
    tracing::info!(
        "Report for {} already exists, skipping",
        log_file.path.display()
    );
}
