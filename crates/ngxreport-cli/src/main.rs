use anyhow::Result;
use clap::Parser;
use ngxreport_cli::commands::report::{self, RunOptions};
use ngxreport_core::Config;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

#[derive(Parser)]
#[command(name = "ngxreport")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Build HTML reports of the slowest endpoints from nginx access logs",
    long_about = "ngxreport scans a log directory for nginx-access-ui.log-YYYYMMDD[.gz] files, \
                  aggregates request times per url and writes report_YYYY.MM.DD.html for every \
                  log that has no report yet."
)]
struct Cli {
    /// Config file with `KEY: value` lines overriding the defaults
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Only process the newest log file
    #[arg(long)]
    latest: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_stdout_logging(cli.verbose);
            tracing::error!("Failed to load config: {}", e);
            return ExitCode::from(ngxreport_cli::EXIT_FAILURE);
        }
    };

    if let Some(log_file) = config.log_file() {
        if let Err(e) = init_file_logging(cli.verbose, &log_file) {
            init_stdout_logging(cli.verbose);
            tracing::error!("Failed to open log file {}: {}", log_file.display(), e);
            return ExitCode::from(ngxreport_cli::EXIT_FAILURE);
        }
    } else {
        init_stdout_logging(cli.verbose);
    }

    let options = RunOptions {
        latest_only: cli.latest,
    };

    match report::execute(&config, &options) {
        Ok(summary) => {
            tracing::info!(
                "Done: {} reports written, {} logs already reported",
                summary.reports_written,
                summary.files_skipped
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(ngxreport_cli::exit_code(&e))
        }
    }
}

fn env_filter(verbose: bool) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    if verbose {
        EnvFilter::new("ngxreport=debug,ngxreport_cli=debug,ngxreport_core=debug")
    } else {
        EnvFilter::new("ngxreport=info,ngxreport_cli=info,ngxreport_core=info")
    }
}

fn timer() -> tracing_subscriber::fmt::time::ChronoLocal {
    tracing_subscriber::fmt::time::ChronoLocal::new("%Y.%m.%d %H:%M:%S".to_string())
}

fn init_stdout_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(false)
        .with_timer(timer())
        .with_writer(std::io::stdout)
        .init();
}

fn init_file_logging(verbose: bool, path: &Path) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(false)
        .with_ansi(false)
        .with_timer(timer())
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}
