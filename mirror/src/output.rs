use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use mirror_core::report::SyncReport;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders each run's report as timestamped lines, duplicated to
/// standard output and an append mode log file.
pub struct ReportWriter {
    log_file_path: PathBuf,
}

impl ReportWriter {
    pub fn new(log_file_path: PathBuf) -> Self {
        Self { log_file_path }
    }

    pub fn write_run(&self, report: &SyncReport) -> Result<()> {
        let mut log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .context(format!(
                "Open log file {}",
                self.log_file_path.display()
            ))?;

        emit(
            &mut log_file,
            &format!(
                "\n[{}] Starting synchronization...",
                Local::now().format(TIMESTAMP_FORMAT)
            ),
        )?;
        for record in report.actions() {
            emit(
                &mut log_file,
                &format!(
                    "[{}] {}: {}",
                    record.timestamp.format(TIMESTAMP_FORMAT),
                    record.action.verb(),
                    record.action.path().display()
                ),
            )?;
        }
        for failure in report.failures() {
            emit(
                &mut log_file,
                &format!(
                    "[{}] Failed on {}: {}",
                    failure.timestamp.format(TIMESTAMP_FORMAT),
                    failure.path.display(),
                    failure.error
                ),
            )?;
        }
        emit(
            &mut log_file,
            &format!(
                "[{}] Synchronization completed.",
                Local::now().format(TIMESTAMP_FORMAT)
            ),
        )?;
        Ok(())
    }
}

fn emit(log_file: &mut impl Write, line: &str) -> Result<()> {
    println!("{}", line);
    writeln!(log_file, "{}", line).context("Write log line")?;
    Ok(())
}
