use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use mirror_core::error::SyncError;
use mirror_core::reconcile::Reconciler;

use crate::context::Context;
use crate::output::ReportWriter;

const STOP_CHECK_PERIOD: Duration = Duration::from_millis(250);

/// Tick loop: synchronize, render the report, sleep until the next
/// tick. Runs until the stop signal is raised.
pub fn run(context: Context, stop_signal: Arc<AtomicBool>) -> Result<()> {
    log::info!(
        "Prepare to mirror {} onto {}",
        context.source_folder.display(),
        context.replica_folder.display()
    );
    let writer = ReportWriter::new(context.log_file_path.clone());
    let reconciler = Reconciler::new(&context.source_folder, &context.replica_folder);

    loop {
        match reconciler.sync() {
            Ok(report) => {
                if !report.failures().is_empty() {
                    log::warn!("{} entries failed during this run", report.failures().len());
                }
                if let Err(error) = writer.write_run(&report) {
                    log::error!("Unable to write report: {:#}", error);
                }
            }
            // Source may be transiently unavailable (removable drive),
            // keep the daemon alive and retry on the next tick
            Err(SyncError::SourceUnavailable(path)) => {
                log::error!(
                    "Source folder {} is unavailable, retry on next tick",
                    path.display()
                );
            }
            Err(error) => log::error!("Synchronization failed: {}", error),
        }

        if sleep_until_next_tick(context.interval, &stop_signal) {
            log::info!("Stop signal received");
            break;
        }
    }

    Ok(())
}

/// Sleep `interval` in short slices, watching the stop signal. Returns
/// true when the loop must stop.
fn sleep_until_next_tick(interval: Duration, stop_signal: &Arc<AtomicBool>) -> bool {
    let mut slept = Duration::ZERO;
    while slept < interval {
        if stop_signal.load(Ordering::Relaxed) {
            return true;
        }
        let slice = STOP_CHECK_PERIOD.min(interval - slept);
        thread::sleep(slice);
        slept += slice;
    }
    stop_signal.load(Ordering::Relaxed)
}

#[cfg(test)]
mod test {
    use std::time::Instant;

    use super::*;

    #[test]
    fn raised_stop_signal_interrupts_sleep() {
        let stop_signal = Arc::new(AtomicBool::new(true));

        let started = Instant::now();
        let stopped = sleep_until_next_tick(Duration::from_secs(60), &stop_signal);

        assert!(stopped);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn full_interval_elapses_without_stop() {
        let stop_signal = Arc::new(AtomicBool::new(false));

        let started = Instant::now();
        let stopped = sleep_until_next_tick(Duration::from_millis(300), &stop_signal);

        assert!(!stopped);
        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}
