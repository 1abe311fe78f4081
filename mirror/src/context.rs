use std::path::PathBuf;
use std::time::Duration;

/// Resolved runtime configuration of the mirroring daemon.
#[derive(Debug, Clone)]
pub struct Context {
    pub source_folder: PathBuf,
    pub replica_folder: PathBuf,
    pub interval: Duration,
    pub log_file_path: PathBuf,
}

impl Context {
    pub fn new(
        source_folder: PathBuf,
        replica_folder: PathBuf,
        interval_seconds: u64,
        log_file_path: PathBuf,
    ) -> Self {
        Self {
            source_folder,
            replica_folder,
            interval: Duration::from_secs(interval_seconds),
            log_file_path,
        }
    }
}
