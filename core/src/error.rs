use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Source folder {0} does not exist or is not a readable directory")]
    SourceUnavailable(PathBuf),
    #[error("Unable to read {0}: {1}")]
    Read(PathBuf, io::Error),
    #[error("Unable to write {0}: {1}")]
    Write(PathBuf, io::Error),
    #[error("Conflicting entry kind at {0}, unable to replace: {1}")]
    Conflict(PathBuf, io::Error),
}
