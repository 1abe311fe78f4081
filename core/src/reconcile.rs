use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use walkdir::{DirEntry, WalkDir};

use crate::digest::digest_file;
use crate::error::SyncError;
use crate::report::{SyncAction, SyncReport};

/// One-way reconciliation of a replica tree against a source tree.
///
/// `sync` runs in two passes: first every source entry is propagated
/// into the replica (folders created, files copied when absent or when
/// content digests differ), then every replica entry without a source
/// counterpart is removed. A per-entry failure is recorded in the
/// report and the walk continues with siblings; only an unavailable
/// source root aborts the call.
pub struct Reconciler {
    source_root: PathBuf,
    replica_root: PathBuf,
}

impl Reconciler {
    pub fn new(source_root: impl Into<PathBuf>, replica_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            replica_root: replica_root.into(),
        }
    }

    /// Bring the replica tree into agreement with the source tree.
    /// Never writes anything under the source root.
    pub fn sync(&self) -> Result<SyncReport, SyncError> {
        if !self.source_root.is_dir() {
            return Err(SyncError::SourceUnavailable(self.source_root.clone()));
        }

        let mut report = SyncReport::new();
        if !self.replica_root.is_dir() {
            fs::create_dir_all(&self.replica_root)
                .map_err(|error| SyncError::Write(self.replica_root.clone(), error))?;
            log::info!("Created replica folder {}", self.replica_root.display());
        }

        self.propagate(&mut report);
        self.prune(&mut report);
        Ok(report)
    }

    /// Pass 1: walk the source top-down (parents before children) and
    /// create or overwrite replica entries.
    fn propagate(&self, report: &mut SyncReport) {
        for entry in WalkDir::new(&self.source_root).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    let path = error
                        .path()
                        .unwrap_or(&self.source_root)
                        .to_path_buf();
                    log::error!("Unable to walk {}: {}", path.display(), error);
                    report.push_failure(path.clone(), SyncError::Read(path, error.into()));
                    continue;
                }
            };
            let relative_path = match entry.path().strip_prefix(&self.source_root) {
                Ok(relative_path) => relative_path.to_path_buf(),
                Err(_) => continue,
            };
            if entry.path_is_symlink() {
                log::warn!("Ignoring symlink {}", entry.path().display());
                continue;
            }
            if let Err(error) = self.propagate_entry(&entry, &relative_path, report) {
                log::error!("Sync of {} failed: {}", relative_path.display(), error);
                report.push_failure(relative_path, error);
            }
        }
    }

    fn propagate_entry(
        &self,
        entry: &DirEntry,
        relative_path: &Path,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let target = self.replica_root.join(relative_path);
        let target_kind = match fs::symlink_metadata(&target) {
            Ok(metadata) => Some(metadata.file_type()),
            Err(_) => None,
        };

        if entry.file_type().is_dir() {
            match target_kind {
                Some(kind) if kind.is_dir() => return Ok(()),
                Some(_) => {
                    // A file sits where the source has a folder
                    fs::remove_file(&target).map_err(|error| {
                        SyncError::Conflict(relative_path.to_path_buf(), error)
                    })?;
                    report.push_action(SyncAction::FileDeleted(relative_path.to_path_buf()));
                }
                None => {}
            }
            fs::create_dir_all(&target)
                .map_err(|error| SyncError::Write(target.clone(), error))?;
            report.push_action(SyncAction::DirectoryCreated(relative_path.to_path_buf()));
            return Ok(());
        }

        if entry.file_type().is_file() {
            match target_kind {
                Some(kind) if kind.is_dir() => {
                    // A folder sits where the source has a file
                    fs::remove_dir_all(&target).map_err(|error| {
                        SyncError::Conflict(relative_path.to_path_buf(), error)
                    })?;
                    report.push_action(SyncAction::DirectoryDeleted(relative_path.to_path_buf()));
                }
                Some(kind) if kind.is_symlink() => {
                    fs::remove_file(&target).map_err(|error| {
                        SyncError::Conflict(relative_path.to_path_buf(), error)
                    })?;
                    report.push_action(SyncAction::FileDeleted(relative_path.to_path_buf()));
                }
                Some(_) => {
                    if digest_file(entry.path())? == digest_file(&target)? {
                        return Ok(());
                    }
                }
                None => {}
            }
            self.copy_file(entry.path(), &target)?;
            report.push_action(SyncAction::FileCopied(relative_path.to_path_buf()));
            return Ok(());
        }

        log::warn!("Ignoring special entry {}", entry.path().display());
        Ok(())
    }

    fn copy_file(&self, source: &Path, target: &Path) -> Result<(), SyncError> {
        fs::copy(source, target)
            .map_err(|error| SyncError::Write(target.to_path_buf(), error))?;
        // Best effort: a failed metadata replication is not a sync failure
        if let Err(error) = replicate_metadata(source, target) {
            log::debug!(
                "Unable to replicate metadata on {}: {:#}",
                target.display(),
                error
            );
        }
        Ok(())
    }

    /// Pass 2: walk the replica and remove everything without a source
    /// counterpart. A source-absent folder is removed with its whole
    /// remaining subtree as one action; its descendants are skipped.
    fn prune(&self, report: &mut SyncReport) {
        let mut walker = WalkDir::new(&self.replica_root).min_depth(1).into_iter();
        loop {
            let entry = match walker.next() {
                None => break,
                Some(Ok(entry)) => entry,
                Some(Err(error)) => {
                    let path = error
                        .path()
                        .unwrap_or(&self.replica_root)
                        .to_path_buf();
                    log::error!("Unable to walk {}: {}", path.display(), error);
                    report.push_failure(path.clone(), SyncError::Read(path, error.into()));
                    continue;
                }
            };
            let relative_path = match entry.path().strip_prefix(&self.replica_root) {
                Ok(relative_path) => relative_path.to_path_buf(),
                Err(_) => continue,
            };
            if self.source_root.join(&relative_path).exists() {
                continue;
            }

            let removal = if entry.file_type().is_dir() {
                walker.skip_current_dir();
                fs::remove_dir_all(entry.path())
                    .map(|_| SyncAction::DirectoryDeleted(relative_path.clone()))
            } else {
                fs::remove_file(entry.path())
                    .map(|_| SyncAction::FileDeleted(relative_path.clone()))
            };
            match removal {
                Ok(action) => report.push_action(action),
                // Already gone counts as removed
                Err(error) if error.kind() == io::ErrorKind::NotFound => {
                    log::debug!("{} was already absent", relative_path.display())
                }
                Err(error) => {
                    let error = SyncError::Write(entry.path().to_path_buf(), error);
                    log::error!("Removal of {} failed: {}", relative_path.display(), error);
                    report.push_failure(relative_path, error);
                }
            }
        }
    }
}

fn replicate_metadata(source: &Path, target: &Path) -> Result<()> {
    let metadata = source
        .metadata()
        .context(format!("Read metadata of {}", source.display()))?;
    fs::set_permissions(target, metadata.permissions())
        .context(format!("Set permissions of {}", target.display()))?;
    let modified = metadata
        .modified()
        .context(format!("Read mtime of {}", source.display()))?;
    let target_file = fs::OpenOptions::new()
        .write(true)
        .open(target)
        .context(format!("Open {}", target.display()))?;
    target_file
        .set_modified(modified)
        .context(format!("Set mtime of {}", target.display()))?;
    Ok(())
}
