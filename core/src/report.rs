use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::SyncError;

/// One disk mutation applied to the replica tree. Paths are relative to
/// the tree roots. A `DirectoryDeleted` covers the directory's whole
/// remaining subtree, descendants are not reported individually.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    DirectoryCreated(PathBuf),
    FileCopied(PathBuf),
    FileDeleted(PathBuf),
    DirectoryDeleted(PathBuf),
}

impl SyncAction {
    pub fn path(&self) -> &Path {
        match self {
            SyncAction::DirectoryCreated(path)
            | SyncAction::FileCopied(path)
            | SyncAction::FileDeleted(path)
            | SyncAction::DirectoryDeleted(path) => path,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            SyncAction::DirectoryCreated(_) => "Created directory",
            SyncAction::FileCopied(_) => "Copied file",
            SyncAction::FileDeleted(_) => "Deleted file",
            SyncAction::DirectoryDeleted(_) => "Deleted directory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub action: SyncAction,
    pub timestamp: DateTime<Local>,
}

/// A per-entry error which did not abort the run.
#[derive(Debug)]
pub struct SyncFailure {
    pub path: PathBuf,
    pub error: SyncError,
    pub timestamp: DateTime<Local>,
}

/// Everything one synchronization run did to the replica, in apply order.
/// Built fresh on every run.
#[derive(Debug, Default)]
pub struct SyncReport {
    records: Vec<ActionRecord>,
    failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_action(&mut self, action: SyncAction) {
        self.records.push(ActionRecord {
            action,
            timestamp: Local::now(),
        });
    }

    pub fn push_failure(&mut self, path: PathBuf, error: SyncError) {
        self.failures.push(SyncFailure {
            path,
            error,
            timestamp: Local::now(),
        });
    }

    pub fn actions(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn failures(&self) -> &[SyncFailure] {
        &self.failures
    }

    /// True when the replica already matched the source.
    pub fn is_clean(&self) -> bool {
        self.records.is_empty() && self.failures.is_empty()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::*;

    use super::*;

    #[rstest]
    #[case(SyncAction::DirectoryCreated(PathBuf::from("a")), "Created directory")]
    #[case(SyncAction::FileCopied(PathBuf::from("a/b.txt")), "Copied file")]
    #[case(SyncAction::FileDeleted(PathBuf::from("b.txt")), "Deleted file")]
    #[case(SyncAction::DirectoryDeleted(PathBuf::from("b")), "Deleted directory")]
    fn action_verbs(#[case] action: SyncAction, #[case] expected_verb: &str) {
        assert_eq!(action.verb(), expected_verb);
    }

    #[test]
    fn fresh_report_is_clean() {
        let report = SyncReport::new();

        assert!(report.is_clean());
        assert!(report.actions().is_empty());
        assert!(report.failures().is_empty());
    }

    #[test]
    fn report_keeps_apply_order() {
        let mut report = SyncReport::new();
        report.push_action(SyncAction::DirectoryCreated(PathBuf::from("dir")));
        report.push_action(SyncAction::FileCopied(PathBuf::from("dir/a.txt")));

        let actions = report
            .actions()
            .iter()
            .map(|record| record.action.clone())
            .collect::<Vec<SyncAction>>();

        assert!(!report.is_clean());
        assert_eq!(
            actions,
            vec![
                SyncAction::DirectoryCreated(PathBuf::from("dir")),
                SyncAction::FileCopied(PathBuf::from("dir/a.txt")),
            ]
        );
    }
}
