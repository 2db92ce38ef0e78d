//! Walk context and the values passed between the consumer and scan workers.

use std::path::{Path, PathBuf};

use crate::EntryKind;
use crate::WalkOpts;
use crate::find::{FindControl, Predicate};
use crate::stats::TopN;

/// Read-only settings every scan worker sees. Built once per walk.
#[derive(Clone, Debug)]
pub struct WalkContext {
    /// Logical length instead of allocated size for every reported size.
    pub apparent: bool,
    /// Send each file size back for the histogram.
    pub collect_sizes: bool,
    /// Capacity of the per-directory largest-files tracker (0 = off).
    pub top_files: usize,
    pub sparse: bool,
    pub find: Option<FindControl>,
    /// AND of the active `find` filters; `Always` when `find` is None (and unused).
    pub predicate: Predicate,
}

impl WalkContext {
    pub fn from_opts(opts: &WalkOpts) -> Self {
        let apparent = opts.apparent || opts.find.as_ref().is_some_and(|f| f.apparent());
        let predicate = opts
            .find
            .as_ref()
            .map(FindControl::predicate)
            .unwrap_or(Predicate::Always);
        Self {
            apparent,
            collect_sizes: opts.hist_bins.is_some(),
            top_files: opts.top_files,
            sparse: opts.sparse,
            find: opts.find.clone(),
            predicate,
        }
    }

    /// Directories whose match is decided after their own scan (size filter active).
    pub fn defers_dirs(&self) -> bool {
        self.find
            .as_ref()
            .is_some_and(|f| f.defers(EntryKind::Dir))
    }
}

/// One pool job: scan a single directory.
#[derive(Clone, Debug)]
pub struct WalkJob {
    pub dir: PathBuf,
    /// Evaluate the deferred directory predicate against this directory once listed.
    pub evaluate_self: bool,
}

impl WalkJob {
    pub fn root(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            evaluate_self: false,
        }
    }

    pub fn child(dir: PathBuf, evaluate_self: bool) -> Self {
        Self { dir, evaluate_self }
    }
}

/// A matched path and its kind (decides how it is removed).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoundEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Outcome of listing one directory. Merged into [`WalkStat`](crate::WalkStat) by the consumer.
#[derive(Clone, Debug, Default)]
pub struct ScanResult {
    pub dir: PathBuf,
    /// False when the directory could not be listed.
    pub readable: bool,
    pub files: u64,
    pub dirs: u64,
    pub symlinks: u64,
    pub pipes: u64,
    /// Every direct entry, including kinds no counter tracks.
    pub entries: u64,
    pub sparse_files: u64,
    pub skipped: u64,
    pub file_size_agg: u64,
    pub file_size_max: u64,
    /// Sizes of regular files, only when the histogram is on.
    pub file_sizes: Vec<u64>,
    /// Largest files in this directory.
    pub largest: Option<TopN>,
    /// Subdirectories to scan next.
    pub subdirs: Vec<PathBuf>,
    /// Entries that passed the `find` predicate.
    pub matches: Vec<FoundEntry>,
    /// This directory itself passed the deferred predicate.
    pub self_match: bool,
    /// Paths that could not be read and why.
    pub errors: Vec<(PathBuf, String)>,
}

impl ScanResult {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            readable: true,
            ..Self::default()
        }
    }

    /// Result for a directory that could not be listed.
    pub fn unreadable(dir: PathBuf, msg: String) -> Self {
        let errors = vec![(dir.clone(), msg)];
        Self {
            dir,
            skipped: 1,
            errors,
            ..Self::default()
        }
    }
}
