//! Public and internal types for the parafs API and pipeline.

use std::fs::FileType;
use std::path::PathBuf;
use std::time::Duration;

use crate::find::FindControl;
use crate::stats::{Histogram, TopN};
use crate::utils::config::{CopyTiers, DEFAULT_HIST_BINS};

/// Entry classification used by the walker and `find`. Anything that is not a regular file,
/// directory, symlink or named pipe is `Other` and ignored by the counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Pipe,
    Other,
}

impl EntryKind {
    /// Classify from an un-followed file type (`symlink_metadata` / `DirEntry::file_type`).
    pub fn from_file_type(ft: &FileType) -> Self {
        if ft.is_symlink() {
            return EntryKind::Symlink;
        }
        if ft.is_dir() {
            return EntryKind::Dir;
        }
        if ft.is_file() {
            return EntryKind::File;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if ft.is_fifo() {
                return EntryKind::Pipe;
            }
        }
        EntryKind::Other
    }
}

/// Options for [`walk_dir`](crate::walk_dir).
#[derive(Clone, Debug, Default)]
pub struct WalkOpts {
    /// Worker thread count. When None, one per logical CPU.
    pub workers: Option<usize>,
    /// Directories never descended into (exact path match).
    pub exclude: Vec<PathBuf>,
    /// Histogram bucket boundaries (see [`parse_bins`](crate::stats::parse_bins)). None disables the histogram.
    pub hist_bins: Option<Vec<u64>>,
    /// Probe every regular file for holes.
    pub sparse: bool,
    /// Capacity of the largest-files tracker. 0 disables it.
    pub top_files: usize,
    /// Capacity of the most-entries directory tracker. 0 disables it.
    pub top_dirs: usize,
    /// Report logical length instead of allocated size.
    pub apparent: bool,
    /// Filters for `find`. When None nothing is matched.
    pub find: Option<FindControl>,
    /// Show a live counter on stderr.
    pub progress: bool,
}

/// Run-wide aggregate produced by a walk. Only the consumer thread mutates it.
#[derive(Clone, Debug)]
pub struct WalkStat {
    pub root: PathBuf,
    pub workers: usize,
    pub files: u64,
    /// Directories below the root.
    pub dirs: u64,
    pub symlinks: u64,
    pub pipes: u64,
    pub sparse_files: u64,
    /// Unreadable directories plus entries whose metadata or sparse probe failed.
    pub skipped: u64,
    pub total_file_size: u64,
    pub max_file_size: u64,
    pub matched: u64,
    pub deleted: u64,
    pub histogram: Option<Histogram>,
    pub top_files: TopN,
    pub top_dirs: TopN,
    pub elapsed: Duration,
}

impl WalkStat {
    pub fn new(root: PathBuf, workers: usize) -> Self {
        Self {
            root,
            workers,
            files: 0,
            dirs: 0,
            symlinks: 0,
            pipes: 0,
            sparse_files: 0,
            skipped: 0,
            total_file_size: 0,
            max_file_size: 0,
            matched: 0,
            deleted: 0,
            histogram: None,
            top_files: TopN::new(0),
            top_dirs: TopN::new(0),
            elapsed: Duration::ZERO,
        }
    }

    /// Files plus directories seen.
    pub fn scanned(&self) -> u64 {
        self.files + self.dirs
    }

    /// Scanned entries per second.
    pub fn rate(&self) -> u64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0;
        }
        (self.scanned() as f64 / secs) as u64
    }

    pub fn avg_file_size(&self) -> u64 {
        self.total_file_size.checked_div(self.files).unwrap_or(0)
    }

    /// Average number of files per directory, or None for a flat tree.
    pub fn avg_dir_entries(&self) -> Option<u64> {
        self.files.checked_div(self.dirs)
    }
}

/// Options for [`copy_paths`](crate::copy_paths).
#[derive(Clone, Debug)]
pub struct CopyOpts {
    /// Tree-copy worker count. When None, one per logical CPU.
    pub workers: Option<usize>,
    /// Deadline for each chunked single-file copy.
    pub timeout: Duration,
    /// Compare blake3 checksums of source and destination after each file.
    pub verify: bool,
}

impl Default for CopyOpts {
    fn default() -> Self {
        Self {
            workers: None,
            timeout: CopyTiers::DEFAULT_TIMEOUT,
            verify: false,
        }
    }
}

/// Totals from a copy run.
#[derive(Clone, Debug, Default)]
pub struct CopyReport {
    pub files_copied: u64,
    pub bytes_copied: u64,
    pub dirs_created: u64,
    pub symlinks_skipped: u64,
    /// Jobs that failed (logged individually).
    pub failures: u64,
    pub elapsed: Duration,
}

/// Resolved CLI settings: defaults, then `.parafs.toml`, then flags.
#[derive(Clone, Debug)]
pub struct Settings {
    pub workers: Option<usize>,
    pub verbose: bool,
    pub exclude: Vec<PathBuf>,
    pub bins: String,
    pub apparent: bool,
    pub copy_timeout: Duration,
    pub verify: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: None,
            verbose: false,
            exclude: Vec::new(),
            bins: DEFAULT_HIST_BINS.to_string(),
            apparent: false,
            copy_timeout: CopyTiers::DEFAULT_TIMEOUT,
            verify: false,
        }
    }
}
