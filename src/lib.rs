//! Parafs: parallel file system tools (profile, find, top-N, copy, sparse files)

pub mod copy;
pub mod engine;
pub mod find;
pub mod pipeline;
pub mod sparse;
pub mod stats;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;
use std::path::{Path, PathBuf};

/// Result alias used by public parafs API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Walk `root` on a fan-out pool and return the aggregate. `find` matches are printed to
/// stdout as they are found.
pub fn walk_dir(root: &Path, opts: &WalkOpts) -> Result<WalkStat> {
    walk_dir_with(root, opts, |p| println!("{}", p.display()))
}

/// Same as [`walk_dir`] but every `find` match goes to `on_match` (called on the consumer
/// thread, before the match is deleted when `delete` is set). Keep it fast.
pub fn walk_dir_with<F>(root: &Path, opts: &WalkOpts, on_match: F) -> Result<WalkStat>
where
    F: FnMut(&Path),
{
    debug!(
        "{} WALK CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    pipeline::run_walk(root, opts, on_match)
}

/// Copy `sources` into the directory `dest_root`, which must already exist.
///
/// Directory sources are copied as a prepare/copy-file job graph; large files inside are
/// split into concurrent byte ranges. Per-job failures don't stop the run: check
/// [`CopyReport::failures`].
pub fn copy_paths(sources: &[PathBuf], dest_root: &Path, opts: &CopyOpts) -> Result<CopyReport> {
    debug!(
        "{} COPY CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    copy::copy_tree(sources, dest_root, opts)
}

/// Worker count used when none is requested (logical CPUs).
pub fn default_workers() -> usize {
    utils::WorkerDefaults::current().resolve(None)
}
