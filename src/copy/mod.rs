//! Parallel copy engine: chunked single-file copy and tree copy on the fan-out pool.

pub mod chunked;
pub mod tree;

pub use chunked::{copy_file_chunked, copy_large_file, copy_range, plan_chunks, workers_for_size};
pub use tree::{CopyJob, CopyOutcome, TreePlan, copy_tree};

use anyhow::{Context, Result, bail};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve the copy target: an existing file is an error, an existing directory is reused
/// with a warning, anything else is created. Returns the absolute path.
pub fn prepare_destination(dest: &Path) -> Result<PathBuf> {
    match fs::metadata(dest) {
        Ok(meta) if !meta.is_dir() => bail!("target exists as file: {}", dest.display()),
        Ok(_) => warn!("target exists as directory: {}", dest.display()),
        Err(_) => fs::create_dir_all(dest)
            .with_context(|| format!("can't create target dir: {}", dest.display()))?,
    }
    std::path::absolute(dest).with_context(|| format!("resolve {}", dest.display()))
}
