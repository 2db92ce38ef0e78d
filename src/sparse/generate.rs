//! Sparse test-file generator.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::utils::config::{PackagePaths, SparseConsts};

use super::extent::ExtentInfo;
use super::punch::punch_hole;

/// `<file>.holemap` next to the generated file.
pub fn hole_map_path(path: &Path) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(".");
    s.push(PackagePaths::get().hole_map_suffix());
    PathBuf::from(s)
}

/// Write `holes` holes of one block each between data blocks, then punch them.
/// With `trailing_hole` the file ends in a hole instead of data. Returns the punched ranges;
/// with `debug` they are also written to [`hole_map_path`].
pub fn create_sparse_file(
    path: &Path,
    holes: usize,
    trailing_hole: bool,
    debug: bool,
) -> Result<Vec<ExtentInfo>> {
    let block = SparseConsts::GEN_BLOCK;
    let blocks = 2 * holes as u64 + u64::from(!trailing_hole);
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("create {}", path.display()))?;

    // Fill every block with data first so the holes come only from punching.
    let mut pattern = vec![0u8; block as usize];
    for i in 0..blocks {
        pattern.fill(b'a' + (i % 26) as u8);
        file.write_all(&pattern)
            .with_context(|| format!("write {}", path.display()))?;
    }
    file.sync_all()
        .with_context(|| format!("sync {}", path.display()))?;

    let punched: Vec<ExtentInfo> = (0..holes as u64)
        .map(|i| ExtentInfo::new((2 * i + 1) * block, block))
        .collect();
    for h in &punched {
        punch_hole(&file, h.logical, h.length)
            .with_context(|| format!("punch hole at {} in {}", h.logical, path.display()))?;
    }
    log::debug!(
        "created {} ({} blocks, {} holes)",
        path.display(),
        blocks,
        punched.len()
    );

    if debug {
        write_hole_map(&hole_map_path(path), &punched)?;
    }
    Ok(punched)
}

/// One line per hole: `offset = <n> \t len=<n>`.
pub fn write_hole_map(path: &Path, holes: &[ExtentInfo]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    for h in holes {
        writeln!(w, "offset = {} \t len={}", h.logical, h.length)?;
    }
    w.flush()
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
