//! Sparse-file extent model: hole/data probing, hole punching and extent-aware copy.

pub mod extent;
pub mod generate;
pub mod punch;

pub use extent::{
    ExtentInfo, extents, holes, is_sparse, is_sparse_file, next_data, next_hole, scan_extents,
    scan_holes,
};
pub use generate::{create_sparse_file, hole_map_path, write_hole_map};
pub use punch::punch_hole;

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Copy only the data extents of `src` into `dst`, leaving holes unallocated. A trailing
/// gap after the last extent is restored with `set_len` plus a punched hole. Returns bytes
/// written. Falls back to a plain copy where hole probing is unsupported.
pub fn extent_copy(src: &Path, dst: &Path) -> Result<u64> {
    let mut src_f = File::open(src).with_context(|| format!("open {}", src.display()))?;
    let len = src_f
        .metadata()
        .with_context(|| format!("stat {}", src.display()))?
        .len();

    let exts = match extents(&src_f) {
        Ok(e) => e,
        Err(e) if e.kind() == io::ErrorKind::Unsupported => {
            warn!("{}; plain copy of {}", e, src.display());
            return fs::copy(src, dst)
                .with_context(|| format!("copy {} -> {}", src.display(), dst.display()));
        }
        Err(e) => return Err(e).with_context(|| format!("scan extents of {}", src.display())),
    };

    let mut dst_f = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dst)
        .with_context(|| format!("create {}", dst.display()))?;

    let mut written = 0u64;
    for ext in &exts {
        src_f.seek(SeekFrom::Start(ext.logical))?;
        dst_f.seek(SeekFrom::Start(ext.logical))?;
        let n = io::copy(&mut (&mut src_f).take(ext.length), &mut dst_f)
            .with_context(|| format!("copy extent at {} of {}", ext.logical, src.display()))?;
        if n != ext.length {
            bail!(
                "short copy at offset {} of {}: {} of {} bytes",
                ext.logical,
                src.display(),
                n,
                ext.length
            );
        }
        written += n;
    }

    let last_end = exts.last().map_or(0, ExtentInfo::end);
    if last_end < len {
        dst_f
            .set_len(len)
            .with_context(|| format!("extend {}", dst.display()))?;
        if let Err(e) = punch_hole(&dst_f, last_end, len - last_end) {
            // set_len already left the tail unallocated on most filesystems.
            debug!("punch trailing hole in {}: {}", dst.display(), e);
        }
    }
    debug!(
        "extent copy {} -> {}: {} extents, {} bytes",
        src.display(),
        dst.display(),
        exts.len(),
        written
    );
    Ok(written)
}
