//! Single-file copy split into contiguous byte ranges, one thread per range.

use anyhow::{Context, Result, bail};
use crossbeam_channel::{RecvTimeoutError, unbounded};
use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::utils::config::CopyTiers;
use crate::utils::fd_limit::cap_workers_by_fd_limit;

/// Worker count from the size tier table.
pub fn workers_for_size(size: u64) -> usize {
    if size < CopyTiers::SMALL_LIMIT {
        return CopyTiers::SMALL_WORKERS;
    }
    CopyTiers::TIERS
        .iter()
        .find(|(limit, _)| size <= *limit)
        .map_or(CopyTiers::MAX_WORKERS, |(_, n)| *n)
}

/// `(offset, len)` ranges: `workers` equal chunks, plus one more for any remainder.
/// Files smaller than `workers` bytes become a single range.
pub fn plan_chunks(size: u64, workers: usize) -> Vec<(u64, u64)> {
    if size == 0 {
        return Vec::new();
    }
    let n = workers.max(1) as u64;
    let chunk = size / n;
    if chunk == 0 {
        return vec![(0, size)];
    }
    let mut ranges: Vec<(u64, u64)> = (0..n).map(|i| (i * chunk, chunk)).collect();
    let rem = size - chunk * n;
    if rem > 0 {
        ranges.push((chunk * n, rem));
    }
    ranges
}

/// Copy `src` to `dst` with a tier-sized worker count capped by the FD limit.
pub fn copy_large_file(src: &Path, dst: &Path, timeout: Duration) -> Result<u64> {
    let size = fs::metadata(src)
        .with_context(|| format!("stat {}", src.display()))?
        .len();
    let workers = cap_workers_by_fd_limit(workers_for_size(size), CopyTiers::FDS_PER_WORKER);
    copy_file_chunked(src, dst, workers, timeout)
}

/// Copy `src` to `dst` using `workers` concurrent range copies. Any chunk error, or the
/// deadline passing before every chunk reports, aborts the copy. Finished chunks stay on
/// disk; running ones stop at their next read.
pub fn copy_file_chunked(src: &Path, dst: &Path, workers: usize, timeout: Duration) -> Result<u64> {
    let size = fs::metadata(src)
        .with_context(|| format!("stat {}", src.display()))?
        .len();

    // Pre-size the destination so every worker can open and seek independently.
    let out = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dst)
        .with_context(|| format!("create {}", dst.display()))?;
    out.set_len(size)
        .with_context(|| format!("size {}", dst.display()))?;
    drop(out);

    let ranges = plan_chunks(size, workers);
    if ranges.is_empty() {
        return Ok(0);
    }
    debug!(
        "chunked copy {} -> {}: {} bytes in {} ranges",
        src.display(),
        dst.display(),
        size,
        ranges.len()
    );

    let abort = Arc::new(AtomicBool::new(false));
    let (tx, rx) = unbounded::<(u64, Result<u64>)>();
    for &(offset, len) in &ranges {
        let tx = tx.clone();
        let abort = Arc::clone(&abort);
        let src: PathBuf = src.to_path_buf();
        let dst: PathBuf = dst.to_path_buf();
        thread::spawn(move || {
            let r = copy_range(&src, &dst, offset, len, &abort);
            let _ = tx.send((offset, r));
        });
    }
    drop(tx);

    let deadline = Instant::now() + timeout;
    let mut copied = 0u64;
    for _ in 0..ranges.len() {
        let wait = deadline
            .checked_duration_since(Instant::now())
            .filter(|w| !w.is_zero());
        let received = match wait {
            Some(wait) => rx.recv_timeout(wait),
            None => Err(RecvTimeoutError::Timeout),
        };
        match received {
            Ok((_, Ok(n))) => copied += n,
            Ok((offset, Err(e))) => {
                abort.store(true, Ordering::Relaxed);
                return Err(e.context(format!(
                    "chunk at offset {} of {}",
                    offset,
                    src.display()
                )));
            }
            Err(RecvTimeoutError::Timeout) => {
                abort.store(true, Ordering::Relaxed);
                bail!("copy of {} timed out after {:?}", src.display(), timeout)
            }
            Err(RecvTimeoutError::Disconnected) => {
                abort.store(true, Ordering::Relaxed);
                bail!("chunk worker for {} exited without reporting", src.display())
            }
        }
    }
    Ok(copied)
}

/// Copy exactly `len` bytes at `offset` using private handles on both files.
/// Stops with an error once `abort` is set.
pub fn copy_range(
    src: &Path,
    dst: &Path,
    offset: u64,
    len: u64,
    abort: &AtomicBool,
) -> Result<u64> {
    let mut input = File::open(src).with_context(|| format!("open {}", src.display()))?;
    input.seek(SeekFrom::Start(offset))?;
    let mut output = OpenOptions::new()
        .write(true)
        .open(dst)
        .with_context(|| format!("open {}", dst.display()))?;
    output.seek(SeekFrom::Start(offset))?;

    let mut buf = vec![0u8; CopyTiers::RANGE_BUF.min(len as usize)];
    let mut done = 0u64;
    while done < len {
        if abort.load(Ordering::Relaxed) {
            bail!("aborted at offset {}", offset + done);
        }
        let want = buf.len().min((len - done) as usize);
        let n = match input.read(&mut buf[..want]) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).with_context(|| format!("read {}", src.display())),
        };
        if n == 0 {
            bail!("short copy: {} of {} bytes", done, len);
        }
        output.write_all(&buf[..n])?;
        done += n as u64;
    }
    Ok(done)
}
