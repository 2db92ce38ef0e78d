//! Directory tree copy as a prepare/copy-file job graph on the fan-out pool.

use anyhow::{Context, Result, bail};
use log::{debug, error, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::engine::hashing::same_content;
use crate::engine::pool::{FanOutPool, Next, TaskResult};
use crate::engine::tools::path_relative_to;
use crate::utils::config::{CopyTiers, WorkerDefaults};
use crate::{CopyOpts, CopyReport, EntryKind};

use super::chunked::copy_large_file;

/// One unit of tree-copy work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CopyJob {
    /// Create `dst_dir`, list `src_dir` and emit its children as jobs.
    Prepare { src_dir: PathBuf, dst_dir: PathBuf },
    CopyFile { src: PathBuf, dst: PathBuf },
}

/// What a finished job hands back to the consumer.
#[derive(Debug)]
pub enum CopyOutcome {
    Prepared {
        dir_created: bool,
        jobs: Vec<CopyJob>,
        symlinks: Vec<PathBuf>,
    },
    Copied {
        bytes: u64,
    },
}

/// Maps source paths under one base onto the destination root.
#[derive(Clone, Debug)]
pub struct TreePlan {
    pub source_base: PathBuf,
    pub dest_root: PathBuf,
}

impl TreePlan {
    /// Base comes from the first existing source: a file's parent, or the directory itself.
    pub fn from_sources(sources: &[PathBuf], dest_root: &Path) -> Result<Self> {
        let Some((first, meta)) = sources
            .iter()
            .find_map(|s| fs::metadata(s).ok().map(|m| (s, m)))
        else {
            bail!("none of the {} sources exist", sources.len());
        };
        let source_base = if meta.is_dir() {
            first.clone()
        } else {
            first
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        };
        Ok(Self {
            source_base,
            dest_root: dest_root.to_path_buf(),
        })
    }

    /// `dest_root / relative(source_base, src_dir)`.
    pub fn dest_dir(&self, src_dir: &Path) -> PathBuf {
        match path_relative_to(src_dir, &self.source_base) {
            Some(rel) => self.dest_root.join(rel),
            None => {
                warn!(
                    "{} is outside source base {}; copying into {}",
                    src_dir.display(),
                    self.source_base.display(),
                    self.dest_root.display()
                );
                self.dest_root.clone()
            }
        }
    }

    pub fn dest_file(&self, src: &Path) -> PathBuf {
        let dir = self.dest_dir(src.parent().unwrap_or_else(|| Path::new("")));
        match src.file_name() {
            Some(name) => dir.join(name),
            None => dir,
        }
    }

    /// Initial job for one source argument, or None when it is missing or unsupported.
    pub fn seed(&self, src: &Path) -> Option<CopyJob> {
        let meta = match fs::symlink_metadata(src) {
            Ok(m) => m,
            Err(e) => {
                warn!("skipping {}: {}", src.display(), e);
                return None;
            }
        };
        match EntryKind::from_file_type(&meta.file_type()) {
            EntryKind::Dir => Some(CopyJob::Prepare {
                src_dir: src.to_path_buf(),
                dst_dir: self.dest_dir(src),
            }),
            EntryKind::File => Some(CopyJob::CopyFile {
                src: src.to_path_buf(),
                dst: self.dest_file(src),
            }),
            _ => {
                println!("Skipping non-regular source: {}", src.display());
                None
            }
        }
    }
}

/// Settings every copy worker reads.
#[derive(Clone, Debug)]
struct CopyContext {
    timeout: Duration,
    verify: bool,
}

fn execute(ctx: &CopyContext, job: CopyJob) -> Result<CopyOutcome> {
    match job {
        CopyJob::Prepare { src_dir, dst_dir } => prepare_dir(&src_dir, &dst_dir),
        CopyJob::CopyFile { src, dst } => {
            copy_file(ctx, &src, &dst).map(|bytes| CopyOutcome::Copied { bytes })
        }
    }
}

fn prepare_dir(src_dir: &Path, dst_dir: &Path) -> Result<CopyOutcome> {
    let dir_created = !dst_dir.is_dir();
    fs::create_dir_all(dst_dir).with_context(|| format!("create {}", dst_dir.display()))?;

    let mut jobs = Vec::new();
    let mut symlinks = Vec::new();
    let iter = fs::read_dir(src_dir).with_context(|| format!("list {}", src_dir.display()))?;
    for entry in iter {
        let entry = entry.with_context(|| format!("list {}", src_dir.display()))?;
        let path = entry.path();
        let ft = entry
            .file_type()
            .with_context(|| format!("stat {}", path.display()))?;
        match EntryKind::from_file_type(&ft) {
            EntryKind::Dir => jobs.push(CopyJob::Prepare {
                dst_dir: dst_dir.join(entry.file_name()),
                src_dir: path,
            }),
            EntryKind::File => jobs.push(CopyJob::CopyFile {
                dst: dst_dir.join(entry.file_name()),
                src: path,
            }),
            EntryKind::Symlink => symlinks.push(path),
            EntryKind::Pipe | EntryKind::Other => debug!("not copying {}", path.display()),
        }
    }
    Ok(CopyOutcome::Prepared {
        dir_created,
        jobs,
        symlinks,
    })
}

fn copy_file(ctx: &CopyContext, src: &Path, dst: &Path) -> Result<u64> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let size = fs::metadata(src)
        .with_context(|| format!("stat {}", src.display()))?
        .len();
    let bytes = if size < CopyTiers::CHUNKED_THRESHOLD {
        fs::copy(src, dst)
            .with_context(|| format!("copy {} -> {}", src.display(), dst.display()))?
    } else {
        copy_large_file(src, dst, ctx.timeout)?
    };
    if ctx.verify && !same_content(src, dst)? {
        bail!("checksum mismatch: {} -> {}", src.display(), dst.display());
    }
    Ok(bytes)
}

/// Copy every source under `dest_root`. Job failures are logged and counted in
/// [`CopyReport::failures`]; sibling jobs keep running.
pub fn copy_tree(sources: &[PathBuf], dest_root: &Path, opts: &CopyOpts) -> Result<CopyReport> {
    let plan = TreePlan::from_sources(sources, dest_root)?;
    let workers = WorkerDefaults::current().resolve(opts.workers);
    debug!(
        "copy: base={} dest={} workers={}",
        plan.source_base.display(),
        plan.dest_root.display(),
        workers
    );

    let ctx = Arc::new(CopyContext {
        timeout: opts.timeout,
        verify: opts.verify,
    });
    let worker_ctx = Arc::clone(&ctx);
    let mut pool = FanOutPool::new(workers, move |job: CopyJob| execute(&worker_ctx, job));

    let mut report = CopyReport::default();
    let start = Instant::now();
    for src in sources {
        match plan.seed(src) {
            Some(job) => pool.submit(job)?,
            None => report.failures += 1,
        }
    }

    loop {
        match pool.await_next()? {
            Next::Drained => break,
            Next::Result(TaskResult::Completed(Ok(CopyOutcome::Prepared {
                dir_created,
                jobs,
                symlinks,
            }))) => {
                report.dirs_created += u64::from(dir_created);
                for link in symlinks {
                    println!("Skipping symlink: {}", link.display());
                    report.symlinks_skipped += 1;
                }
                for job in jobs {
                    pool.submit(job)?;
                }
            }
            Next::Result(TaskResult::Completed(Ok(CopyOutcome::Copied { bytes }))) => {
                report.files_copied += 1;
                report.bytes_copied += bytes;
            }
            Next::Result(TaskResult::Completed(Err(e))) => {
                error!("{:#}", e);
                report.failures += 1;
            }
            Next::Result(TaskResult::Failed(msg)) => {
                error!("copy job panicked: {}", msg);
                report.failures += 1;
            }
        }
    }

    pool.shutdown()?;
    report.elapsed = start.elapsed();
    Ok(report)
}
