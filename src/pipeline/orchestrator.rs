//! Consumer side of a walk: seed the pool, merge results, resubmit subdirectories.

use anyhow::{Context, Result, bail};
use crossbeam_channel::{Receiver, tick};
use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::engine::pool::{FanOutPool, Next, TaskResult};
use crate::engine::progress::{create_counter, finish_counter, update_counter};
use crate::stats::{Histogram, TopItem, TopN};
use crate::utils::config::{ProgressConsts, WorkerDefaults};
use crate::{EntryKind, WalkOpts, WalkStat};

use super::context::{FoundEntry, ScanResult, WalkContext, WalkJob};
use super::error_handler::report_skipped_paths;
use super::walk::scan_dir;

/// Walk `root` with a fan-out pool. `on_match` sees every `find` match as it is found,
/// before any deletion.
pub fn run_walk<F>(root: &Path, opts: &WalkOpts, mut on_match: F) -> Result<WalkStat>
where
    F: FnMut(&Path),
{
    let meta = fs::metadata(root).with_context(|| format!("stat {}", root.display()))?;
    if !meta.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let workers = WorkerDefaults::current().resolve(opts.workers);
    let mut stat = WalkStat::new(root.to_path_buf(), workers);
    stat.histogram = opts.hist_bins.clone().map(Histogram::new).transpose()?;
    stat.top_files = TopN::new(opts.top_files);
    stat.top_dirs = TopN::new(opts.top_dirs);

    let ctx = Arc::new(WalkContext::from_opts(opts));
    let exclude = Exclusions::new(root, &opts.exclude)?;
    let delete = ctx.find.as_ref().is_some_and(|f| f.delete());
    let defer_dirs = ctx.defers_dirs();
    debug!(
        "walk: root={} workers={} excluded={} find={}",
        root.display(),
        workers,
        exclude.len(),
        ctx.find.is_some()
    );

    let worker_ctx = Arc::clone(&ctx);
    let mut pool = FanOutPool::new(workers, move |job: WalkJob| scan_dir(&worker_ctx, job));
    pool.submit(WalkJob::root(root))?;

    let ticker: Option<Receiver<Instant>> =
        opts.progress.then(|| tick(ProgressConsts::REPORT_INTERVAL));
    let mut bar = opts.progress.then(|| create_counter("Scanned"));
    let mut skipped_paths = Vec::new();
    let start = Instant::now();

    loop {
        let result = match pool.await_next()? {
            Next::Drained => break,
            Next::Result(TaskResult::Completed(r)) => r,
            Next::Result(TaskResult::Failed(msg)) => {
                warn!("scan job failed: {}", msg);
                stat.skipped += 1;
                continue;
            }
        };

        let removed = handle_matches(&result, delete, &mut stat, &mut on_match);
        skipped_paths.extend(result.errors.iter().cloned());
        let subdirs = merge_result(&mut stat, result, &removed);

        for dir in subdirs {
            if exclude.contains(&dir) {
                debug!("excluded: {}", dir.display());
                continue;
            }
            pool.submit(WalkJob::child(dir, defer_dirs))?;
        }

        if let (Some(t), Some(b)) = (&ticker, bar.as_mut())
            && t.try_recv().is_ok()
        {
            update_counter(b, stat.scanned(), stat.skipped);
        }
    }

    pool.shutdown()?;
    stat.elapsed = start.elapsed();
    if let Some(b) = bar.as_mut() {
        finish_counter(b, stat.scanned(), stat.skipped);
    }
    report_skipped_paths(stat.skipped, &skipped_paths);
    Ok(stat)
}

/// Excluded directories in canonical form. Subdirectories are mapped onto the canonical
/// root before lookup, so `.`, `..` or a relative root still match absolute entries.
struct Exclusions {
    root: PathBuf,
    canon_root: PathBuf,
    paths: HashSet<PathBuf>,
}

impl Exclusions {
    fn new(root: &Path, paths: &[PathBuf]) -> Result<Self> {
        let canon_root =
            fs::canonicalize(root).with_context(|| format!("resolve {}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
            canon_root,
            paths: paths.iter().map(|p| resolve_exclusion(p)).collect(),
        })
    }

    fn len(&self) -> usize {
        self.paths.len()
    }

    fn contains(&self, dir: &Path) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        // Children are never symlinks, so joining onto the canonical root is canonical.
        match dir.strip_prefix(&self.root) {
            Ok(rel) => self.paths.contains(&self.canon_root.join(rel)),
            Err(_) => self.paths.contains(dir),
        }
    }
}

/// Entries that don't exist yet can't be canonicalized; keep them absolute.
fn resolve_exclusion(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Report matches, deleting them when asked. Returns the directories that were removed.
fn handle_matches<F>(
    result: &ScanResult,
    delete: bool,
    stat: &mut WalkStat,
    on_match: &mut F,
) -> HashSet<PathBuf>
where
    F: FnMut(&Path),
{
    let mut removed = HashSet::new();
    let self_match = result.self_match.then(|| FoundEntry {
        path: result.dir.clone(),
        kind: EntryKind::Dir,
    });

    for found in result.matches.iter().chain(self_match.iter()) {
        stat.matched += 1;
        on_match(&found.path);
        if !delete {
            continue;
        }
        match remove_entry(found) {
            Ok(()) => {
                stat.deleted += 1;
                if found.kind == EntryKind::Dir {
                    removed.insert(found.path.clone());
                }
            }
            Err(e) => warn!("failed to delete {}: {:#}", found.path.display(), e),
        }
    }
    removed
}

fn remove_entry(found: &FoundEntry) -> Result<()> {
    match found.kind {
        EntryKind::Dir => fs::remove_dir_all(&found.path),
        _ => fs::remove_file(&found.path),
    }
    .with_context(|| format!("remove {}", found.path.display()))
}

/// Fold one directory's counts into the run totals. Returns subdirectories still to scan.
fn merge_result(stat: &mut WalkStat, res: ScanResult, removed: &HashSet<PathBuf>) -> Vec<PathBuf> {
    stat.files += res.files;
    stat.dirs += res.dirs;
    stat.symlinks += res.symlinks;
    stat.pipes += res.pipes;
    stat.sparse_files += res.sparse_files;
    stat.skipped += res.skipped;
    stat.total_file_size += res.file_size_agg;
    stat.max_file_size = stat.max_file_size.max(res.file_size_max);

    if let Some(hist) = stat.histogram.as_mut() {
        for sz in &res.file_sizes {
            hist.insert(*sz);
        }
    }
    if let Some(largest) = res.largest {
        for item in largest.into_items() {
            stat.top_files.put(item);
        }
    }
    if res.readable && stat.top_dirs.capacity() > 0 {
        stat.top_dirs.put(TopItem::new(res.dir.clone(), res.entries));
    }

    if removed.contains(&res.dir) {
        return Vec::new();
    }
    res.subdirs
        .into_iter()
        .filter(|d| !removed.contains(d))
        .collect()
}
