//! Scan worker: list one directory, classify its entries, report subdirectories as new work.

use std::ffi::OsStr;
use std::fs::{self, DirEntry, File};
use std::path::Path;

use crate::EntryKind;
use crate::engine::tools::file_size;
use crate::find::EntryView;
use crate::sparse;
use crate::stats::{TopItem, TopN};
use crate::utils::timestamps::entry_times;

use super::context::{FoundEntry, ScanResult, WalkContext, WalkJob};

/// Scan `job.dir` with a single `read_dir`. Never recurses; subdirectories come back in
/// [`ScanResult::subdirs`]. An unreadable directory yields `skipped = 1` and no children.
pub fn scan_dir(ctx: &WalkContext, job: WalkJob) -> ScanResult {
    let iter = match fs::read_dir(&job.dir) {
        Ok(it) => it,
        Err(e) => return ScanResult::unreadable(job.dir, e.to_string()),
    };

    let mut res = ScanResult::new(job.dir);
    if ctx.top_files > 0 {
        res.largest = Some(TopN::new(ctx.top_files));
    }

    for entry in iter {
        match entry {
            Ok(entry) => scan_entry(ctx, &entry, &mut res),
            Err(e) => {
                res.skipped += 1;
                res.errors.push((res.dir.clone(), e.to_string()));
            }
        }
    }

    if job.evaluate_self {
        res.self_match = matches_dir_aggregate(ctx, &res);
    }
    res
}

fn scan_entry(ctx: &WalkContext, entry: &DirEntry, res: &mut ScanResult) {
    let path = entry.path();
    res.entries += 1;

    let kind = match entry.file_type() {
        Ok(ft) => EntryKind::from_file_type(&ft),
        Err(e) => {
            res.skipped += 1;
            res.errors.push((path, e.to_string()));
            return;
        }
    };

    // Size and timestamps are only needed for files and for `find`.
    let needs_meta = kind == EntryKind::File || ctx.find.is_some();
    let meta = if needs_meta {
        match entry.metadata() {
            Ok(m) => Some(m),
            Err(e) => {
                res.skipped += 1;
                res.errors.push((path, e.to_string()));
                return;
            }
        }
    } else {
        None
    };

    let mut size = None;
    match kind {
        EntryKind::File => {
            res.files += 1;
            let sz = meta.as_ref().map_or(0, |m| file_size(m, ctx.apparent));
            size = Some(sz);
            res.file_size_agg += sz;
            res.file_size_max = res.file_size_max.max(sz);
            if ctx.collect_sizes {
                res.file_sizes.push(sz);
            }
            if let Some(top) = res.largest.as_mut() {
                top.put(TopItem::new(path.clone(), sz));
            }
            if ctx.sparse {
                probe_sparse(&path, res);
            }
        }
        EntryKind::Dir => {
            res.dirs += 1;
            res.subdirs.push(path.clone());
        }
        EntryKind::Symlink => {
            res.symlinks += 1;
            size = meta.as_ref().map(|m| m.len());
        }
        EntryKind::Pipe => res.pipes += 1,
        EntryKind::Other => {}
    }

    if ctx.find.as_ref().is_some_and(|f| !f.defers(kind)) {
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        let view = EntryView {
            name: &name,
            kind,
            size,
            times: meta.as_ref().map(entry_times),
        };
        if ctx.predicate.eval(&view) {
            res.matches.push(FoundEntry { path, kind });
        }
    }
}

fn probe_sparse(path: &Path, res: &mut ScanResult) {
    let probe = File::open(path).and_then(|f| sparse::is_sparse(&f));
    match probe {
        Ok(true) => res.sparse_files += 1,
        Ok(false) => {}
        Err(e) => {
            res.skipped += 1;
            res.errors.push((path.to_path_buf(), format!("sparse probe: {e}")));
        }
    }
}

/// Directory match once its direct file sizes are summed.
fn matches_dir_aggregate(ctx: &WalkContext, res: &ScanResult) -> bool {
    let times = match fs::symlink_metadata(&res.dir) {
        Ok(m) => Some(entry_times(&m)),
        Err(_) => None,
    };
    let name = res
        .dir
        .file_name()
        .unwrap_or_else(|| OsStr::new(""))
        .to_string_lossy();
    let view = EntryView {
        name: &name,
        kind: EntryKind::Dir,
        size: Some(res.file_size_agg),
        times,
    };
    ctx.predicate.eval(&view)
}
