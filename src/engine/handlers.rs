//! Command handlers: turn parsed arguments plus settings into library calls and reports.

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use crate::copy::prepare_destination;
use crate::engine::arg_parser::{
    CpArgs, FindArgs, ProfileArgs, ScpArgs, SparseCheckArgs, SparseGenArgs, TopnArgs,
};
use crate::engine::report;
use crate::engine::tools::dest_path;
use crate::find::{FindControl, SizeSpec, TimeWindow};
use crate::sparse;
use crate::stats::parse_bins;
use crate::utils::timestamps::TimeField;
use crate::utils::{Colors, WorkerDefaults};
use crate::{CopyOpts, EntryKind, Settings, WalkOpts, copy_paths, walk_dir, walk_dir_with};

/// Walk options shared by every walking command.
fn base_walk_opts(settings: &Settings) -> WalkOpts {
    WalkOpts {
        workers: settings.workers,
        exclude: settings.exclude.clone(),
        apparent: settings.apparent,
        ..Default::default()
    }
}

pub fn handle_profile(args: &ProfileArgs, settings: &Settings) -> Result<()> {
    let hist_bins = if args.hist {
        Some(parse_bins(args.bins.as_deref().unwrap_or(&settings.bins))?)
    } else {
        None
    };
    let opts = WalkOpts {
        hist_bins,
        sparse: args.sparse,
        apparent: args.apparent || settings.apparent,
        progress: true,
        ..base_walk_opts(settings)
    };
    report::print_prologue(&args.dir, WorkerDefaults::current().resolve(opts.workers));
    let stat = walk_dir(&args.dir, &opts)?;
    if let Some(hist) = &stat.histogram {
        report::print_histogram(hist, stat.files);
    }
    report::print_summary(&stat, args.sparse);
    Ok(())
}

pub fn handle_topn(args: &TopnArgs, settings: &Settings) -> Result<()> {
    let opts = WalkOpts {
        top_files: args.files,
        top_dirs: args.dirs,
        apparent: args.apparent || settings.apparent,
        progress: true,
        ..base_walk_opts(settings)
    };
    report::print_prologue(&args.dir, WorkerDefaults::current().resolve(opts.workers));
    let stat = walk_dir(&args.dir, &opts)?;
    report::print_top_dirs(stat.top_dirs.items());
    report::print_top_files(stat.top_files.items());
    Ok(())
}

/// Build the filter set from `find` flags. Any malformed value fails here, before the walk.
pub fn find_control(args: &FindArgs, settings: &Settings, now: SystemTime) -> Result<FindControl> {
    let mut fc = FindControl::new()
        .with_apparent(args.apparent || settings.apparent)
        .with_delete(args.delete);
    if let Some(name) = &args.name {
        fc = fc.with_name(name.as_str());
    }
    if let Some(size) = &args.size {
        fc = fc.with_size(size.parse::<SizeSpec>()?);
    }
    fc = match &args.kind {
        Some(token) => fc.with_type_token(token)?,
        None => fc.with_type(EntryKind::File),
    };
    let time = [
        (TimeField::Access, &args.atime),
        (TimeField::Modify, &args.mtime),
        (TimeField::Change, &args.ctime),
    ]
    .into_iter()
    .find_map(|(field, spec)| spec.as_deref().map(|s| (field, s)));
    if let Some((field, spec)) = time {
        let window = TimeWindow::from_spec(field, spec, now)?;
        debug!("time window {:?}: {:?} .. {:?}", field, window.start, window.end);
        fc = fc.with_time(window);
    }
    debug!("find flags = {:#b}", fc.flags().bits());
    Ok(fc)
}

pub fn handle_find(args: &FindArgs, settings: &Settings) -> Result<()> {
    let fc = find_control(args, settings, SystemTime::now())?;
    if fc.delete() {
        warn!("--delete: every match is removed immediately, without confirmation");
    }
    let opts = WalkOpts {
        find: Some(fc),
        ..base_walk_opts(settings)
    };
    let stat = if settings.verbose {
        walk_dir_with(&args.dir, &opts, |p| {
            println!("{}", Colors::colorize(Colors::MATCH, &p.display().to_string()))
        })?
    } else {
        walk_dir(&args.dir, &opts)?
    };
    debug!(
        "find: {} matched, {} deleted, {} scanned in {:?}",
        stat.matched,
        stat.deleted,
        stat.scanned(),
        stat.elapsed
    );
    Ok(())
}

pub fn handle_cp(args: &CpArgs, settings: &Settings) -> Result<()> {
    let Some((sources, dest)) = args.split() else {
        bail!("need at least 2 args, one source, one destination");
    };
    let dest = prepare_destination(dest)?;
    let sources = sources
        .iter()
        .map(|s| std::path::absolute(s).with_context(|| format!("resolve {}", s.display())))
        .collect::<Result<Vec<PathBuf>>>()?;
    debug!("sources = {:?}, dest = {}", sources, dest.display());

    let opts = CopyOpts {
        workers: settings.workers,
        timeout: args
            .timeout
            .map(Duration::from_secs)
            .unwrap_or(settings.copy_timeout),
        verify: args.verify.unwrap_or(settings.verify),
    };
    let report = copy_paths(&sources, &dest, &opts)?;
    report::print_copy_report(&report);
    if report.failures > 0 {
        bail!("{} copy jobs failed", report.failures);
    }
    Ok(())
}

pub fn handle_scp(args: &ScpArgs) -> Result<()> {
    let dst = dest_path(&args.src, &args.dst);
    let written = sparse::extent_copy(&args.src, &dst)?;
    info!(
        "{} -> {}: {} data bytes written",
        args.src.display(),
        dst.display(),
        written
    );
    Ok(())
}

pub fn handle_sparse_check(args: &SparseCheckArgs) -> Result<()> {
    if !args.file.is_file() {
        bail!("{} is not a regular file", args.file.display());
    }
    if args.data {
        let extents = sparse::scan_extents(&args.file)
            .with_context(|| format!("scan data extents of {}", args.file.display()))?;
        report::print_extents(&extents);
    } else {
        let holes = sparse::scan_holes(&args.file)
            .with_context(|| format!("scan holes of {}", args.file.display()))?;
        report::print_holes(&holes);
    }
    Ok(())
}

pub fn handle_sparse_gen(args: &SparseGenArgs) -> Result<()> {
    let holes = sparse::create_sparse_file(&args.file, args.holes, args.end, args.debug)?;
    println!(
        "Sparse file [{}] successfully created with {} holes",
        args.file.display(),
        holes.len()
    );
    if args.debug {
        info!(
            "hole map written to {}",
            sparse::hole_map_path(&args.file).display()
        );
    }
    Ok(())
}
