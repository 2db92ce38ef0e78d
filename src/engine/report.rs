//! Human-readable reports printed to stdout after a run.

use std::path::Path;

use crate::engine::tools::{comma, short_bytes, short_num};
use crate::sparse::ExtentInfo;
use crate::stats::{CATCH_ALL, Histogram, TopItem};
use crate::utils::Colors;
use crate::{CopyReport, WalkStat};

fn heading(text: &str) {
    println!("\n{}\n", Colors::colorize(Colors::HEADING, text));
}

/// Dotted label column, value on the right.
fn row(label: &str, value: impl std::fmt::Display) {
    println!("{:.<36} {}", format!("{label} "), value);
}

pub fn print_prologue(root: &Path, workers: usize) {
    println!("\nRunning: [{}] threads on {}\n", workers, root.display());
}

/// One line per bucket: `<= bound`, or `> previous bound` for the catch-all.
pub fn print_histogram(hist: &Histogram, total_files: u64) {
    heading("Histogram");
    let bins = hist.bins();
    for (i, (bound, count)) in hist.buckets().enumerate() {
        let (label, bucket) = if bound == CATCH_ALL {
            let prev = if i > 0 { bins[i - 1] } else { 0 };
            (">", short_bytes(prev))
        } else {
            ("<=", short_bytes(bound))
        };
        let pct = if total_files > 0 {
            count as f64 / total_files as f64 * 100.0
        } else {
            0.0
        };
        println!(
            "{:>4}{:>14}  {:>16}  {:>7.2}%",
            label,
            bucket,
            comma(count),
            pct
        );
    }
    println!();
}

pub fn print_summary(stat: &WalkStat, show_sparse: bool) {
    heading("Summary");
    row("Total # of files", comma(stat.files));
    row("Total # of dirs", comma(stat.dirs));
    row("Total # of symlinks", comma(stat.symlinks));
    row("Total # of pipes", comma(stat.pipes));
    if show_sparse {
        row("Total # of sparse files", comma(stat.sparse_files));
    }
    row("Avg file size", short_bytes(stat.avg_file_size()));
    if let Some(avg) = stat.avg_dir_entries() {
        row("Avg # of entries per directory", comma(avg));
    }
    row("Largest file", short_bytes(stat.max_file_size));
    row("Aggregated file size", short_bytes(stat.total_file_size));
    row("Skipped", comma(stat.skipped));
    row("Scanning rate", format!("{}/s", comma(stat.rate())));
    row("Elapsed time", format!("{:.2?}", stat.elapsed));
    println!();
}

/// Largest first.
pub fn print_top_dirs(items: &[TopItem]) {
    heading("Top count on directory entries");
    for it in items.iter().rev() {
        println!("\t{} ({})", it.name.display(), short_num(it.val));
    }
    println!();
}

/// Largest first.
pub fn print_top_files(items: &[TopItem]) {
    heading("Top count on large files");
    for it in items.iter().rev() {
        println!("\t{} ({})", it.name.display(), short_bytes(it.val));
    }
    println!();
}

pub fn print_copy_report(report: &CopyReport) {
    heading("Copy");
    row("Files copied", comma(report.files_copied));
    row("Bytes copied", short_bytes(report.bytes_copied));
    row("Directories created", comma(report.dirs_created));
    row("Symlinks skipped", comma(report.symlinks_skipped));
    if report.failures > 0 {
        row(
            "Failures",
            Colors::colorize(Colors::FAILED, &comma(report.failures)),
        );
    }
    row("Elapsed time", format!("{:.2?}", report.elapsed));
    println!();
}

pub fn print_holes(holes: &[u64]) {
    if holes.is_empty() {
        println!("No holes detected");
        return;
    }
    println!("Sparse file with {} holes", holes.len());
    for (i, off) in holes.iter().enumerate() {
        println!("\tHole {} at: \t{}", i + 1, off);
    }
    println!();
}

pub fn print_extents(extents: &[ExtentInfo]) {
    if extents.is_empty() {
        println!("No data extents detected");
        return;
    }
    println!("File with {} data segments", extents.len());
    for ext in extents {
        row(&format!("Data offset={}", ext.logical), format!("length={}", ext.length));
    }
    println!();
}
