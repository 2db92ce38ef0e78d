use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::config::DEFAULT_TOP_N;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
    pub const SPARSE_HOLES: usize = 3;
}

/// Parallel file system tools.
#[derive(Clone, Parser)]
#[command(name = "parafs")]
#[command(about = "Profile, search and copy large directory trees in parallel; inspect sparse files.")]
pub struct Cli {
    /// Number of worker threads. Default: logical CPUs.
    #[arg(long = "np", global = true, value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Verbose output.
    #[arg(long, short = 'v', global = true, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Directory never descended into (exact path). Repeatable.
    #[arg(long, short = 'e', global = true)]
    pub exclude: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// General file system profiling: counts, sizes, optional histogram.
    Profile(ProfileArgs),
    /// Largest files and directories with the most entries.
    Topn(TopnArgs),
    /// A subset of Unix find.
    Find(FindArgs),
    /// Parallel copy: SOURCE... DEST.
    Cp(CpArgs),
    /// Sparse-aware copy of one file.
    Scp(ScpArgs),
    /// List holes (or data extents) of a file.
    SparseCheck(SparseCheckArgs),
    /// Generate a sparse file.
    SparseGen(SparseGenArgs),
}

#[derive(Clone, Args)]
pub struct ProfileArgs {
    /// Directory to profile. Default: current directory.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Print a file size histogram.
    #[arg(long)]
    pub hist: bool,

    /// Count sparse files.
    #[arg(long)]
    pub sparse: bool,

    /// Histogram bins, e.g. `4k,1m,1g,1t`. The last one becomes the catch-all bucket.
    #[arg(long)]
    pub bins: Option<String>,

    /// Report apparent sizes instead of allocated sizes.
    #[arg(long)]
    pub apparent: bool,
}

#[derive(Clone, Args)]
pub struct TopnArgs {
    /// Directory to scan. Default: current directory.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Number of largest files to report.
    #[arg(long, short = 'f', default_value_t = DEFAULT_TOP_N)]
    pub files: usize,

    /// Number of directories with the most entries to report.
    #[arg(long, short = 'd', default_value_t = DEFAULT_TOP_N)]
    pub dirs: usize,

    /// Rank files by apparent size instead of allocated size.
    #[arg(long)]
    pub apparent: bool,
}

#[derive(Clone, Args)]
pub struct FindArgs {
    /// Directory to search.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Glob on the base name (`*`, `?`, `[...]`).
    #[arg(long)]
    pub name: Option<String>,

    /// Size filter: `[+|-]<n>[c|k|m|g|t]` (greater, less, or exactly).
    #[arg(long, allow_hyphen_values = true)]
    pub size: Option<String>,

    /// Entry type: f, d or l. Default: f.
    #[arg(long = "type", value_name = "f|d|l")]
    pub kind: Option<String>,

    /// Compare apparent size instead of allocated size.
    #[arg(long)]
    pub apparent: bool,

    /// Access time, e.g. `-4h30m` (within the last) or `7d` (older than).
    #[arg(long, allow_hyphen_values = true, conflicts_with_all = ["mtime", "ctime"])]
    pub atime: Option<String>,

    /// Modification time, same syntax as --atime.
    #[arg(long, allow_hyphen_values = true, conflicts_with = "ctime")]
    pub mtime: Option<String>,

    /// Status change time, same syntax as --atime.
    #[arg(long, allow_hyphen_values = true)]
    pub ctime: Option<String>,

    /// Delete every match. No confirmation.
    #[arg(long)]
    pub delete: bool,
}

#[derive(Clone, Args)]
pub struct CpArgs {
    /// Sources followed by the destination directory.
    #[arg(value_name = "PATH", num_args = 2.., required = true)]
    pub paths: Vec<PathBuf>,

    /// Compare blake3 checksums after each file.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verify: Option<bool>,

    /// Per-file deadline for chunked copies, in seconds.
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,
}

impl CpArgs {
    /// `(sources, destination)`: the last path is the destination.
    pub fn split(&self) -> Option<(&[PathBuf], &PathBuf)> {
        let (dest, sources) = self.paths.split_last()?;
        (!sources.is_empty()).then_some((sources, dest))
    }
}

#[derive(Clone, Args)]
pub struct ScpArgs {
    pub src: PathBuf,
    /// Destination file, or a directory to copy into.
    pub dst: PathBuf,
}

#[derive(Clone, Args)]
pub struct SparseCheckArgs {
    pub file: PathBuf,

    /// List data extents instead of holes.
    #[arg(long)]
    pub data: bool,
}

#[derive(Clone, Args)]
pub struct SparseGenArgs {
    pub file: PathBuf,

    /// Number of holes.
    #[arg(long, default_value_t = DefaultArgs::SPARSE_HOLES)]
    pub holes: usize,

    /// End the file with a hole.
    #[arg(long)]
    pub end: bool,

    /// Write the hole map next to the file.
    #[arg(long)]
    pub debug: bool,
}
