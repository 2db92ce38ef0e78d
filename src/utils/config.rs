//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    exclude_env: String,
    hole_map_suffix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                exclude_env: format!("{}_EXCLUDE", pkg.to_uppercase()),
                hole_map_suffix: "holemap".to_string(),
            }
        })
    }

    /// Crate name; also the logger's module filter and line prefix.
    pub fn pkg_name(&self) -> &'static str {
        self.pkg_name
    }

    /// Name of the optional settings file looked up in the current directory.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Environment variable holding extra colon-separated exclusion paths.
    pub fn exclude_env(&self) -> &str {
        &self.exclude_env
    }

    pub fn hole_map_suffix(&self) -> &str {
        &self.hole_map_suffix
    }

    /// Directories never descended into on this platform.
    pub fn default_exclude_paths(&self) -> Vec<String> {
        if cfg!(target_os = "macos") {
            vec![
                "/Volumes/GoogleDrive".to_string(),
                "/Volumes/Recovery".to_string(),
            ]
        } else {
            Vec::new()
        }
    }
}

// ---- Worker threads ----

/// Worker count defaults.
/// Use [`WorkerDefaults::current()`] to fill `all_threads` from rayon; the rest are const.
#[derive(Clone, Copy, Debug)]
pub struct WorkerDefaults {
    /// Logical CPUs (from rayon); set by [`WorkerDefaults::current()`].
    pub all_threads: usize,
    /// Never run fewer workers than this.
    pub floor: usize,
}

impl Default for WorkerDefaults {
    fn default() -> Self {
        Self {
            all_threads: 0,
            floor: Self::FLOOR_THREADS,
        }
    }
}

impl WorkerDefaults {
    pub const FLOOR_THREADS: usize = 1;

    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }

    /// Resolve an optional override against the CPU count.
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.all_threads).max(self.floor)
    }
}

// ---- Progress ----

pub struct ProgressConsts;

impl ProgressConsts {
    /// How often the walker refreshes its progress line.
    pub const REPORT_INTERVAL: Duration = Duration::from_millis(500);
}

// ---- Hashing ----

/// Hashing I/O thresholds and buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// File size above which hashing uses memory-mapped I/O (bytes). 100 MB.
    pub const HASH_MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;
    /// Chunk size for reading files below mmap threshold (bytes). 1 MB.
    pub const HASH_READ_CHUNK_SIZE: usize = 1024 * 1024;
}

// ---- Units ----

pub const KIB: u64 = 1 << 10;
pub const MIB: u64 = 1 << 20;
pub const GIB: u64 = 1 << 30;
pub const TIB: u64 = 1 << 40;

// ---- Copy ----

/// Size tiers for the chunked single-file copy: `(upper bound, workers)`.
pub struct CopyTiers;

impl CopyTiers {
    /// Files strictly below this use the smallest tier.
    pub const SMALL_LIMIT: u64 = 64 * MIB;
    pub const SMALL_WORKERS: usize = 4;
    /// Inclusive upper bounds for the remaining tiers.
    pub const TIERS: [(u64, usize); 5] = [
        (GIB, 8),
        (8 * GIB, 16),
        (16 * GIB, 32),
        (32 * GIB, 64),
        (512 * GIB, 128),
    ];
    /// Anything above the last tier.
    pub const MAX_WORKERS: usize = 256;
    /// Open descriptors held by one chunk worker (source + destination).
    pub const FDS_PER_WORKER: usize = 2;
    /// Read size inside one range; the abort flag is checked between reads.
    pub const RANGE_BUF: usize = MIB as usize;
    /// Files below this are copied sequentially inside tree-copy jobs.
    pub const CHUNKED_THRESHOLD: u64 = Self::SMALL_LIMIT;
    /// Global deadline for one chunked file copy.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 60);
}

// ---- Sparse ----

pub struct SparseConsts;

impl SparseConsts {
    /// Data/hole granularity for generated sparse files. Large enough to cover the
    /// allocation unit of common filesystems.
    pub const GEN_BLOCK: u64 = 64 * KIB;
    /// Bytes per on-disk block reported by `st_blocks`.
    pub const STAT_BLOCK: u64 = 512;
}

// ---- Statistics ----

/// Default histogram boundaries (last entry is replaced by the catch-all sentinel).
pub const DEFAULT_HIST_BINS: &str =
    "4k,8k,16k,32k,64k,256k,512k,1m,4m,16m,512m,1g,16g,64g,128g,256g,1t,32t";

/// Default capacity of the top-N trackers.
pub const DEFAULT_TOP_N: usize = 5;
