//! Walk pipeline: per-directory scan jobs on the fan-out pool and the consumer that merges them.

pub mod context;
pub mod error_handler;
pub mod orchestrator;
pub mod walk;

pub use context::{FoundEntry, ScanResult, WalkContext, WalkJob};
pub use error_handler::report_skipped_paths;
pub use orchestrator::run_walk;
pub use walk::scan_dir;
