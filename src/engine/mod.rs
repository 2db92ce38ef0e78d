//! Engine: fan-out pool, CLI and shared helpers

pub mod arg_parser;
pub mod cli;
pub mod handlers;
pub mod hashing;
pub mod pool;
pub mod progress;
pub mod report;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::{Cli, Commands};
pub use cli::{handle_run, setup_settings, split_exclude};
pub use hashing::{checksum_file, same_content};
pub use pool::{FanOutPool, Next, TaskResult};
pub use tools::{comma, dest_path, file_size, glob_match, path_relative_to, short_bytes, short_num};
