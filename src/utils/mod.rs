pub mod config;
pub mod fd_limit;
pub mod logger;
pub mod parafs_toml;
pub mod timestamps;

pub use config::*;
pub use fd_limit::{cap_workers_by_fd_limit, max_open_fds, max_workers_by_fd_limit};
pub use logger::{Colors, setup_logging};
pub use parafs_toml::settings_from_str;
pub use timestamps::{EntryTimes, TimeField, entry_times};
