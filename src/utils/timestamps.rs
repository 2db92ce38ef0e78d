//! Cross-platform access/modify/change timestamps for a directory entry.

use std::fs::Metadata;
use std::time::{SystemTime, UNIX_EPOCH};

/// Which timestamp a time filter looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeField {
    Access,
    Modify,
    Change,
}

/// The three timestamps of one entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryTimes {
    pub accessed: SystemTime,
    pub modified: SystemTime,
    /// Inode change time on Unix; creation time elsewhere.
    pub changed: SystemTime,
}

impl EntryTimes {
    pub fn get(&self, field: TimeField) -> SystemTime {
        match field {
            TimeField::Access => self.accessed,
            TimeField::Modify => self.modified,
            TimeField::Change => self.changed,
        }
    }
}

#[cfg(unix)]
fn from_unix(secs: i64, nsecs: i64) -> SystemTime {
    use std::time::Duration;
    let nsecs = nsecs.clamp(0, 999_999_999) as u32;
    if secs >= 0 {
        UNIX_EPOCH + Duration::new(secs as u64, nsecs)
    } else {
        UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs()) + Duration::from_nanos(nsecs as u64)
    }
}

#[cfg(unix)]
pub fn entry_times(meta: &Metadata) -> EntryTimes {
    use std::os::unix::fs::MetadataExt;
    EntryTimes {
        accessed: from_unix(meta.atime(), meta.atime_nsec()),
        modified: from_unix(meta.mtime(), meta.mtime_nsec()),
        changed: from_unix(meta.ctime(), meta.ctime_nsec()),
    }
}

#[cfg(not(unix))]
pub fn entry_times(meta: &Metadata) -> EntryTimes {
    let modified = meta.modified().unwrap_or(UNIX_EPOCH);
    EntryTimes {
        accessed: meta.accessed().unwrap_or(modified),
        modified,
        changed: meta.created().unwrap_or(modified),
    }
}
