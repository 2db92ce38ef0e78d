use log::{debug, warn};
use std::path::PathBuf;

/// Log the skip total after a walk; individual paths only at debug level.
pub fn report_skipped_paths(skipped: u64, skipped_paths: &[(PathBuf, String)]) {
    if skipped == 0 {
        return;
    }
    warn!(
        "Skipped {} entries due to permission errors or access issues",
        skipped
    );
    for (p, msg) in skipped_paths {
        debug!("  skipped: {} ({})", p.display(), msg);
    }
}
