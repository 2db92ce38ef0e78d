//! Live counter for long walks

use kdam::{Animation, Bar, BarExt};

use crate::engine::tools::comma;

/// Create a counter for unknown total (shows count without percentage)
pub fn create_counter(desc: &'static str) -> Bar {
    kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " entries"
    )
}

/// Move the counter to `scanned` and show the skip count beside it.
/// Display errors are ignored; progress is best effort.
pub fn update_counter(bar: &mut Bar, scanned: u64, skipped: u64) {
    bar.set_postfix(format!("skipped={}", comma(skipped)));
    let _ = bar.update_to(scanned as usize);
}

/// Final refresh, then move past the counter line.
pub fn finish_counter(bar: &mut Bar, scanned: u64, skipped: u64) {
    update_counter(bar, scanned, skipped);
    let _ = bar.refresh();
    eprintln!();
}
