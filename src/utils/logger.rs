//! Logging setup and report colors.

use colored::{Color, Colorize};
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

use crate::utils::config::PackagePaths;

/// Colors for report headings and highlighted lines.
pub struct Colors;

impl Colors {
    pub const HEADING: Color = Color::Cyan;
    pub const MATCH: Color = Color::Green;
    pub const FAILED: Color = Color::Red;

    pub fn colorize(color: Color, text: &str) -> String {
        text.color(color).to_string()
    }
}

/// Logs go to stderr so stdout stays clean for reports and `find` output.
/// Dependencies log at warn; this crate at info, or debug when `verbose`.
/// `RUST_LOG` still applies on top. Calling twice is harmless.
pub fn setup_logging(verbose: bool) {
    let own = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let pkg = PackagePaths::get().pkg_name();

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(pkg, own)
        .format(move |buf, record| {
            let tag = match record.level() {
                Level::Error => Some("ERROR".red()),
                Level::Warn => Some("WARN".yellow()),
                Level::Debug if verbose => Some("debug".dimmed()),
                _ => None,
            };
            match tag {
                Some(tag) => writeln!(
                    buf,
                    "[{} {} {}] {}",
                    pkg.cyan(),
                    tag,
                    record.target().white(),
                    record.args()
                ),
                None => writeln!(buf, "[{}] {}", pkg.cyan(), record.args()),
            }
        })
        .try_init();
}
