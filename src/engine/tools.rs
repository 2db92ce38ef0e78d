//! Path, size and formatting utilities

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use crate::utils::config::{GIB, KIB, MIB, TIB};

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Where a single-file copy lands: inside `dst` when it is an existing directory.
pub fn dest_path(src: &Path, dst: &Path) -> PathBuf {
    match (dst.is_dir(), src.file_name()) {
        (true, Some(name)) => dst.join(name),
        _ => dst.to_path_buf(),
    }
}

/// Reported size of a regular file. On Unix this is the smaller of the logical length and
/// the allocated `512 * st_blocks`, unless `apparent` asks for the logical length.
#[cfg(unix)]
pub fn file_size(meta: &Metadata, apparent: bool) -> u64 {
    use crate::utils::config::SparseConsts;
    use std::os::unix::fs::MetadataExt;
    let len = meta.len();
    if apparent {
        return len;
    }
    len.min(meta.blocks().saturating_mul(SparseConsts::STAT_BLOCK))
}

#[cfg(not(unix))]
pub fn file_size(meta: &Metadata, _apparent: bool) -> u64 {
    meta.len()
}

/// Shell-style glob over a whole name: `*` any run, `?` one char, `[abc]`, `[a-z]` and
/// `[!a]` classes. Everything else is literal.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    // (pattern index after the last `*`, text index that `*` currently stops at)
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() {
            match p[pi] {
                '*' => {
                    star = Some((pi + 1, ti));
                    pi += 1;
                    continue;
                }
                '?' => {
                    pi += 1;
                    ti += 1;
                    continue;
                }
                '[' => match match_class(&p, pi, t[ti]) {
                    Some((true, next)) => {
                        pi = next;
                        ti += 1;
                        continue;
                    }
                    Some((false, _)) => {}
                    // Unterminated class: `[` is literal.
                    None if t[ti] == '[' => {
                        pi += 1;
                        ti += 1;
                        continue;
                    }
                    None => {}
                },
                c if c == t[ti] => {
                    pi += 1;
                    ti += 1;
                    continue;
                }
                _ => {}
            }
        }
        // Mismatch: let the last `*` swallow one more char, or fail.
        match star {
            Some((sp, st)) => {
                pi = sp;
                ti = st + 1;
                star = Some((sp, st + 1));
            }
            None => return false,
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}

/// Returns `(matched, index after the class)`, or None when the class never closes.
fn match_class(p: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negate = matches!(p.get(i), Some('!' | '^'));
    if negate {
        i += 1;
    }
    let mut matched = false;
    let mut first = true;
    while i < p.len() {
        if p[i] == ']' && !first {
            return Some((matched != negate, i + 1));
        }
        first = false;
        if i + 2 < p.len() && p[i + 1] == '-' && p[i + 2] != ']' {
            matched |= p[i] <= c && c <= p[i + 2];
            i += 3;
        } else {
            matched |= p[i] == c;
            i += 1;
        }
    }
    None
}

/// `1234567` -> `"1,234,567"`.
pub fn comma(v: u64) -> String {
    let digits = v.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Binary-unit byte count with two decimals; anything below 1 MiB is shown in KiB.
pub fn short_bytes(sz: u64) -> String {
    const PIB: u64 = TIB << 10;
    const EIB: u64 = PIB << 10;
    let (div, unit) = match sz {
        s if s < MIB => (KIB, "KiB"),
        s if s < GIB => (MIB, "MiB"),
        s if s < TIB => (GIB, "GiB"),
        s if s < PIB => (TIB, "TiB"),
        s if s < EIB => (PIB, "PiB"),
        _ => (EIB, "EiB"),
    };
    format!("{:.2} {}", sz as f64 / div as f64, unit)
}

/// Decimal shorthand for counts: `999`, `1.50 K`, `2.00 M`, `3.10 B`.
pub fn short_num(n: u64) -> String {
    let x = n as f64;
    match n {
        0..1_000 => n.to_string(),
        1_000..1_000_000 => format!("{:.2} K", x / 1e3),
        1_000_000..1_000_000_000 => format!("{:.2} M", x / 1e6),
        _ => format!("{:.2} B", x / 1e9),
    }
}
