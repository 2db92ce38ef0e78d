//! Relative time windows for `--atime/--mtime/--ctime`, e.g. `4h30m`, `-1d`, `90s`.

use anyhow::{Result, bail};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::utils::timestamps::{EntryTimes, TimeField};

/// Parse `[-]<n><d|h|m|s>[<n><d|h|m|s>...]`. Returns the duration and whether it was negated.
pub fn parse_duration(spec: &str) -> Result<(Duration, bool)> {
    let spec = spec.trim();
    let (neg, body) = match spec.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, spec),
    };
    if body.is_empty() {
        bail!("empty time specification {:?}", spec);
    }

    let mut total: u64 = 0;
    let mut num: Option<u64> = None;
    for c in body.chars() {
        if let Some(d) = c.to_digit(10) {
            let n = num.unwrap_or(0);
            num = n.checked_mul(10).and_then(|n| n.checked_add(d as u64));
            if num.is_none() {
                bail!("time specification {:?} overflows", spec);
            }
            continue;
        }
        let secs_per = match c.to_ascii_lowercase() {
            'd' => 86_400,
            'h' => 3_600,
            'm' => 60,
            's' => 1,
            _ => bail!("wrong time format {:?}: unknown unit {:?}", spec, c),
        };
        let Some(n) = num.take() else {
            bail!("wrong time format {:?}: unit {:?} without a number", spec, c);
        };
        total = n
            .checked_mul(secs_per)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| anyhow::anyhow!("time specification {:?} overflows", spec))?;
    }
    if num.is_some() {
        bail!("wrong time format {:?}: trailing number without unit", spec);
    }
    Ok((Duration::from_secs(total), neg))
}

/// Half-open interval `[start, end)` over one timestamp field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub field: TimeField,
    pub start: SystemTime,
    pub end: SystemTime,
}

impl TimeWindow {
    pub fn new(field: TimeField, start: SystemTime, end: SystemTime) -> Self {
        Self { field, start, end }
    }

    /// Window relative to `now`: negated spec means "within the last D", plain spec means
    /// "older than D".
    pub fn from_spec(field: TimeField, spec: &str, now: SystemTime) -> Result<Self> {
        let (du, neg) = parse_duration(spec)?;
        let cutoff = now.checked_sub(du).unwrap_or(UNIX_EPOCH);
        Ok(if neg {
            Self::new(field, cutoff, now)
        } else {
            Self::new(field, UNIX_EPOCH, cutoff)
        })
    }

    pub fn contains(&self, t: SystemTime) -> bool {
        self.start <= t && t < self.end
    }

    pub fn matches(&self, times: &EntryTimes) -> bool {
        self.contains(times.get(self.field))
    }
}
