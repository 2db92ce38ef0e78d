//! Size histogram with ascending boundaries and a catch-all final bucket.

use anyhow::{Context, Result, bail};

use crate::utils::config::{GIB, KIB, MIB, TIB};

/// Boundary value standing for "greater than every explicit boundary".
pub const CATCH_ALL: u64 = u64::MAX;

/// Ordered bucket boundaries with a parallel counter array.
///
/// A value `v` lands in the first bucket whose boundary is `>= v`; values above every
/// boundary land in the last bucket.
#[derive(Clone, Debug)]
pub struct Histogram {
    bins: Vec<u64>,
    counters: Vec<u64>,
}

impl Histogram {
    /// Build from explicit boundaries. Boundaries are sorted; at least one is required.
    pub fn new(mut bins: Vec<u64>) -> Result<Self> {
        if bins.is_empty() {
            bail!("histogram needs at least one bin boundary");
        }
        bins.sort_unstable();
        let counters = vec![0; bins.len()];
        Ok(Self { bins, counters })
    }

    /// Build from a bin spec such as `"4k,1m,1g,1t"`. See [`parse_bins`].
    pub fn from_spec(spec: &str) -> Result<Self> {
        Self::new(parse_bins(spec)?)
    }

    /// Index of the bucket `value` belongs to.
    pub fn bucket_index(&self, value: u64) -> usize {
        let i = self.bins.partition_point(|&b| b < value);
        i.min(self.bins.len() - 1)
    }

    pub fn insert(&mut self, value: u64) {
        let i = self.bucket_index(value);
        self.counters[i] += 1;
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    pub fn counters(&self) -> &[u64] {
        &self.counters
    }

    /// Number of values inserted so far.
    pub fn total(&self) -> u64 {
        self.counters.iter().sum()
    }

    /// `(boundary, count)` pairs in ascending boundary order.
    pub fn buckets(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.bins.iter().copied().zip(self.counters.iter().copied())
    }
}

/// Parse a comma separated list of `<digits><k|m|g|t>` boundaries (case-insensitive).
///
/// The last listed boundary is overwritten with [`CATCH_ALL`] before sorting, so
/// `"3t,4k,1m,2g"` yields `[4k, 1m, 3t, CATCH_ALL]`: the listed `2g` is dropped.
pub fn parse_bins(spec: &str) -> Result<Vec<u64>> {
    let mut bins = Vec::new();
    for raw in spec.split(',') {
        let token = raw.trim();
        let Some(unit) = token.chars().last() else {
            bail!("empty histogram bin in {:?}", spec);
        };
        let digits = &token[..token.len() - unit.len_utf8()];
        let n: u64 = digits
            .parse()
            .with_context(|| format!("bad histogram bin {:?} in {:?}", token, spec))?;
        let mult = match unit.to_ascii_uppercase() {
            'K' => KIB,
            'M' => MIB,
            'G' => GIB,
            'T' => TIB,
            _ => bail!("unknown unit in histogram bins: {}", spec),
        };
        let value = n
            .checked_mul(mult)
            .with_context(|| format!("histogram bin {:?} overflows", token))?;
        bins.push(value);
    }
    if let Some(last) = bins.last_mut() {
        *last = CATCH_ALL;
    }
    bins.sort_unstable();
    Ok(bins)
}
