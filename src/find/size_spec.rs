//! `--size` mini-language: `[+|-]<digits>[c|k|m|g|t]`.

use anyhow::{Context, Result, bail};
use std::fmt;
use std::str::FromStr;

use crate::utils::config::{GIB, KIB, MIB, TIB};

/// Comparison applied between an entry's size and the threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeOp {
    Greater,
    Less,
    Equal,
}

impl fmt::Display for SizeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SizeOp::Greater => ">",
            SizeOp::Less => "<",
            SizeOp::Equal => "==",
        };
        f.write_str(s)
    }
}

/// Parsed size filter: `op` against `bytes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeSpec {
    pub op: SizeOp,
    pub bytes: u64,
}

impl SizeSpec {
    pub fn new(op: SizeOp, bytes: u64) -> Self {
        Self { op, bytes }
    }

    pub fn matches(&self, size: u64) -> bool {
        match self.op {
            SizeOp::Greater => size > self.bytes,
            SizeOp::Less => size < self.bytes,
            SizeOp::Equal => size == self.bytes,
        }
    }
}

fn unit_multiplier(unit: char) -> Option<u64> {
    match unit.to_ascii_lowercase() {
        'c' => Some(1),
        'k' => Some(KIB),
        'm' => Some(MIB),
        'g' => Some(GIB),
        't' => Some(TIB),
        _ => None,
    }
}

impl FromStr for SizeSpec {
    type Err = anyhow::Error;

    /// `+` means greater-than, `-` less-than, no sign equal. Unit defaults to bytes (`c`).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (op, rest) = match s.as_bytes().first() {
            Some(b'+') => (SizeOp::Greater, &s[1..]),
            Some(b'-') => (SizeOp::Less, &s[1..]),
            Some(_) => (SizeOp::Equal, s),
            None => bail!("empty size specification"),
        };
        let (digits, mult) = match rest.chars().last() {
            Some(c) if c.is_ascii_digit() => (rest, 1),
            Some(c) => match unit_multiplier(c) {
                Some(m) => (&rest[..rest.len() - c.len_utf8()], m),
                None => bail!("can't parse --size {:?}: unknown unit {:?}", s, c),
            },
            None => bail!("can't parse --size {:?}: missing number", s),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            bail!("can't parse --size {:?}: expected digits", s);
        }
        let n: u64 = digits
            .parse()
            .with_context(|| format!("can't parse --size {:?}", s))?;
        let bytes = n
            .checked_mul(mult)
            .with_context(|| format!("--size {:?} overflows", s))?;
        Ok(SizeSpec { op, bytes })
    }
}
