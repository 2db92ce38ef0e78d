//! Predicate tree evaluated against one entry. `find` builds an AND chain; OR and NOT are
//! available for library callers composing their own filters.

use crate::EntryKind;
use crate::engine::tools::glob_match;
use crate::utils::timestamps::EntryTimes;

use super::control::FilterBits;
use super::size_spec::SizeSpec;
use super::time_spec::TimeWindow;

/// What a predicate can see about an entry.
#[derive(Clone, Copy, Debug)]
pub struct EntryView<'a> {
    /// Base name.
    pub name: &'a str,
    pub kind: EntryKind,
    /// `None` when not yet known (directory before its scan completes).
    pub size: Option<u64>,
    pub times: Option<EntryTimes>,
}

#[derive(Clone, Debug)]
pub enum Predicate {
    Always,
    Name(String),
    Size(SizeSpec),
    /// Matches when the entry's type bit is in the mask.
    Type(FilterBits),
    Time(TimeWindow),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }

    /// Left-nested AND of `terms`; `Always` when empty.
    pub fn all(terms: Vec<Predicate>) -> Predicate {
        terms
            .into_iter()
            .reduce(Predicate::and)
            .unwrap_or(Predicate::Always)
    }

    pub fn eval(&self, entry: &EntryView<'_>) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Name(pattern) => glob_match(pattern, entry.name),
            Predicate::Size(spec) => entry.size.is_some_and(|s| spec.matches(s)),
            Predicate::Type(mask) => FilterBits::for_kind(entry.kind).is_some_and(|b| mask.has(b)),
            Predicate::Time(window) => entry.times.is_some_and(|t| window.matches(&t)),
            Predicate::And(l, r) => l.eval(entry) && r.eval(entry),
            Predicate::Or(l, r) => l.eval(entry) || r.eval(entry),
            Predicate::Not(p) => !p.eval(entry),
        }
    }
}
