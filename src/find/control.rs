//! Active filter set for `find`: a bitmask of enabled filters plus their parameters.

use anyhow::{Result, bail};

use crate::EntryKind;
use crate::utils::timestamps::TimeField;

use super::predicate::Predicate;
use super::size_spec::SizeSpec;
use super::time_spec::TimeWindow;

/// Bitmask of enabled filters. Bits are only ever added.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterBits(u32);

impl FilterBits {
    pub const NAME: FilterBits = FilterBits(1 << 0);
    pub const SIZE: FilterBits = FilterBits(1 << 1);
    pub const TYPE_F: FilterBits = FilterBits(1 << 2);
    pub const TYPE_D: FilterBits = FilterBits(1 << 3);
    pub const TYPE_L: FilterBits = FilterBits(1 << 4);
    pub const TYPE_P: FilterBits = FilterBits(1 << 5);
    pub const MTIME: FilterBits = FilterBits(1 << 6);
    pub const ATIME: FilterBits = FilterBits(1 << 7);
    pub const CTIME: FilterBits = FilterBits(1 << 8);

    pub const TYPE_ANY: FilterBits =
        FilterBits(Self::TYPE_F.0 | Self::TYPE_D.0 | Self::TYPE_L.0 | Self::TYPE_P.0);
    pub const TIME_ANY: FilterBits = FilterBits(Self::MTIME.0 | Self::ATIME.0 | Self::CTIME.0);

    pub const fn empty() -> Self {
        FilterBits(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn set(self, flag: FilterBits) -> Self {
        FilterBits(self.0 | flag.0)
    }

    /// True if any bit of `flag` is set.
    pub const fn has(self, flag: FilterBits) -> bool {
        self.0 & flag.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The type bit for an entry kind, if `find` can filter on it.
    pub fn for_kind(kind: EntryKind) -> Option<FilterBits> {
        match kind {
            EntryKind::File => Some(Self::TYPE_F),
            EntryKind::Dir => Some(Self::TYPE_D),
            EntryKind::Symlink => Some(Self::TYPE_L),
            EntryKind::Pipe => Some(Self::TYPE_P),
            EntryKind::Other => None,
        }
    }

    fn for_time(field: TimeField) -> FilterBits {
        match field {
            TimeField::Access => Self::ATIME,
            TimeField::Modify => Self::MTIME,
            TimeField::Change => Self::CTIME,
        }
    }
}

/// Filter set for one `find` run. Built once during setup, then shared
/// read-only by every worker.
#[derive(Clone, Debug, Default)]
pub struct FindControl {
    flags: FilterBits,
    name: Option<String>,
    size: Option<SizeSpec>,
    apparent: bool,
    time: Option<TimeWindow>,
    delete: bool,
}

impl FindControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(&self) -> FilterBits {
        self.flags
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn size(&self) -> Option<SizeSpec> {
        self.size
    }

    pub fn time(&self) -> Option<TimeWindow> {
        self.time
    }

    /// Compare apparent (logical) size instead of on-disk size.
    pub fn apparent(&self) -> bool {
        self.apparent
    }

    /// Remove each match as soon as it is reported.
    pub fn delete(&self) -> bool {
        self.delete
    }

    pub fn with_name(mut self, pattern: impl Into<String>) -> Self {
        self.name = Some(pattern.into());
        self.flags = self.flags.set(FilterBits::NAME);
        self
    }

    pub fn with_size(mut self, spec: SizeSpec) -> Self {
        self.size = Some(spec);
        self.flags = self.flags.set(FilterBits::SIZE);
        self
    }

    pub fn with_apparent(mut self, apparent: bool) -> Self {
        self.apparent = apparent;
        self
    }

    pub fn with_type(mut self, kind: EntryKind) -> Self {
        if let Some(bit) = FilterBits::for_kind(kind) {
            self.flags = self.flags.set(bit);
        }
        self
    }

    /// Accepts `f` (file), `d` (directory) or `l` (symlink).
    pub fn with_type_token(self, token: &str) -> Result<Self> {
        let kind = match token {
            "f" => EntryKind::File,
            "d" => EntryKind::Dir,
            "l" => EntryKind::Symlink,
            _ => bail!("can't parse file type: {}. Must be one of {{dfl}}", token),
        };
        Ok(self.with_type(kind))
    }

    pub fn with_time(mut self, window: TimeWindow) -> Self {
        self.flags = self.flags.set(FilterBits::for_time(window.field));
        self.time = Some(window);
        self
    }

    pub fn with_delete(mut self, delete: bool) -> Self {
        self.delete = delete;
        self
    }

    /// True when an entry of `kind` can't be judged from its own metadata and must wait
    /// for its scan to finish (directory + size filter).
    pub fn defers(&self, kind: EntryKind) -> bool {
        kind == EntryKind::Dir && self.flags.has(FilterBits::SIZE)
    }

    /// AND of every active filter. An empty mask matches everything.
    pub fn predicate(&self) -> Predicate {
        let mut terms = Vec::new();
        if self.flags.has(FilterBits::TYPE_ANY) {
            terms.push(Predicate::Type(FilterBits(
                self.flags.bits() & FilterBits::TYPE_ANY.bits(),
            )));
        }
        if let (true, Some(pattern)) = (self.flags.has(FilterBits::NAME), &self.name) {
            terms.push(Predicate::Name(pattern.clone()));
        }
        if let (true, Some(spec)) = (self.flags.has(FilterBits::SIZE), self.size) {
            terms.push(Predicate::Size(spec));
        }
        if let (true, Some(window)) = (self.flags.has(FilterBits::TIME_ANY), self.time) {
            terms.push(Predicate::Time(window));
        }
        Predicate::all(terms)
    }
}
