//! Multi-criterion entry filters for `find`.

pub mod control;
pub mod predicate;
pub mod size_spec;
pub mod time_spec;

pub use control::{FilterBits, FindControl};
pub use predicate::{EntryView, Predicate};
pub use size_spec::{SizeOp, SizeSpec};
pub use time_spec::{TimeWindow, parse_duration};
