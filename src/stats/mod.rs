//! Consumer-side statistics: size histogram and top-N trackers.

pub mod histogram;
pub mod topn;

pub use histogram::{CATCH_ALL, Histogram, parse_bins};
pub use topn::{TopItem, TopN};
