//! Asynchronous recursive gather of a directory hierarchy.
//!
//! [`Gather`] issues one listing per directory and attaches results as
//! they come back, in whatever order that is. A live request counter
//! tells it when nothing is left in flight. [`start`]
//! wraps a gather with rendering and reclaiming the tree.

mod gather;
mod live_requests;
mod static_listing;

pub use gather::{Gather, GatherStats, Gathered};
pub use static_listing::{ListingRunError, start};
