//! Directory listing collaborators.
//!
//! The gather only ever talks to a [`Disk`]: something that, given a
//! directory path, eventually yields the entries of that directory or an
//! error. [`LocalDisk`] reads the real filesystem on a pool of worker
//! threads, so listings complete in whatever order the workers finish.

mod disk;
mod local_disk;
#[cfg(test)]
pub mod memory_disk;

pub use disk::{Disk, Entry, ListingError};
pub use local_disk::{LocalDisk, LocalDiskCreationError};
