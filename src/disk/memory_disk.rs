//! In-memory [`Disk`] used by tests to script listings, failures and
//! completion order.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Disk, Entry, ListingError};

pub fn file(name: &str, size: u64) -> Entry {
    Entry::new(name.to_string(), size, false)
}

pub fn dir(name: &str) -> Entry {
    Entry::new(name.to_string(), 0, true)
}

#[derive(Debug, Default)]
pub struct MemoryDisk {
    directories: HashMap<PathBuf, Vec<Entry>>,
    failures: HashMap<PathBuf, String>,
    delays: HashMap<PathBuf, Duration>,
    listed: RefCell<Vec<PathBuf>>,
    in_flight: Cell<usize>,
    peak_in_flight: Cell<usize>,
}

impl MemoryDisk {
    pub fn with_dir(mut self, path: impl Into<PathBuf>, entries: Vec<Entry>) -> Self {
        self.directories.insert(path.into(), entries);
        self
    }

    pub fn failing(mut self, path: impl Into<PathBuf>, message: &str) -> Self {
        self.failures.insert(path.into(), message.to_string());
        self
    }

    /// Holds back the listing of `path` for `millis` before it completes.
    pub fn delayed(mut self, path: impl Into<PathBuf>, millis: u64) -> Self {
        self.delays.insert(path.into(), Duration::from_millis(millis));
        self
    }

    pub fn listed(&self) -> Vec<PathBuf> {
        self.listed.borrow().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.get()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }
}

impl Disk for MemoryDisk {
    async fn list(&self, path: &Path) -> Result<Vec<Entry>, ListingError> {
        self.listed.borrow_mut().push(path.to_path_buf());
        self.in_flight.set(self.in_flight.get() + 1);
        self.peak_in_flight
            .set(self.peak_in_flight.get().max(self.in_flight.get()));

        if let Some(delay) = self.delays.get(path) {
            compio::time::sleep(*delay).await;
        }

        self.in_flight.set(self.in_flight.get() - 1);

        if let Some(message) = self.failures.get(path) {
            return Err(ListingError::UnavailableError {
                path: path.to_path_buf(),
                message: message.clone(),
            });
        }

        self.directories
            .get(path)
            .cloned()
            .ok_or_else(|| ListingError::UnavailableError {
                path: path.to_path_buf(),
                message: "no such directory".to_string(),
            })
    }
}
