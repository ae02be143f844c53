use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::thread::available_parallelism;

use compio::dispatcher::{Dispatcher, DispatcherBuilder};
use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};

use super::disk::{CanceledSnafu, ReadDirSnafu};
use super::{Disk, Entry, ListingError};

/// Default number of worker threads when unable to determine system parallelism
const DEFAULT_WORKER_THREADS: usize = 1;

/// A [`Disk`] backed by the local filesystem.
///
/// Directory reads are blocking, so each one is dispatched onto a worker
/// thread and only the result travels back to the calling runtime.
pub struct LocalDisk {
    dispatcher: Dispatcher,
}

impl LocalDisk {
    pub fn new(workers: Option<NonZeroUsize>) -> Result<Self, LocalDiskCreationError> {
        let workers_num = workers.unwrap_or_else(Self::determine_worker_count);
        debug!("Using {} worker threads for directory reads", workers_num);

        let dispatcher = DispatcherBuilder::new()
            .worker_threads(workers_num)
            .build()
            .context(DispatcherSnafu)?;

        Ok(Self { dispatcher })
    }

    fn determine_worker_count() -> NonZeroUsize {
        available_parallelism()
            .ok()
            .or_else(|| NonZeroUsize::new(DEFAULT_WORKER_THREADS))
            .unwrap_or(NonZeroUsize::MIN)
    }
}

impl Disk for LocalDisk {
    async fn list(&self, path: &Path) -> Result<Vec<Entry>, ListingError> {
        let dir = path.to_path_buf();
        let receiver = self
            .dispatcher
            .dispatch(move || async move { read_entries(&dir) })
            .map_err(|e| ListingError::DispatchError {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        receiver.await.context(CanceledSnafu {
            path: path.to_path_buf(),
        })?
    }
}

/// Reads one directory without following symbolic links.
fn read_entries(dir: &Path) -> Result<Vec<Entry>, ListingError> {
    let read_dir = fs::read_dir(dir).context(ReadDirSnafu {
        path: dir.to_path_buf(),
    })?;

    let entries = read_dir
        .filter_map(|dir_entry| match dir_entry {
            Ok(dir_entry) => Some(dir_entry),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter_map(|dir_entry| {
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            match dir_entry.metadata() {
                Ok(metadata) if metadata.is_dir() => Some(Entry::new(name, 0, true)),
                Ok(metadata) => Some(Entry::new(name, metadata.len(), false)),
                Err(e) => {
                    warn!("Skipping '{}' in {}: {}", name, dir.display(), e);
                    None
                }
            }
        })
        .collect::<Vec<_>>();

    debug!("Read {} entries from {}", entries.len(), dir.display());
    Ok(entries)
}

#[derive(Debug, Snafu)]
pub enum LocalDiskCreationError {
    #[snafu(display("Failed to create directory read dispatcher"))]
    DispatcherError { source: std::io::Error },
}
