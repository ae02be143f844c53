use std::path::{Path, PathBuf};

use derive_more::Constructor;
use snafu::Snafu;

pub trait Disk {
    /// Lists the entries of the directory at `path`.
    ///
    /// Implementations may resolve immediately or later; callers make no
    /// assumption about entry order.
    async fn list(&self, path: &Path) -> Result<Vec<Entry>, ListingError>;
}

/// One item of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Entry {
    name: String,
    size: u64,
    is_dir: bool,
}

impl Entry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// True for the `.` and `..` self/parent links.
    pub fn is_dot(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ListingError {
    #[snafu(display("listing failed for directory {}: {}", path.display(), source))]
    ReadDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("listing failed for directory {}: could not dispatch read: {}", path.display(), error))]
    DispatchError { path: PathBuf, error: String },
    #[snafu(display("listing failed for directory {}: read was canceled", path.display()))]
    CanceledError {
        path: PathBuf,
        source: futures_channel::oneshot::Canceled,
    },
    #[snafu(display("listing failed for directory {}: {}", path.display(), message))]
    UnavailableError { path: PathBuf, message: String },
}

impl ListingError {
    pub fn path(&self) -> &Path {
        match self {
            ListingError::ReadDirError { path, .. }
            | ListingError::DispatchError { path, .. }
            | ListingError::CanceledError { path, .. }
            | ListingError::UnavailableError { path, .. } => path,
        }
    }
}
