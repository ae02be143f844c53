use std::path::{Path, PathBuf};
use std::rc::Rc;

use compio::runtime::spawn;
use futures::StreamExt;
use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::disk::{Disk, Entry, ListingError};
use crate::filesystem::{Leaf, LeafId, Tree};
use crate::gather::live_requests::{Completion, LiveRequests};

/// The result of one listing request, sent back to the gather loop.
struct Listed {
    parent: LeafId,
    path: PathBuf,
    depth: usize,
    result: Result<Vec<Entry>, ListingError>,
}

/// Counters accumulated while gathering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatherStats {
    pub directories: usize,
    pub files: usize,
    /// One diagnostic line per failed listing
    pub failures: Vec<String>,
    pub requests: usize,
    pub peak_outstanding: usize,
}

#[derive(Debug)]
pub struct Gathered {
    pub tree: Tree,
    pub stats: GatherStats,
    /// False when the gather loop stopped before every request completed.
    pub complete: bool,
}

/// A single gather over one disk.
///
/// Each session owns its tree and request counter and is consumed by
/// [`Gather::run`], so two gathers never share state.
pub struct Gather<D> {
    disk: Rc<D>,
    tree: Tree,
    live: LiveRequests,
    stats: GatherStats,
}

impl<D: Disk + 'static> Gather<D> {
    pub fn new(disk: Rc<D>) -> Self {
        Self {
            disk,
            tree: Tree::new(),
            live: LiveRequests::default(),
            stats: GatherStats::default(),
        }
    }

    /// Lists `root` and every directory below it.
    ///
    /// Resolves once the last outstanding listing has been attached.
    pub async fn run(mut self, root: &Path) -> Gathered {
        info!("Gathering content listing of {}", root.display());
        let (listed_sender, mut listed_receiver) = mpsc::unbounded::<Listed>();

        let root_leaf = self.tree.root();
        self.issue(&listed_sender, root_leaf, root.to_path_buf(), 0);

        let complete = self
            .process_listings(&mut listed_receiver, &listed_sender)
            .await;

        self.stats.requests = self.live.issued();
        self.stats.peak_outstanding = self.live.peak();
        info!(
            "Gathered {} directories and {} files with {} requests",
            self.stats.directories, self.stats.files, self.stats.requests
        );

        Gathered {
            tree: self.tree,
            stats: self.stats,
            complete,
        }
    }

    /// Counts the request, then hands it to the disk on a detached task.
    fn issue(
        &mut self,
        listed_sender: &UnboundedSender<Listed>,
        parent: LeafId,
        path: PathBuf,
        depth: usize,
    ) {
        self.live.issue();
        debug!(
            "Issued listing of {} at depth {} ({} outstanding)",
            path.display(),
            depth,
            self.live.outstanding()
        );

        let disk = Rc::clone(&self.disk);
        let listed_sender = listed_sender.clone();
        spawn(async move {
            let result = disk.list(&path).await;
            let listed = Listed {
                parent,
                path,
                depth,
                result,
            };

            if let Err(send_err) = listed_sender.unbounded_send(listed) {
                debug!("Failed to deliver listing result: {}", send_err);
            }
        })
        .detach();
    }

    /// Attaches results as they arrive until the request count drains.
    async fn process_listings(
        &mut self,
        listed_receiver: &mut UnboundedReceiver<Listed>,
        listed_sender: &UnboundedSender<Listed>,
    ) -> bool {
        while let Some(listed) = listed_receiver.next().await {
            match self.handle_listing(listed, listed_sender) {
                Completion::Drained => {
                    debug!("All listing requests completed");
                    return true;
                }
                Completion::Pending(outstanding) => {
                    debug!("{} listing requests still outstanding", outstanding);
                }
                Completion::Unbalanced => return false,
            }
        }

        // The loop holds a sender, so the channel only closes if the runtime drops our tasks
        warn!(
            "Listing results stopped arriving with {} requests outstanding",
            self.live.outstanding()
        );
        false
    }

    fn handle_listing(
        &mut self,
        listed: Listed,
        listed_sender: &UnboundedSender<Listed>,
    ) -> Completion {
        let Listed {
            parent,
            path,
            depth,
            result,
        } = listed;

        match result {
            Ok(entries) => self.attach_entries(listed_sender, parent, &path, depth, entries),
            Err(error) => {
                warn!("{}", error);
                debug!("{} contributes no children", error.path().display());
                let stage = if depth == 0 { "init" } else { "recurse" };
                self.stats
                    .failures
                    .push(format!("cstat ({stage}): ERROR: {error}"));
            }
        }

        self.live.complete()
    }

    fn attach_entries(
        &mut self,
        listed_sender: &UnboundedSender<Listed>,
        parent: LeafId,
        path: &Path,
        depth: usize,
        entries: Vec<Entry>,
    ) {
        for entry in entries.into_iter().filter(|entry| !entry.is_dot()) {
            // Entries of the root listing keep the leading separator
            let name = if depth == 0 {
                format!("/{}", entry.name())
            } else {
                entry.name().to_string()
            };

            let leaf = match self.tree.attach(parent, Leaf::new(name, entry.size())) {
                Ok(leaf) => leaf,
                Err(e) => {
                    error!("Dropping entry '{}': {}", entry.name(), e);
                    continue;
                }
            };

            if entry.is_dir() {
                self.stats.directories += 1;
                self.issue(listed_sender, leaf, path.join(entry.name()), depth + 1);
            } else {
                self.stats.files += 1;
            }
        }
    }
}
