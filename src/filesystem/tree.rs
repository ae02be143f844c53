use derive_more::Display;
use snafu::Snafu;
use tracing::{debug, error};

/// Index of a [`Leaf`] inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("#{_0}")]
pub struct LeafId(usize);

/// A node of the gathered tree. Despite the name it may have children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    name: String,
    size: u64,
    // Attach order; iterated newest first.
    children: Vec<LeafId>,
}

impl Leaf {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Arena of every [`Leaf`] reachable from a synthetic `/` root.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Leaf>,
}

const ROOT: LeafId = LeafId(0);

impl Tree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Leaf::new("/", 0)],
        }
    }

    pub fn root(&self) -> LeafId {
        ROOT
    }

    pub fn get(&self, id: LeafId) -> Option<&Leaf> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, the synthetic root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Moves `leaf` into the tree as the newest child of `parent`.
    pub fn attach(&mut self, parent: LeafId, leaf: Leaf) -> Result<LeafId, TreeError> {
        if parent.0 >= self.nodes.len() {
            return Err(TreeError::UnknownParentError { parent });
        }

        let id = LeafId(self.nodes.len());
        self.nodes.push(leaf);
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Children of `id`, most recently attached first.
    pub fn children(&self, id: LeafId) -> impl Iterator<Item = LeafId> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(|leaf| leaf.children.iter().rev().copied())
    }

    /// Releases every node, depth first from the root.
    pub fn reclaim(self) -> Reclaimed {
        let mut slots = self.nodes.into_iter().map(Some).collect::<Vec<_>>();
        let mut released = 0;
        let mut pending = vec![ROOT];

        while let Some(id) = pending.pop() {
            match slots.get_mut(id.0).and_then(Option::take) {
                Some(leaf) => {
                    // Newest child is pushed last so it is released first.
                    pending.extend(leaf.children.iter().copied());
                    released += 1;
                }
                None => error!("Leaf {} was reached twice while reclaiming", id),
            }
        }

        let unreachable = slots.into_iter().flatten().count();
        if unreachable > 0 {
            error!("{} leaves were not reachable from the root", unreachable);
        }

        debug!("Reclaimed {} leaves", released);
        Reclaimed {
            released,
            unreachable,
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of [`Tree::reclaim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reclaimed {
    /// Nodes released through the depth first walk, root included
    pub released: usize,
    pub unreachable: usize,
}

#[derive(Debug, Snafu)]
pub enum TreeError {
    #[snafu(display("Cannot attach to unknown parent leaf {}", parent))]
    UnknownParentError { parent: LeafId },
}
