use std::fmt;

use crate::filesystem::{LeafId, Tree};
use crate::gather::GatherStats;

const RULE: &str =
    "================================================================================";

pub const DEFAULT_TITLE: &str = "STATIC CONTENT LISTING";
pub const DEFAULT_INDENT: usize = 3;

/// Presentation settings for a [`Report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStyle {
    pub title: String,
    /// Columns per depth level
    pub indent: usize,
    /// Paint failure diagnostics
    pub color: bool,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            indent: DEFAULT_INDENT,
            color: false,
        }
    }
}

/// Indented listing of a fully gathered tree followed by its counts.
///
/// Nodes with children are printed as `+-[ name ]` headers, everything
/// else as `+ name (size)`. The root itself is not printed; its children
/// sit at depth one.
pub struct Report<'a> {
    tree: &'a Tree,
    stats: &'a GatherStats,
    style: &'a ReportStyle,
}

impl<'a> Report<'a> {
    pub fn new(tree: &'a Tree, stats: &'a GatherStats, style: &'a ReportStyle) -> Self {
        Self { tree, stats, style }
    }

    pub fn render(&self, out: &mut impl fmt::Write) -> fmt::Result {
        writeln!(out)?;
        writeln!(out, "{RULE}")?;
        writeln!(out, "{}", self.style.title)?;
        writeln!(out, "{RULE}")?;

        self.render_children(out, self.tree.root(), 1)?;

        writeln!(out)?;
        writeln!(
            out,
            "{} directories, {} files",
            self.stats.directories, self.stats.files
        )?;
        writeln!(out, "{RULE}")
    }

    /// Depth first over an explicit stack, so tree depth is not bounded by the call stack.
    fn render_children(
        &self,
        out: &mut impl fmt::Write,
        parent: LeafId,
        depth: usize,
    ) -> fmt::Result {
        let mut pending = Vec::new();
        self.push_children(&mut pending, parent, depth);

        while let Some((id, depth)) = pending.pop() {
            let Some(leaf) = self.tree.get(id) else {
                continue;
            };
            let pad = (depth * self.style.indent).saturating_sub(1);

            if leaf.has_children() {
                writeln!(out, "{:pad$}+-[ {} ]", "", leaf.name())?;
                self.push_children(&mut pending, id, depth + 1);
            } else {
                writeln!(out, "{:pad$}+ {} ({})", "", leaf.name(), leaf.size())?;
            }
        }

        Ok(())
    }

    // Reversed so the newest child is popped first.
    fn push_children(&self, pending: &mut Vec<(LeafId, usize)>, parent: LeafId, depth: usize) {
        let start = pending.len();
        pending.extend(self.tree.children(parent).map(|id| (id, depth)));
        pending[start..].reverse();
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f)
    }
}
