use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use colored::Colorize;
use compio::runtime::spawn;
use futures_channel::oneshot;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info, warn};

use crate::disk::Disk;
use crate::gather::{Gather, Gathered};
use crate::report::{Report, ReportStyle};

/// What one listing run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingSummary {
    pub directories: usize,
    pub files: usize,
    pub failures: usize,
    /// Tree nodes released after rendering, the synthetic root included
    pub released: usize,
    pub complete: bool,
}

/// Gathers `root`, writes the report to `sink`, then discards the tree.
pub async fn list_static_content<D, W>(
    disk: Rc<D>,
    root: &Path,
    style: &ReportStyle,
    sink: &mut W,
) -> Result<ListingSummary, ListingRunError>
where
    D: Disk + 'static,
    W: Write,
{
    let gathered = Gather::new(disk).run(root).await;
    if !gathered.complete {
        warn!("Reporting an incomplete listing of {}", root.display());
    }

    let written = write_listing(sink, &gathered, style);

    let stats = gathered.stats;
    let gathered_nodes = gathered.tree.len();
    let reclaimed = gathered.tree.reclaim();
    if reclaimed.released != gathered_nodes {
        warn!(
            "Released {} of {} listing nodes",
            reclaimed.released, gathered_nodes
        );
    }
    debug!("Discarded listing tree of {} nodes", reclaimed.released);

    written.context(WriteSnafu {
        root: root.to_path_buf(),
    })?;

    let summary = ListingSummary {
        directories: stats.directories,
        files: stats.files,
        failures: stats.failures.len(),
        released: reclaimed.released,
        complete: gathered.complete,
    };
    info!("Listed {}: {:?}", root.display(), summary);
    Ok(summary)
}

fn write_listing<W: Write>(
    sink: &mut W,
    gathered: &Gathered,
    style: &ReportStyle,
) -> std::io::Result<()> {
    for failure in &gathered.stats.failures {
        if style.color {
            writeln!(sink, "{}", failure.red())?;
        } else {
            writeln!(sink, "{failure}")?;
        }
    }

    let report = Report::new(&gathered.tree, &gathered.stats, style);
    write!(sink, "{report}")?;
    sink.flush()
}

/// Starts a listing in the background and returns immediately.
///
/// The receiver resolves once the report has been written and the tree
/// discarded.
pub fn start<D, W>(
    disk: Rc<D>,
    root: PathBuf,
    style: ReportStyle,
    mut sink: W,
) -> oneshot::Receiver<Result<ListingSummary, ListingRunError>>
where
    D: Disk + 'static,
    W: Write + 'static,
{
    let (summary_sender, summary_receiver) = oneshot::channel();

    spawn(async move {
        let result = list_static_content(disk, &root, &style, &mut sink).await;
        if summary_sender.send(result).is_err() {
            debug!(
                "Listing of {} finished after its caller stopped waiting",
                root.display()
            );
        }
    })
    .detach();

    summary_receiver
}

#[derive(Debug, Snafu)]
pub enum ListingRunError {
    #[snafu(display("Failed to write the content listing of {}", root.display()))]
    WriteError {
        root: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::LocalDisk;
    use crate::disk::memory_disk::{MemoryDisk, dir, file};
    use std::fs::{self, File};
    use std::num::NonZeroUsize;
    use tempfile::TempDir;

    const RULE: &str =
        "================================================================================";

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn example_disk() -> MemoryDisk {
        MemoryDisk::default()
            .with_dir("/", vec![dir("a"), file("y", 5)])
            .with_dir("/a", vec![file("x", 10)])
    }

    async fn render_to_string<D: Disk + 'static>(disk: Rc<D>, root: &Path) -> (String, ListingSummary) {
        let mut sink = Vec::new();
        let summary = list_static_content(disk, root, &ReportStyle::default(), &mut sink)
            .await
            .expect("Listing failed");
        (String::from_utf8(sink).expect("Report is not UTF-8"), summary)
    }

    #[compio::test]
    async fn prints_the_documented_example() {
        let (output, summary) = render_to_string(Rc::new(example_disk()), Path::new("/")).await;

        let expected = format!(
            "\n{RULE}\nSTATIC CONTENT LISTING\n{RULE}\n  + /y (5)\n  +-[ /a ]\n     + x (10)\n\n1 directories, 2 files\n{RULE}\n"
        );
        assert_eq!(output, expected);
        assert_eq!(
            summary,
            ListingSummary {
                directories: 1,
                files: 2,
                failures: 0,
                released: 4,
                complete: true,
            }
        );
    }

    #[compio::test]
    async fn diagnostics_precede_the_report() {
        let disk = Rc::new(
            MemoryDisk::default()
                .with_dir("/", vec![dir("bad"), file("ok", 1)])
                .failing("/bad", "read error"),
        );

        let (output, summary) = render_to_string(disk, Path::new("/")).await;

        assert!(output.starts_with("cstat (recurse): ERROR: listing failed for directory /bad"));
        assert!(output.contains("  + /ok (1)\n"));
        assert!(output.contains("  + /bad (0)\n"));
        assert!(output.contains("1 directories, 1 files"));
        assert_eq!(summary.failures, 1);
    }

    #[compio::test]
    async fn reclaims_every_gathered_node() {
        let disk = Rc::new(
            MemoryDisk::default()
                .with_dir("/", vec![dir("a"), dir("b"), file("f", 1)])
                .with_dir("/a", vec![dir("c"), file("g", 2)])
                .with_dir("/a/c", vec![file("h", 3)])
                .with_dir("/b", vec![])
                .delayed("/a/c", 10),
        );

        let (_, summary) = render_to_string(disk, Path::new("/")).await;

        // Synthetic root plus every directory and file
        assert_eq!(summary.released, 1 + summary.directories + summary.files);
        assert_eq!(summary.released, 1 + 3 + 3);
    }

    #[compio::test]
    async fn sequential_runs_produce_equal_reports() {
        let disk = Rc::new(example_disk());

        let first = render_to_string(Rc::clone(&disk), Path::new("/")).await;
        let second = render_to_string(Rc::clone(&disk), Path::new("/")).await;

        assert_eq!(first, second);
    }

    #[compio::test]
    async fn write_failure_is_reported() {
        let result = list_static_content(
            Rc::new(example_disk()),
            Path::new("/"),
            &ReportStyle::default(),
            &mut BrokenSink,
        )
        .await;

        assert!(matches!(result, Err(ListingRunError::WriteError { .. })));
    }

    #[compio::test]
    async fn start_returns_before_the_listing_completes() {
        let disk = Rc::new(example_disk().delayed("/", 20));

        let receiver = start(
            Rc::clone(&disk),
            PathBuf::from("/"),
            ReportStyle::default(),
            std::io::sink(),
        );
        // Nothing has been listed yet, the gather runs on its own task
        assert!(disk.listed().is_empty());

        let summary = receiver
            .await
            .expect("Listing task dropped its result")
            .expect("Listing failed");
        assert_eq!(summary.directories, 1);
        assert_eq!(summary.files, 2);
        assert_eq!(disk.listed().len(), 2);
    }

    #[compio::test]
    async fn lists_a_real_directory_tree() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("www/css")).expect("Failed to create dirs");
        fs::create_dir(root.join("empty")).expect("Failed to create dir");
        fs::write(root.join("index.html"), "<html></html>").expect("Failed to write file");
        fs::write(root.join("www/app.js"), "let x;").expect("Failed to write file");
        File::create(root.join("www/css/site.css")).expect("Failed to create file");

        let disk = Rc::new(LocalDisk::new(NonZeroUsize::new(2)).expect("Failed to create disk"));
        let (output, summary) = render_to_string(disk, root).await;

        assert_eq!(summary.directories, 3);
        assert_eq!(summary.files, 3);
        assert_eq!(summary.failures, 0);
        assert!(output.contains("  + /index.html (13)\n"));
        assert!(output.contains("  + /empty (0)\n"));
        assert!(output.contains("  +-[ /www ]\n"));
        assert!(output.contains("     +-[ css ]\n"));
        assert!(output.contains("        + site.css (0)\n"));
        assert!(output.contains("     + app.js (6)\n"));
        assert!(output.contains("3 directories, 3 files"));
    }
}
