use std::fmt;
use std::path::Path;

use seaunpack_remote::{RemoteError, RemoteStore, path};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::process::{ArchiveProcessor, Outcome};
use crate::walk::{Walker, partition};

/// Library and directory the walk starts from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub repo_id: String,
    pub repo_name: String,
    pub path: String,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot list start directory '{path}': {source}")]
    RootListing {
        path: String,
        #[source]
        source: RemoteError,
    },
}

/// Totals for one walk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub dirs_listed: usize,
    pub listing_failures: usize,
    pub archives_found: usize,
    pub extracted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub files_uploaded: usize,
    /// Failed file uploads plus failed subdirectory creations.
    pub upload_failures: usize,
}

impl RunReport {
    pub fn record(&mut self, outcome: &Outcome) {
        self.archives_found += 1;
        match outcome {
            Outcome::Extracted(summary) => {
                self.extracted += 1;
                self.files_uploaded += summary.files_uploaded;
                self.upload_failures += summary.upload_failures + summary.dir_failures;
            }
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} directories listed ({} failed); {} archives found: {} extracted, {} skipped, {} failed; {} files uploaded ({} failed)",
            self.dirs_listed,
            self.listing_failures,
            self.archives_found,
            self.extracted,
            self.skipped,
            self.failed,
            self.files_uploaded,
            self.upload_failures,
        )
    }
}

/// Walk the selected tree breadth-first and process every archive found.
///
/// Only a failure to list the start directory is returned as an error; every
/// other failure is logged, counted and skipped.
pub async fn run_walk<S: RemoteStore>(
    store: &S,
    selection: &Selection,
    scratch: &Path,
) -> Result<RunReport, RunError> {
    match store.repo_details(&selection.repo_id).await {
        Ok(details) => info!("walking library '{}' from {}", details.name, selection.path),
        Err(e) => warn!("cannot read details of library '{}': {e}", selection.repo_name),
    }

    let root = path::normalize(&selection.path);
    let processor = ArchiveProcessor::new(store, &selection.repo_id, scratch);
    let mut walker = Walker::new(&root);
    let mut report = RunReport::default();

    while let Some(dir) = walker.next_dir() {
        let entries = match store.list_dir(&selection.repo_id, &dir).await {
            Ok(entries) => entries,
            Err(source) if dir == root => return Err(RunError::RootListing { path: dir, source }),
            Err(e) => {
                warn!("cannot list {dir}, skipping its subtree: {e}");
                report.listing_failures += 1;
                continue;
            }
        };
        report.dirs_listed += 1;

        let (archives, subdirs) = partition(entries);
        if archives.is_empty() {
            debug!("no archives in {dir}");
        } else {
            info!("found {} archive(s) in {dir}", archives.len());
        }

        for archive in &archives {
            let outcome = processor.process(&dir, archive).await;
            if let Outcome::Failed { stage, reason } = &outcome {
                warn!("{} abandoned at {stage} stage: {reason}", path::join(&dir, &archive.name));
            }
            report.record(&outcome);
        }

        for subdir in subdirs {
            walker.enqueue(&path::join(&dir, &subdir.name));
        }
    }

    debug!("walk finished after {} directories", walker.visited_count());
    Ok(report)
}
