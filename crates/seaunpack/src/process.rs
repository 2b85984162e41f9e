//! Per-archive pipeline: idempotency check, download, extract, mirror upload.
//!
//! Every failure is converted into an [`Outcome`] here; nothing below the walk
//! aborts the run.

use std::fmt;
use std::path::{Path, PathBuf};

use seaunpack_archive::{EXTRACTED_SUFFIX, extract_file, target_folder_name};
use seaunpack_remote::{RemoteEntry, RemoteStore, path};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Pipeline step at which an archive was abandoned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Workspace,
    Download,
    Extract,
    CreateTarget,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Workspace => "workspace",
            Stage::Download => "download",
            Stage::Extract => "extract",
            Stage::CreateTarget => "create target",
        };
        f.write_str(name)
    }
}

/// Counters for one mirrored upload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// Remote folder the archive was extracted into.
    pub target: String,
    pub dirs_created: usize,
    pub files_uploaded: usize,
    pub dir_failures: usize,
    pub upload_failures: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Extracted(UploadSummary),
    Skipped { target: String },
    Failed { stage: Stage, reason: String },
}

impl Outcome {
    fn failed(stage: Stage, reason: impl fmt::Display) -> Self {
        Outcome::Failed {
            stage,
            reason: reason.to_string(),
        }
    }
}

/// Local and remote folder name for an archive.
///
/// A name made only of a suffix would strip to nothing, which would upload
/// into the archive's own directory.
pub fn extraction_target(archive_name: &str) -> String {
    let target = target_folder_name(archive_name);
    if target.is_empty() {
        format!("{archive_name}{EXTRACTED_SUFFIX}")
    } else {
        target
    }
}

pub struct ArchiveProcessor<'a, S> {
    store: &'a S,
    repo_id: &'a str,
    scratch: &'a Path,
}

impl<'a, S: RemoteStore> ArchiveProcessor<'a, S> {
    pub fn new(store: &'a S, repo_id: &'a str, scratch: &'a Path) -> Self {
        Self {
            store,
            repo_id,
            scratch,
        }
    }

    /// Handle the archive `archive` found in remote directory `dir`.
    pub async fn process(&self, dir: &str, archive: &RemoteEntry) -> Outcome {
        let target = extraction_target(&archive.name);
        let remote_archive = path::join(dir, &archive.name);
        let remote_target = path::join(dir, &target);

        match self.store.list_dir(self.repo_id, dir).await {
            Ok(entries) if entries.iter().any(|e| e.name == target) => {
                info!("skipping {remote_archive}: {remote_target} already exists");
                return Outcome::Skipped {
                    target: remote_target,
                };
            }
            Ok(_) => {}
            Err(e) => warn!("could not re-list {dir} ({e}); assuming {target} is absent"),
        }

        // Dropped at the end of this call, taking the download and extracted tree with it
        let workspace = match tempfile::Builder::new()
            .prefix("archive-")
            .tempdir_in(self.scratch)
        {
            Ok(workspace) => workspace,
            Err(e) => {
                warn!("cannot create workspace for {remote_archive}: {e}");
                return Outcome::failed(Stage::Workspace, e);
            }
        };

        let local_archive = workspace.path().join(&archive.name);
        info!("downloading {remote_archive}");
        if let Err(e) = self
            .store
            .download_file(self.repo_id, &remote_archive, &local_archive)
            .await
        {
            warn!("download of {remote_archive} failed: {e}");
            return Outcome::failed(Stage::Download, e);
        }

        let extract_root = workspace.path().join(&target);
        info!("extracting {} into {target}", archive.name);
        if let Err(reason) = extract_blocking(local_archive, extract_root.clone()).await {
            warn!("extraction of {remote_archive} failed: {reason}");
            return Outcome::failed(Stage::Extract, reason);
        }

        if let Err(e) = self.store.create_dir(self.repo_id, &remote_target).await {
            warn!("cannot create {remote_target}, nothing uploaded for {remote_archive}: {e}");
            return Outcome::failed(Stage::CreateTarget, e);
        }

        let summary = self.upload_tree(&extract_root, remote_target).await;
        info!(
            "uploaded {} files into {} ({} failed)",
            summary.files_uploaded, summary.target, summary.upload_failures
        );
        Outcome::Extracted(summary)
    }

    /// Mirror the local tree under `local_root` into the existing remote directory `remote_root`.
    async fn upload_tree(&self, local_root: &Path, remote_root: String) -> UploadSummary {
        let mut summary = UploadSummary {
            target: remote_root,
            ..UploadSummary::default()
        };

        // Pre-order, so a directory is always created before its contents
        let entries: Vec<_> = WalkDir::new(local_root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .collect();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("cannot read extracted tree: {e}");
                    summary.upload_failures += 1;
                    continue;
                }
            };
            let Ok(relative) = entry.path().strip_prefix(local_root) else {
                continue;
            };

            if entry.file_type().is_dir() {
                let remote_dir = path::join_relative(&summary.target, relative);
                match self.store.create_dir(self.repo_id, &remote_dir).await {
                    Ok(()) => summary.dirs_created += 1,
                    Err(e) => {
                        warn!("cannot create {remote_dir}: {e}");
                        summary.dir_failures += 1;
                    }
                }
            } else if entry.file_type().is_file() {
                let parent = relative.parent().unwrap_or(Path::new(""));
                let remote_dir = path::join_relative(&summary.target, parent);
                debug!("uploading {} into {remote_dir}", relative.display());
                match self
                    .store
                    .upload_file(self.repo_id, &remote_dir, entry.path())
                    .await
                {
                    Ok(()) => summary.files_uploaded += 1,
                    Err(e) => {
                        warn!("upload of {} failed: {e}", relative.display());
                        summary.upload_failures += 1;
                    }
                }
            } else {
                debug!("not uploading {}: not a regular file", relative.display());
            }
        }
        summary
    }
}

async fn extract_blocking(archive: PathBuf, destination: PathBuf) -> Result<(), String> {
    match tokio::task::spawn_blocking(move || extract_file(&archive, &destination)).await {
        Ok(Ok(_report)) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("extraction task failed: {e}")),
    }
}
