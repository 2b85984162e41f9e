use std::future::Future;
use std::path::Path;

use crate::data::{RemoteEntry, Repo, RepoDetails};
use crate::error::Result;

/// Remote file-hosting abstraction.
///
/// This trait provides the minimal interface the unpacking pipeline needs.
/// Repositories are addressed by id and paths are absolute within the
/// repository (see [`crate::path`]).
///
/// # Implementations
///
/// - [`crate::SeafileClient`]: Production implementation using `reqwest`
/// - In-memory fakes for testing
pub trait RemoteStore: Send + Sync {
    /// Libraries visible to the authenticated account.
    fn list_repos(&self) -> impl Future<Output = Result<Vec<Repo>>> + Send;

    fn repo_details(&self, repo_id: &str) -> impl Future<Output = Result<RepoDetails>> + Send;

    /// List the entries directly inside `path`.
    fn list_dir(
        &self,
        repo_id: &str,
        path: &str,
    ) -> impl Future<Output = Result<Vec<RemoteEntry>>> + Send;

    /// Download the file at `remote_path` to `local_path`, overwriting it.
    fn download_file(
        &self,
        repo_id: &str,
        remote_path: &str,
        local_path: &Path,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Upload `local_path` into the existing remote directory `remote_dir`,
    /// keeping its file name.
    fn upload_file(
        &self,
        repo_id: &str,
        remote_dir: &str,
        local_path: &Path,
    ) -> impl Future<Output = Result<()>> + Send;

    fn create_dir(&self, repo_id: &str, path: &str) -> impl Future<Output = Result<()>> + Send;
}
