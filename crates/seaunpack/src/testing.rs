//! In-memory remote store for exercising the pipeline without a server.

use std::collections::{BTreeMap, HashSet};
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Mutex;

use seaunpack_remote::{RemoteEntry, RemoteError, RemoteStore, Repo, RepoDetails, Result, path};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    ListDir(String),
    Download(String),
    CreateDir(String),
    Upload(String),
}

#[derive(Default)]
pub struct FakeStore {
    repos: Vec<Repo>,
    dirs: Mutex<BTreeMap<String, Vec<RemoteEntry>>>,
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    calls: Mutex<Vec<Call>>,
    fail_list: HashSet<String>,
    fail_download: HashSet<String>,
    fail_create: HashSet<String>,
    fail_upload: HashSet<String>,
}

fn injected(what: &str, target: &str) -> RemoteError {
    RemoteError::Status {
        status: 500,
        url: format!("fake://{what}{target}"),
    }
}

impl FakeStore {
    pub fn new() -> Self {
        let store = Self::default();
        store.dirs.lock().unwrap().insert(path::ROOT.to_string(), Vec::new());
        store
    }

    pub fn with_repo(mut self, id: &str, name: &str) -> Self {
        self.repos.push(Repo {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    /// Create `dir` and any missing ancestors.
    pub fn with_dir(self, dir: &str) -> Self {
        self.insert_dir(&path::normalize(dir));
        self
    }

    pub fn with_file(self, file: &str, content: &[u8]) -> Self {
        let file = path::normalize(file);
        let parent = path::parent(&file);
        self.insert_dir(&parent);
        self.insert_entry(&parent, RemoteEntry::file(name_of(&file)));
        self.files.lock().unwrap().insert(file, content.to_vec());
        self
    }

    /// Append a raw listing row, duplicates included.
    pub fn with_entry(self, dir: &str, entry: RemoteEntry) -> Self {
        self.dirs
            .lock()
            .unwrap()
            .entry(path::normalize(dir))
            .or_default()
            .push(entry);
        self
    }

    pub fn failing_list(mut self, dir: &str) -> Self {
        self.fail_list.insert(path::normalize(dir));
        self
    }

    pub fn failing_download(mut self, file: &str) -> Self {
        self.fail_download.insert(path::normalize(file));
        self
    }

    pub fn failing_create(mut self, dir: &str) -> Self {
        self.fail_create.insert(path::normalize(dir));
        self
    }

    pub fn failing_upload(mut self, file: &str) -> Self {
        self.fail_upload.insert(path::normalize(file));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Download(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upload(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn file(&self, file: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(file).cloned()
    }

    pub fn has_dir(&self, dir: &str) -> bool {
        self.dirs.lock().unwrap().contains_key(dir)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn insert_dir(&self, dir: &str) {
        if self.dirs.lock().unwrap().contains_key(dir) {
            return;
        }
        if !path::is_root(dir) {
            let parent = path::parent(dir);
            self.insert_dir(&parent);
            self.insert_entry(&parent, RemoteEntry::dir(name_of(dir)));
        }
        self.dirs.lock().unwrap().insert(dir.to_string(), Vec::new());
    }

    fn insert_entry(&self, dir: &str, entry: RemoteEntry) {
        let mut dirs = self.dirs.lock().unwrap();
        let listing = dirs.entry(dir.to_string()).or_default();
        if !listing.iter().any(|e| e.name == entry.name) {
            listing.push(entry);
        }
    }
}

fn name_of(remote: &str) -> String {
    remote.rsplit('/').next().unwrap_or_default().to_string()
}

impl RemoteStore for FakeStore {
    async fn list_repos(&self) -> Result<Vec<Repo>> {
        Ok(self.repos.clone())
    }

    async fn repo_details(&self, repo_id: &str) -> Result<RepoDetails> {
        let repo = self
            .repos
            .iter()
            .find(|r| r.id == repo_id)
            .ok_or_else(|| RemoteError::NotFound(repo_id.to_string()))?;
        Ok(RepoDetails {
            id: repo.id.clone(),
            name: repo.name.clone(),
        })
    }

    async fn list_dir(&self, _repo_id: &str, dir: &str) -> Result<Vec<RemoteEntry>> {
        self.record(Call::ListDir(dir.to_string()));
        if self.fail_list.contains(dir) {
            return Err(injected("list", dir));
        }
        self.dirs
            .lock()
            .unwrap()
            .get(dir)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(dir.to_string()))
    }

    async fn download_file(&self, _repo_id: &str, remote_path: &str, local_path: &Path) -> Result<()> {
        self.record(Call::Download(remote_path.to_string()));
        if self.fail_download.contains(remote_path) {
            return Err(injected("download", remote_path));
        }
        let content = self
            .file(remote_path)
            .ok_or_else(|| RemoteError::NotFound(remote_path.to_string()))?;
        std::fs::write(local_path, content).map_err(|source| RemoteError::Io {
            path: local_path.to_path_buf(),
            source,
        })
    }

    async fn upload_file(&self, _repo_id: &str, remote_dir: &str, local_path: &Path) -> Result<()> {
        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target = path::join(remote_dir, &name);
        self.record(Call::Upload(target.clone()));
        if self.fail_upload.contains(&target) {
            return Err(injected("upload", &target));
        }
        if !self.has_dir(remote_dir) {
            return Err(RemoteError::NotFound(remote_dir.to_string()));
        }
        let content = std::fs::read(local_path).map_err(|source| RemoteError::Io {
            path: local_path.to_path_buf(),
            source,
        })?;
        self.insert_entry(remote_dir, RemoteEntry::file(name));
        self.files.lock().unwrap().insert(target, content);
        Ok(())
    }

    async fn create_dir(&self, _repo_id: &str, dir: &str) -> Result<()> {
        self.record(Call::CreateDir(dir.to_string()));
        if self.fail_create.contains(dir) {
            return Err(injected("mkdir", dir));
        }
        let parent = path::parent(dir);
        if !self.has_dir(&parent) {
            return Err(RemoteError::NotFound(parent));
        }
        self.insert_dir(dir);
        Ok(())
    }
}

/// Build an in-memory zip archive.
pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
