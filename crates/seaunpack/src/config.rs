//! Run configuration: command line and environment first, then an optional TOML file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use figment::{
    Figment,
    providers::{self, Format},
};
use seaunpack_remote::Credentials;
use seaunpack_remote::path;
use serde::Deserialize;

use crate::cli::Cli;

/// Keys accepted in the configuration file; all optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub repo: Option<String>,
    pub path: Option<String>,
    pub scratch_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self> {
        // The TOML provider treats a missing file as empty
        if !path.is_file() {
            bail!("config file {} not found", path.display());
        }
        Figment::new()
            .merge(providers::Toml::file(path))
            .extract()
            .with_context(|| format!("invalid config file {}", path.display()))
    }
}

/// Where to start the walk when the interactive menu is skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    /// Library id or exact name.
    pub repo: String,
    pub path: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server: String,
    pub credentials: Credentials,
    pub target: Option<Target>,
    pub scratch_dir: Option<PathBuf>,
}

impl Config {
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    fn merge(cli: &Cli, file: FileConfig) -> Result<Self> {
        let server = cli
            .server
            .clone()
            .or(file.server)
            .context("missing server URL (--server, SEAFILE_SERVER or `server` in the config file)")?;
        let username = cli
            .username
            .clone()
            .or(file.username)
            .context("missing login name (--username, SEAFILE_USERNAME or `username` in the config file)")?;
        let password = cli
            .password
            .clone()
            .or(file.password)
            .context("missing password (--password, SEAFILE_PASSWORD or `password` in the config file)")?;

        // Command-line repo replaces the file's repo and path together
        let (repo, start) = match &cli.repo {
            Some(repo) => (Some(repo.clone()), cli.path.clone()),
            None => (file.repo, file.path),
        };
        let target = match (repo, start) {
            (Some(repo), start) => Some(Target {
                repo,
                path: path::normalize(start.as_deref().unwrap_or(path::ROOT)),
            }),
            (None, Some(start)) => bail!("start path '{start}' given without a library"),
            (None, None) => None,
        };

        Ok(Self {
            server,
            credentials: Credentials { username, password },
            target,
            scratch_dir: cli.scratch_dir.clone().or(file.scratch_dir),
        })
    }
}
