use std::path::Path;
use std::process::ExitCode;

use tempfile::TempDir;
use tokio::runtime::Runtime;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use seaunpack_remote::{RemoteStore, SeafileClient};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod process;
mod run;
mod select;
#[cfg(test)]
mod testing;
mod walk;

use cli::Cli;
use config::{Config, Target};
use run::{RunError, Selection, run_walk};
use select::{ConsolePrompt, Selector};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("cannot start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut scratch = None;
    let code = runtime.block_on(app(config, &mut scratch));
    shut_down(runtime, scratch);
    code
}

/// Blocking extraction tasks still running after an interrupt finish before
/// the scratch area is removed.
fn shut_down(runtime: Runtime, scratch: Option<TempDir>) {
    drop(runtime);
    drop(scratch);
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("info,seaunpack=debug,seaunpack_archive=debug,seaunpack_remote=debug"),
        _ => EnvFilter::new("debug,seaunpack=trace,seaunpack_archive=trace,seaunpack_remote=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn app(config: Config, scratch_slot: &mut Option<TempDir>) -> ExitCode {
    let client = match SeafileClient::login(&config.server, &config.credentials).await {
        Ok(client) => client,
        Err(e) => {
            error!("login to {} failed: {e}", config.server);
            return ExitCode::FAILURE;
        }
    };
    info!("logged in to {} as {}", client.server(), config.credentials.username);

    let selection = match &config.target {
        Some(target) => match resolve_target(&client, target).await {
            Ok(selection) => selection,
            Err(e) => {
                error!("{e:#}");
                return ExitCode::FAILURE;
            }
        },
        None => match Selector::new(&client, ConsolePrompt::new()).run().await {
            Some(selection) => selection,
            None => {
                info!("nothing selected");
                return ExitCode::SUCCESS;
            }
        },
    };

    // Owned by the caller so it outlives the runtime's blocking tasks
    let scratch = match create_scratch(config.scratch_dir.as_deref()) {
        Ok(scratch) => scratch_slot.insert(scratch),
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        result = run_walk(&client, &selection, scratch.path()) => match result {
            Ok(report) => {
                info!("done");
                println!("{report}");
                ExitCode::SUCCESS
            }
            Err(e @ RunError::RootListing { .. }) => {
                error!("{e}");
                ExitCode::SUCCESS
            }
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, removing {} once extraction stops", scratch.path().display());
            ExitCode::FAILURE
        }
    }
}

/// Find the library named on the command line, by id or by exact name.
async fn resolve_target<S: RemoteStore>(store: &S, target: &Target) -> Result<Selection> {
    let repos = store.list_repos().await.context("cannot list libraries")?;
    let repo = repos
        .iter()
        .find(|r| r.id == target.repo)
        .or_else(|| repos.iter().find(|r| r.name == target.repo))
        .ok_or_else(|| anyhow!("no library with id or name '{}'", target.repo))?;
    Ok(Selection {
        repo_id: repo.id.clone(),
        repo_name: repo.name.clone(),
        path: target.path.clone(),
    })
}

fn create_scratch(parent: Option<&Path>) -> Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("seaunpack-");
    match parent {
        Some(parent) => builder
            .tempdir_in(parent)
            .with_context(|| format!("cannot create scratch directory in {}", parent.display())),
        None => builder.tempdir().context("cannot create scratch directory"),
    }
}
