use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Clone, Debug, Parser)]
#[command(
    name = "seaunpack",
    version = env!("CARGO_PKG_VERSION"),
    about = "Extract archives stored in a Seafile library and upload the contents next to them",
    long_about = None
)]
pub struct Cli {
    /// Seafile server URL, e.g. https://cloud.example.com
    #[arg(long, env = "SEAFILE_SERVER")]
    pub server: Option<String>,

    #[arg(short, long, env = "SEAFILE_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "SEAFILE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// TOML file providing any of the options above
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Library id or name; skips the interactive menu
    #[arg(long)]
    pub repo: Option<String>,

    /// Directory inside the library to start from
    #[arg(long, requires = "repo")]
    pub path: Option<String>,

    /// Parent directory for the temporary working area
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn path_requires_repo() {
        let result = Cli::try_parse_from(["seaunpack", "--path", "/data"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_non_interactive_target() {
        let cli = Cli::try_parse_from([
            "seaunpack",
            "--server",
            "https://cloud.example.com",
            "--repo",
            "Team",
            "--path",
            "/data",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.repo.as_deref(), Some("Team"));
        assert_eq!(cli.path.as_deref(), Some("/data"));
        assert_eq!(cli.verbose, 2);
    }
}
