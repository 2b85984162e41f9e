//! Interactive choice of the library and directory to start from.
//!
//! Navigation is an explicit state machine: [`transition`] is pure and maps the
//! current [`Location`], the [`Menu`] shown for it and the operator's
//! [`Command`] to the next [`Step`]. [`Selector`] drives it against a
//! [`RemoteStore`] and a [`Prompt`].

use std::io::{self, BufRead};

use console::{Term, style};
use seaunpack_remote::{RemoteStore, Repo, Result, path};
use tracing::warn;

use crate::run::Selection;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    Repos,
    Dir { repo: Repo, path: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Up,
    Confirm,
    /// One-based menu number.
    Pick(usize),
    Invalid,
}

impl Command {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "q" | "Q" => Command::Quit,
            "." => Command::Up,
            "0" => Command::Confirm,
            other => match other.parse::<usize>() {
                Ok(n) if n > 0 => Command::Pick(n),
                _ => Command::Invalid,
            },
        }
    }
}

/// What was listed for the current location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Menu {
    Repos(Vec<Repo>),
    Dir { dirs: Vec<String>, files: Vec<String> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Stay,
    Move(Location),
    Done(Selection),
    Quit,
}

pub fn transition(location: &Location, menu: &Menu, command: Command) -> Step {
    if command == Command::Quit {
        return Step::Quit;
    }
    match (location, menu) {
        (Location::Repos, Menu::Repos(repos)) => match command {
            Command::Pick(n) => match repos.get(n - 1) {
                Some(repo) => Step::Move(Location::Dir {
                    repo: repo.clone(),
                    path: path::ROOT.to_string(),
                }),
                None => Step::Stay,
            },
            _ => Step::Stay,
        },
        (Location::Dir { repo, path: current }, Menu::Dir { dirs, .. }) => match command {
            Command::Pick(n) => match dirs.get(n - 1) {
                Some(child) => Step::Move(Location::Dir {
                    repo: repo.clone(),
                    path: path::join(current, child),
                }),
                None => Step::Stay,
            },
            Command::Up if path::is_root(current) => Step::Move(Location::Repos),
            Command::Up => Step::Move(Location::Dir {
                repo: repo.clone(),
                path: path::parent(current),
            }),
            Command::Confirm => Step::Done(Selection {
                repo_id: repo.id.clone(),
                repo_name: repo.name.clone(),
                path: current.clone(),
            }),
            _ => Step::Stay,
        },
        _ => Step::Stay,
    }
}

/// Text shown for a location and its listing.
pub fn render(location: &Location, menu: &Menu) -> String {
    let mut out = String::new();
    match (location, menu) {
        (_, Menu::Repos(repos)) => {
            out.push_str(&format!("{}\n", style("Libraries").bold()));
            if repos.is_empty() {
                out.push_str("  (no libraries)\n");
            }
            for (i, repo) in repos.iter().enumerate() {
                out.push_str(&format!("{:>3}) {}\n", i + 1, repo.name));
            }
            out.push_str("  q) quit");
        }
        (location, Menu::Dir { dirs, files }) => {
            if let Location::Dir { repo, path } = location {
                out.push_str(&format!("{}\n", style(format!("{}:{path}", repo.name)).bold()));
            }
            for (i, dir) in dirs.iter().enumerate() {
                out.push_str(&format!("{:>3}) {}/\n", i + 1, style(dir).cyan()));
            }
            for file in files {
                out.push_str(&format!("     {}\n", style(file).dim()));
            }
            out.push_str("  0) extract archives from here   .) up   q) quit");
        }
    }
    out
}

/// Line-oriented operator I/O.
pub trait Prompt {
    fn show(&mut self, text: &str) -> io::Result<()>;

    /// Read one line; `None` once input is closed.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

pub struct ConsolePrompt {
    term: Term,
}

impl ConsolePrompt {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for ConsolePrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for ConsolePrompt {
    fn show(&mut self, text: &str) -> io::Result<()> {
        self.term.write_line(text)
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.term.write_str(prompt)?;
        self.term.flush()?;
        // Term::read_line cannot tell an empty line from a closed stdin
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }
}

pub struct Selector<'a, S, P> {
    store: &'a S,
    prompt: P,
}

impl<'a, S: RemoteStore, P: Prompt> Selector<'a, S, P> {
    pub fn new(store: &'a S, prompt: P) -> Self {
        Self { store, prompt }
    }

    /// Run the menu until the operator confirms a directory or quits.
    pub async fn run(&mut self) -> Option<Selection> {
        let mut location = Location::Repos;
        loop {
            let menu = match self.load(&location).await {
                Ok(menu) => menu,
                Err(e) if location == Location::Repos => {
                    warn!("cannot list libraries: {e}");
                    match self.read("Enter to retry, q to quit: ") {
                        Some(line) if Command::parse(&line) != Command::Quit => continue,
                        _ => return None,
                    }
                }
                Err(e) => {
                    warn!("cannot list directory, back to libraries: {e}");
                    location = Location::Repos;
                    continue;
                }
            };

            self.show(&render(&location, &menu));
            let Some(line) = self.read("> ") else {
                return None;
            };
            match transition(&location, &menu, Command::parse(&line)) {
                Step::Stay => self.show("invalid choice"),
                Step::Move(next) => location = next,
                Step::Done(selection) => return Some(selection),
                Step::Quit => return None,
            }
        }
    }

    async fn load(&self, location: &Location) -> Result<Menu> {
        match location {
            Location::Repos => Ok(Menu::Repos(self.store.list_repos().await?)),
            Location::Dir { repo, path } => {
                let (dirs, files) = self
                    .store
                    .list_dir(&repo.id, path)
                    .await?
                    .into_iter()
                    .partition::<Vec<_>, _>(|e| e.is_dir());
                Ok(Menu::Dir {
                    dirs: dirs.into_iter().map(|e| e.name).collect(),
                    files: files.into_iter().map(|e| e.name).collect(),
                })
            }
        }
    }

    fn show(&mut self, text: &str) {
        if let Err(e) = self.prompt.show(text) {
            warn!("cannot write to console: {e}");
        }
    }

    fn read(&mut self, prompt: &str) -> Option<String> {
        match self.prompt.read_line(prompt) {
            Ok(line) => line,
            Err(e) => {
                warn!("cannot read input: {e}");
                None
            }
        }
    }
}
