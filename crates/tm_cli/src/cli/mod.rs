//! CLI command definitions and dispatch.

pub mod cleanup;
pub mod quadrant;
pub mod task;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tm_core::db::open_db;
use tm_core::{AppPaths, SqliteTaskRepository, Task, TaskId, TaskService};

use crate::interactive;

/// Store handle shared by every command for one invocation.
pub type Store<'conn> = TaskService<SqliteTaskRepository<'conn>>;

#[derive(Parser)]
#[command(
    name = "tm",
    version,
    about = "Task manager built around the Eisenhower four-quadrant model"
)]
pub struct Cli {
    /// Task database file (defaults to ~/.tm/tasks.db, or $TM_HOME/tasks.db)
    #[arg(long, global = true, env = "TM_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn paths(&self) -> AppPaths {
        match &self.db {
            Some(path) => AppPaths::with_db_path(path),
            None => AppPaths::resolve(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add, list, update, complete and delete tasks
    Task {
        #[command(subcommand)]
        command: task::TaskCommands,
    },

    /// Assign tasks to the four quadrants
    Quadrant {
        #[command(subcommand)]
        command: quadrant::QuadrantCommands,
    },

    /// Bulk-delete tasks
    Cleanup {
        #[command(subcommand)]
        command: cleanup::CleanupCommands,
    },

    /// Start the interactive menu
    #[command(visible_alias = "i")]
    Interactive,
}

/// Opens the task database at `paths.db_path`, creating it on first use.
pub fn open_connection(paths: &AppPaths) -> Result<Connection> {
    open_db(&paths.db_path)
        .with_context(|| format!("failed to open task database `{}`", paths.db_path.display()))
}

/// Runs one command against `store`.
pub fn run<R: BufRead, W: Write>(
    command: Commands,
    store: &Store<'_>,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    match command {
        Commands::Task { command } => task::run(command, store, out),
        Commands::Quadrant { command } => quadrant::run(command, store, out),
        Commands::Cleanup { command } => cleanup::run(command, store, input, out),
        Commands::Interactive => interactive::run(store, input, out),
    }
}

/// Fetches a task or fails with a user-facing "does not exist" error.
pub fn require_task(store: &Store<'_>, id: TaskId) -> Result<Task> {
    match store.get_by_id(id)? {
        Some(task) => Ok(task),
        None => bail!("Task #{id} does not exist"),
    }
}

/// Asks a yes/no question; anything but `y`/`yes` (including EOF) is a no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<bool> {
    write!(out, "{message} [y/N] ")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Cursor;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_commands_and_alias() {
        let cli = Cli::try_parse_from(["tm", "task", "add", "Write report", "-p", "3"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Task { .. })));

        let cli = Cli::try_parse_from(["tm", "i"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Interactive)));

        let cli = Cli::try_parse_from(["tm", "--db", "/tmp/x.db", "quadrant", "list"]).unwrap();
        assert_eq!(cli.paths().db_path, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn confirm_accepts_only_explicit_yes() {
        for (reply, expected) in [("y\n", true), ("YES\n", true), ("n\n", false), ("", false)] {
            let mut input = Cursor::new(reply.as_bytes());
            let mut out = Vec::new();
            assert_eq!(confirm(&mut input, &mut out, "Sure?").unwrap(), expected);
        }
    }
}
