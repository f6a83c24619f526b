//! `tm` entry point.
//!
//! # Responsibility
//! - Resolve paths, start logging, open the store once and dispatch.
//! - Map any failure to a non-zero exit code.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::info;
use std::process::ExitCode;
use tm_cli::cli::{self, Cli};
use tm_core::config::LOG_LEVEL_ENV;
use tm_core::{
    core_version, default_log_level, init_logging, AppPaths, SqliteTaskRepository, TaskService,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let paths = cli.paths();
    let Some(command) = cli.command else {
        // Bare `tm` prints help, like `--help`.
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };
    start_logging(&paths);

    match run(command, &paths) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: cli::Commands, paths: &AppPaths) -> Result<()> {
    let conn = cli::open_connection(paths)?;
    let store = TaskService::new(SqliteTaskRepository::try_new(&conn)?);

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout().lock();
    cli::run(command, &store, &mut input, &mut out)
}

fn start_logging(paths: &AppPaths) {
    let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| default_log_level().to_string());
    // Logs are diagnostics only; the command still runs without them.
    if let Err(err) = init_logging(&level, &paths.log_dir) {
        eprintln!("warning: logging disabled: {err}");
        return;
    }
    info!(
        "event=cli_start module=cli status=ok version={} db_path={}",
        core_version(),
        paths.db_path.display()
    );
}
