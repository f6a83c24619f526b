//! `tm cleanup` subcommands implementation

use anyhow::Result;
use clap::{Args, Subcommand};
use log::info;
use std::io::{BufRead, Write};
use tm_core::TaskStatus;

use super::{confirm, Store};

#[derive(Subcommand)]
pub enum CleanupCommands {
    /// Delete every completed task
    Completed(CleanupArgs),

    /// Delete every task (asks twice unless --yes)
    All(CleanupArgs),
}

#[derive(Args)]
pub struct CleanupArgs {
    /// Skip confirmation prompts
    #[arg(short, long)]
    pub yes: bool,
}

pub fn run<R: BufRead, W: Write>(
    command: CleanupCommands,
    store: &Store<'_>,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    match command {
        CleanupCommands::Completed(args) => run_completed(args.yes, store, input, out),
        CleanupCommands::All(args) => run_all(args.yes, store, input, out),
    }
}

pub(crate) fn run_completed<R: BufRead, W: Write>(
    yes: bool,
    store: &Store<'_>,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let pending_removal = store.stats()?.completed;
    if pending_removal == 0 {
        writeln!(out, "No completed tasks to clean up")?;
        return Ok(());
    }

    let prompt = format!("Delete {pending_removal} completed task(s)?");
    if !yes && !confirm(input, out, &prompt)? {
        writeln!(out, "Cancelled")?;
        return Ok(());
    }

    let count = store.delete_by_status(TaskStatus::Completed)?;
    info!("event=cleanup module=cli status=ok filter=completed count={count}");
    writeln!(out, "Deleted {count} completed task(s)")?;
    Ok(())
}

fn run_all<R: BufRead, W: Write>(
    yes: bool,
    store: &Store<'_>,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let total = store.stats()?.total;
    if total == 0 {
        writeln!(out, "No tasks to clean up")?;
        return Ok(());
    }

    if !yes {
        let first = format!("Delete ALL {total} task(s)? This cannot be undone.");
        if !confirm(input, out, &first)? || !confirm(input, out, "Really delete every task?")? {
            writeln!(out, "Cancelled")?;
            return Ok(());
        }
    }

    let count = store.delete_all()?;
    info!("event=cleanup module=cli status=ok filter=all count={count}");
    writeln!(out, "Deleted all {count} task(s)")?;
    Ok(())
}
