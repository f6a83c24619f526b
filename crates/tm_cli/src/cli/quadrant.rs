//! `tm quadrant` subcommands implementation

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use std::io::Write;
use tm_core::{Quadrant, TaskId};

use super::{require_task, Store};
use crate::render;

#[derive(Subcommand)]
pub enum QuadrantCommands {
    /// Assign a task to a quadrant (1-4)
    Assign(QuadrantAssignArgs),

    /// Show the four quadrants as a 2x2 grid
    List,

    /// Remove a task's quadrant assignment
    Remove(QuadrantRemoveArgs),

    /// Explain the four quadrants
    Info,
}

#[derive(Args)]
pub struct QuadrantAssignArgs {
    /// Task ID
    pub id: TaskId,

    /// Quadrant number (1-4)
    #[arg(allow_negative_numbers = true)]
    pub quadrant: i64,
}

#[derive(Args)]
pub struct QuadrantRemoveArgs {
    /// Task ID
    pub id: TaskId,
}

pub fn run<W: Write>(command: QuadrantCommands, store: &Store<'_>, out: &mut W) -> Result<()> {
    match command {
        QuadrantCommands::Assign(args) => run_assign(args, store, out),
        QuadrantCommands::List => run_list(store, out),
        QuadrantCommands::Remove(args) => run_remove(args, store, out),
        QuadrantCommands::Info => run_info(out),
    }
}

fn run_assign<W: Write>(args: QuadrantAssignArgs, store: &Store<'_>, out: &mut W) -> Result<()> {
    let quadrant = Quadrant::try_from(args.quadrant)?;
    require_task(store, args.id)?;

    if !store.assign_quadrant(args.id, quadrant.number())? {
        bail!("Failed to assign task #{}", args.id);
    }
    writeln!(
        out,
        "Task #{} assigned to {}: {}",
        args.id,
        quadrant,
        quadrant.label()
    )?;
    Ok(())
}

pub(crate) fn run_list<W: Write>(store: &Store<'_>, out: &mut W) -> Result<()> {
    let stats = store.stats()?;
    let mut per_quadrant = Vec::with_capacity(Quadrant::ALL.len());
    for quadrant in Quadrant::ALL {
        per_quadrant.push((quadrant, store.list_by_quadrant(quadrant.number())?));
    }

    let grid = render::quadrant_grid(&stats, |quadrant| {
        per_quadrant
            .iter()
            .find(|(candidate, _)| *candidate == quadrant)
            .map(|(_, tasks)| tasks.clone())
            .unwrap_or_default()
    });
    writeln!(out, "\nEisenhower quadrants\n")?;
    writeln!(out, "{grid}")?;
    Ok(())
}

fn run_remove<W: Write>(args: QuadrantRemoveArgs, store: &Store<'_>, out: &mut W) -> Result<()> {
    let task = require_task(store, args.id)?;
    if task.quadrant.is_none() {
        writeln!(out, "Task #{} has no quadrant assigned", args.id)?;
        return Ok(());
    }

    if !store.unassign_quadrant(args.id)? {
        bail!("Failed to remove quadrant from task #{}", args.id);
    }
    writeln!(out, "Quadrant removed from task #{}", args.id)?;
    Ok(())
}

fn run_info<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "\nThe Eisenhower quadrants:\n")?;
    for quadrant in Quadrant::ALL {
        writeln!(out, "{}: {}", quadrant, quadrant.label())?;
        writeln!(out, "    {}\n", quadrant.guidance())?;
    }
    Ok(())
}
