//! `tm task` subcommands implementation

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::Write;
use tm_core::{Task, TaskId, TaskPatch, TaskStats, TaskStatus, DEFAULT_PRIORITY};

use super::{require_task, Store};
use crate::render;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a new task
    Add(TaskAddArgs),

    /// List tasks (pending only unless --all or --status is given)
    List(TaskListArgs),

    /// Update title, description or priority
    Update(TaskUpdateArgs),

    /// Mark a task as completed
    Complete(TaskIdArgs),

    /// Delete a task
    Delete(TaskIdArgs),
}

#[derive(Args)]
pub struct TaskAddArgs {
    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Priority from 1 (highest) to 10 (lowest)
    #[arg(short, long, default_value_t = DEFAULT_PRIORITY, allow_negative_numbers = true)]
    pub priority: i64,
}

#[derive(Args)]
pub struct TaskListArgs {
    /// Filter by status (pending, completed)
    #[arg(short, long, conflicts_with = "all")]
    pub status: Option<TaskStatus>,

    /// Include completed tasks
    #[arg(short, long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TaskUpdateArgs {
    /// Task ID
    pub id: TaskId,

    /// New title
    #[arg(short, long)]
    pub title: Option<String>,

    /// New description (pass "" to clear)
    #[arg(short, long)]
    pub description: Option<String>,

    /// New priority (1-10)
    #[arg(short, long, allow_negative_numbers = true)]
    pub priority: Option<i64>,
}

#[derive(Args)]
pub struct TaskIdArgs {
    /// Task ID
    pub id: TaskId,
}

#[derive(Serialize)]
struct TaskListJson<'a> {
    tasks: &'a [Task],
    stats: &'a TaskStats,
}

pub fn run<W: Write>(command: TaskCommands, store: &Store<'_>, out: &mut W) -> Result<()> {
    match command {
        TaskCommands::Add(args) => run_add(args, store, out),
        TaskCommands::List(args) => run_list(args, store, out),
        TaskCommands::Update(args) => run_update(args, store, out),
        TaskCommands::Complete(args) => run_complete(args.id, store, out),
        TaskCommands::Delete(args) => run_delete(args.id, store, out),
    }
}

fn run_add<W: Write>(args: TaskAddArgs, store: &Store<'_>, out: &mut W) -> Result<()> {
    if args.title.trim().is_empty() {
        bail!("Task title cannot be empty");
    }

    let task = store.create(args.title, args.description.unwrap_or_default(), args.priority)?;
    writeln!(out, "Task added: {}", render::task_line(&task))?;
    Ok(())
}

fn run_list<W: Write>(args: TaskListArgs, store: &Store<'_>, out: &mut W) -> Result<()> {
    let status = match (args.status, args.all) {
        (Some(status), _) => Some(status),
        (None, true) => None,
        (None, false) => Some(TaskStatus::Pending),
    };

    let tasks = store.list(status)?;
    let stats = store.stats()?;

    if args.json {
        let payload = TaskListJson {
            tasks: &tasks,
            stats: &stats,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&payload)?)?;
        return Ok(());
    }

    if tasks.is_empty() {
        writeln!(out, "No tasks")?;
        return Ok(());
    }

    writeln!(out, "Tasks:\n")?;
    for task in &tasks {
        writeln!(out, "{}\n", render::task_block(task))?;
    }
    writeln!(out, "{}", "-".repeat(50))?;
    writeln!(out, "{}", render::stats_line(&stats))?;
    Ok(())
}

fn run_update<W: Write>(args: TaskUpdateArgs, store: &Store<'_>, out: &mut W) -> Result<()> {
    require_task(store, args.id)?;

    if args.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
        bail!("Task title cannot be empty");
    }

    let mut patch = TaskPatch {
        title: args.title,
        description: args.description,
        ..TaskPatch::default()
    };
    if let Some(priority) = args.priority {
        patch = patch.with_raw_priority(priority)?;
    }
    if patch.is_empty() {
        bail!("Specify at least one field to update (--title, --description, --priority)");
    }

    if !store.update(args.id, &patch)? {
        bail!("Failed to update task #{}", args.id);
    }
    let updated = require_task(store, args.id)?;
    writeln!(out, "Task updated: {}", render::task_line(&updated))?;
    Ok(())
}

fn run_complete<W: Write>(id: TaskId, store: &Store<'_>, out: &mut W) -> Result<()> {
    let task = require_task(store, id)?;
    if task.is_completed() {
        writeln!(out, "Task #{id} is already completed")?;
        return Ok(());
    }

    if !store.complete(id)? {
        bail!("Failed to complete task #{id}");
    }
    writeln!(out, "Task #{id} marked as completed")?;
    Ok(())
}

fn run_delete<W: Write>(id: TaskId, store: &Store<'_>, out: &mut W) -> Result<()> {
    require_task(store, id)?;
    if !store.delete(id)? {
        bail!("Failed to delete task #{id}");
    }
    writeln!(out, "Task #{id} deleted")?;
    Ok(())
}
