//! Interactive menu loop.
//!
//! Reads one single-letter command at a time, runs it to completion against
//! the store, then prompts again. Nothing is cached between commands.

use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};
use tm_core::{Quadrant, TaskId, TaskPatch, TaskStatus, DEFAULT_PRIORITY};

use crate::cli::{cleanup, confirm, quadrant, require_task, Store};
use crate::render;

const HELP: &str = "\
Commands:
  l  list pending tasks      L  list all tasks
  a  add a task              e  edit a task
  c  complete a task         d  delete a task
  q  assign a quadrant       u  unassign a quadrant
  v  view quadrants          s  show stats
  x  clean up completed      h  show this help
  :q quit";

enum Flow {
    Continue,
    Quit,
}

struct Prompt<'a, R, W> {
    input: &'a mut R,
    out: &'a mut W,
}

impl<R: BufRead, W: Write> Prompt<'_, R, W> {
    /// Reads one trimmed line. `None` means the input is exhausted.
    fn ask(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask_required(&mut self, label: &str) -> Result<String> {
        match self.ask(label)? {
            Some(value) => Ok(value),
            None => bail!("input closed"),
        }
    }

    fn ask_id(&mut self) -> Result<TaskId> {
        let raw = self.ask_required("Task ID: ")?;
        raw.parse()
            .with_context(|| format!("`{raw}` is not a task id"))
    }

    fn ask_number(&mut self, label: &str) -> Result<Option<i64>> {
        let raw = self.ask_required(label)?;
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse()
            .map(Some)
            .with_context(|| format!("`{raw}` is not a number"))
    }
}

/// Runs the menu until `:q` or end of input.
pub fn run<R: BufRead, W: Write>(store: &Store<'_>, input: &mut R, out: &mut W) -> Result<()> {
    let mut prompt = Prompt { input, out };
    writeln!(prompt.out, "tm interactive mode. Type h for help, :q to quit.")?;

    loop {
        let Some(command) = prompt.ask("\ntm> ")? else {
            writeln!(prompt.out)?;
            return Ok(());
        };

        match dispatch(&command, store, &mut prompt) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => return Ok(()),
            Err(err) => writeln!(prompt.out, "Error: {err:#}")?,
        }
    }
}

fn dispatch<R: BufRead, W: Write>(
    command: &str,
    store: &Store<'_>,
    prompt: &mut Prompt<'_, R, W>,
) -> Result<Flow> {
    match command {
        "" => {}
        ":q" | ":quit" | "quit" | "exit" => return Ok(Flow::Quit),
        "h" | "?" | "help" => writeln!(prompt.out, "{HELP}")?,
        "l" => list(store, prompt, Some(TaskStatus::Pending))?,
        "L" => list(store, prompt, None)?,
        "a" => add(store, prompt)?,
        "e" => edit(store, prompt)?,
        "c" => {
            let id = prompt.ask_id()?;
            if require_task(store, id)?.is_completed() {
                writeln!(prompt.out, "Task #{id} is already completed")?;
            } else if store.complete(id)? {
                writeln!(prompt.out, "Task #{id} marked as completed")?;
            } else {
                bail!("Task #{id} does not exist");
            }
        }
        "d" => {
            let id = prompt.ask_id()?;
            let task = require_task(store, id)?;
            let question = format!("Delete {}?", render::task_line(&task));
            if !confirm(&mut *prompt.input, &mut *prompt.out, &question)? {
                writeln!(prompt.out, "Cancelled")?;
            } else if store.delete(id)? {
                writeln!(prompt.out, "Task #{id} deleted")?;
            } else {
                bail!("Task #{id} does not exist");
            }
        }
        "q" => {
            let id = prompt.ask_id()?;
            let raw = prompt
                .ask_number("Quadrant (1-4): ")?
                .context("a quadrant number is required")?;
            let quadrant = Quadrant::try_from(raw)?;
            require_task(store, id)?;
            if !store.assign_quadrant(id, quadrant.number())? {
                bail!("Task #{id} does not exist");
            }
            writeln!(prompt.out, "Task #{id} assigned to {quadrant}")?;
        }
        "u" => {
            let id = prompt.ask_id()?;
            if require_task(store, id)?.quadrant.is_none() {
                writeln!(prompt.out, "Task #{id} has no quadrant assigned")?;
            } else if store.unassign_quadrant(id)? {
                writeln!(prompt.out, "Quadrant removed from task #{id}")?;
            } else {
                bail!("Task #{id} does not exist");
            }
        }
        "v" => quadrant::run_list(store, &mut *prompt.out)?,
        "s" => {
            let stats = store.stats()?;
            writeln!(prompt.out, "{}", render::stats_line(&stats))?;
            for quadrant in Quadrant::ALL {
                writeln!(
                    prompt.out,
                    "{}",
                    render::quadrant_heading(quadrant, stats.quadrant_count(quadrant))
                )?;
            }
            writeln!(prompt.out, "Unassigned: {}", stats.unassigned())?;
        }
        "x" => cleanup::run_completed(false, store, &mut *prompt.input, &mut *prompt.out)?,
        other => writeln!(prompt.out, "Unknown command `{other}`. Type h for help.")?,
    }
    Ok(Flow::Continue)
}

fn list<R: BufRead, W: Write>(
    store: &Store<'_>,
    prompt: &mut Prompt<'_, R, W>,
    status: Option<TaskStatus>,
) -> Result<()> {
    let tasks = store.list(status)?;
    if tasks.is_empty() {
        writeln!(prompt.out, "No tasks")?;
    }
    for task in &tasks {
        writeln!(prompt.out, "{}", render::task_block(task))?;
    }
    Ok(())
}

fn add<R: BufRead, W: Write>(store: &Store<'_>, prompt: &mut Prompt<'_, R, W>) -> Result<()> {
    let title = prompt.ask_required("Title: ")?;
    if title.is_empty() {
        bail!("Task title cannot be empty");
    }
    let description = prompt.ask_required("Description (optional): ")?;
    let priority = prompt
        .ask_number(&format!("Priority 1-10 [{DEFAULT_PRIORITY}]: "))?
        .unwrap_or(DEFAULT_PRIORITY);

    let task = store.create(title, description, priority)?;
    writeln!(prompt.out, "Task added: {}", render::task_line(&task))?;
    Ok(())
}

fn edit<R: BufRead, W: Write>(store: &Store<'_>, prompt: &mut Prompt<'_, R, W>) -> Result<()> {
    let id = prompt.ask_id()?;
    let current = require_task(store, id)?;
    writeln!(prompt.out, "{}", render::task_block(&current))?;
    writeln!(prompt.out, "Leave a field empty to keep it.")?;

    let title = prompt.ask_required("New title: ")?;
    let description = prompt.ask_required("New description: ")?;
    let priority = prompt.ask_number("New priority: ")?;

    let mut patch = TaskPatch {
        title: Some(title).filter(|value| !value.is_empty()),
        description: Some(description).filter(|value| !value.is_empty()),
        ..TaskPatch::default()
    };
    if let Some(priority) = priority {
        patch = patch.with_raw_priority(priority)?;
    }

    if store.update(id, &patch)? {
        let updated = require_task(store, id)?;
        writeln!(prompt.out, "Task updated: {}", render::task_line(&updated))?;
    } else {
        writeln!(prompt.out, "Nothing to update")?;
    }
    Ok(())
}
