use clap::Parser;
use std::io::Cursor;
use std::path::Path;
use tm_cli::cli::{self, Cli};
use tm_core::{SqliteTaskRepository, TaskService, TaskStatus};

/// Parses `args` and runs them against the database at `db`, feeding `stdin`.
fn tm(db: &Path, args: &[&str], stdin: &str) -> anyhow::Result<String> {
    let mut argv = vec!["tm", "--db", db.to_str().unwrap()];
    argv.extend_from_slice(args);
    let parsed = Cli::try_parse_from(argv)?;
    let paths = parsed.paths();

    let conn = cli::open_connection(&paths)?;
    let store = TaskService::new(SqliteTaskRepository::try_new(&conn)?);
    let mut input = Cursor::new(stdin.as_bytes().to_vec());
    let mut out = Vec::new();
    cli::run(parsed.command.unwrap(), &store, &mut input, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn add_list_complete_flow_across_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tasks.db");

    let added = tm(&db, &["task", "add", "Write report", "quarterly", "-p", "3"], "").unwrap();
    assert!(added.contains("Task added: [ ] #1 Write report (P3)"));
    tm(&db, &["task", "add", "Inbox zero"], "").unwrap();

    let listed = tm(&db, &["task", "list"], "").unwrap();
    let report_at = listed.find("Write report").unwrap();
    let inbox_at = listed.find("Inbox zero").unwrap();
    assert!(report_at < inbox_at);
    assert!(listed.contains("Total: 2 | Pending: 2 | Completed: 0"));
    assert!(listed.contains("[ ] #2 Inbox zero (P5)"));

    tm(&db, &["task", "complete", "1"], "").unwrap();
    let again = tm(&db, &["task", "complete", "1"], "").unwrap();
    assert!(again.contains("already completed"));

    let pending_only = tm(&db, &["task", "list"], "").unwrap();
    assert!(!pending_only.contains("Write report"));
    let all = tm(&db, &["task", "list", "--all"], "").unwrap();
    assert!(all.contains("[x] #1 Write report (P3)"));
}

#[test]
fn invalid_input_fails_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tasks.db");

    let err = tm(&db, &["task", "add", "Too low", "-p", "0"], "").unwrap_err();
    assert!(format!("{err:#}").contains("priority must be between 1 and 10"));
    assert!(tm(&db, &["task", "add", "   "], "").is_err());

    tm(&db, &["task", "add", "Real"], "").unwrap();
    let err = tm(&db, &["quadrant", "assign", "1", "5"], "").unwrap_err();
    assert!(format!("{err:#}").contains("quadrant must be between 1 and 4"));
    let err = tm(&db, &["quadrant", "assign", "7", "2"], "").unwrap_err();
    assert!(format!("{err:#}").contains("Task #7 does not exist"));
    assert!(tm(&db, &["task", "update", "1"], "").is_err());
    assert!(tm(&db, &["task", "list", "--status", "archived"], "").is_err());
}

#[test]
fn update_and_quadrant_commands() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tasks.db");
    tm(&db, &["task", "add", "Draft"], "").unwrap();

    let updated = tm(&db, &["task", "update", "1", "-t", "Final", "-p", "2"], "").unwrap();
    assert!(updated.contains("Task updated: [ ] #1 Final (P2)"));

    tm(&db, &["quadrant", "assign", "1", "2"], "").unwrap();
    let grid = tm(&db, &["quadrant", "list"], "").unwrap();
    assert!(grid.contains("[Q2] Important & Not Urgent (1)"));
    assert!(grid.contains("- Final"));

    let removed = tm(&db, &["quadrant", "remove", "1"], "").unwrap();
    assert!(removed.contains("Quadrant removed from task #1"));
    let removed_again = tm(&db, &["quadrant", "remove", "1"], "").unwrap();
    assert!(removed_again.contains("has no quadrant assigned"));

    let info = tm(&db, &["quadrant", "info"], "").unwrap();
    assert!(info.contains("Q4: Not Important & Not Urgent"));
}

#[test]
fn json_listing_includes_stats() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tasks.db");
    tm(&db, &["task", "add", "One", "-p", "1"], "").unwrap();
    tm(&db, &["quadrant", "assign", "1", "1"], "").unwrap();

    let raw = tm(&db, &["task", "list", "--json"], "").unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["tasks"][0]["title"], "One");
    assert_eq!(value["tasks"][0]["status"], "pending");
    assert_eq!(value["tasks"][0]["quadrant"], 1);
    assert_eq!(value["stats"]["total"], 1);
    assert_eq!(value["stats"]["by_quadrant"]["1"], 1);
}

#[test]
fn cleanup_respects_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tasks.db");
    for title in ["a", "b", "c"] {
        tm(&db, &["task", "add", title], "").unwrap();
    }
    tm(&db, &["task", "complete", "2"], "").unwrap();

    let cancelled = tm(&db, &["cleanup", "completed"], "n\n").unwrap();
    assert!(cancelled.contains("Cancelled"));

    let removed = tm(&db, &["cleanup", "completed"], "y\n").unwrap();
    assert!(removed.contains("Deleted 1 completed task(s)"));
    let nothing = tm(&db, &["cleanup", "completed", "-y"], "").unwrap();
    assert!(nothing.contains("No completed tasks"));

    // Second confirmation declined.
    tm(&db, &["cleanup", "all"], "y\nn\n").unwrap();
    let conn = tm_core::db::open_db(&db).unwrap();
    let store = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    assert_eq!(store.list(Some(TaskStatus::Pending)).unwrap().len(), 2);

    let wiped = tm(&db, &["cleanup", "all", "--yes"], "").unwrap();
    assert!(wiped.contains("Deleted all 2 task(s)"));
    assert_eq!(store.stats().unwrap().total, 0);
}
