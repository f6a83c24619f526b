//! Plain-text rendering of tasks, stats and the quadrant grid.

use tm_core::{Quadrant, Task, TaskStats};
use unicode_width::UnicodeWidthChar;

const GRID_CELL_WIDTH: usize = 36;
const GRID_TITLES_PER_CELL: usize = 3;

/// One-line task summary: `[ ] #3 Title (P2)`.
pub fn task_line(task: &Task) -> String {
    let mark = if task.is_completed() { "x" } else { " " };
    format!("[{mark}] #{} {} (P{})", task.id, task.title, task.priority)
}

/// Task summary followed by description and quadrant lines when present.
pub fn task_block(task: &Task) -> String {
    let mut block = task_line(task);
    if !task.description.is_empty() {
        block.push_str(&format!("\n    {}", task.description));
    }
    if let Some(quadrant) = task.quadrant {
        block.push_str(&format!("\n    {}: {}", quadrant, quadrant.label()));
    }
    block
}

pub fn stats_line(stats: &TaskStats) -> String {
    format!(
        "Total: {} | Pending: {} | Completed: {}",
        stats.total, stats.pending, stats.completed
    )
}

/// Quadrant header with its task count, e.g. `[Q1] Important & Urgent (2)`.
pub fn quadrant_heading(quadrant: Quadrant, count: u64) -> String {
    format!("[{}] {} ({})", quadrant, quadrant.label(), count)
}

/// Renders the 2x2 grid. `tasks_for` yields the tasks in display order.
pub fn quadrant_grid(stats: &TaskStats, tasks_for: impl Fn(Quadrant) -> Vec<Task>) -> String {
    let cells: Vec<Vec<String>> = Quadrant::ALL
        .iter()
        .map(|&quadrant| {
            let tasks = tasks_for(quadrant);
            let mut lines = vec![quadrant_heading(quadrant, stats.quadrant_count(quadrant))];
            lines.extend(
                tasks
                    .iter()
                    .take(GRID_TITLES_PER_CELL)
                    .map(|task| format!("- {}", task.title)),
            );
            if tasks.len() > GRID_TITLES_PER_CELL {
                lines.push(format!("  ... {} more", tasks.len() - GRID_TITLES_PER_CELL));
            }
            lines
        })
        .collect();

    let border = format!(
        "+{}+{}+",
        "-".repeat(GRID_CELL_WIDTH + 2),
        "-".repeat(GRID_CELL_WIDTH + 2)
    );
    let mut out = vec![border.clone()];
    for row in cells.chunks(2) {
        let height = row.iter().map(Vec::len).max().unwrap_or(0);
        for index in 0..height {
            let left = row[0].get(index).map(String::as_str).unwrap_or("");
            let right = row
                .get(1)
                .and_then(|cell| cell.get(index))
                .map(String::as_str)
                .unwrap_or("");
            out.push(format!(
                "| {} | {} |",
                pad_to_width(left, GRID_CELL_WIDTH),
                pad_to_width(right, GRID_CELL_WIDTH)
            ));
        }
        out.push(border.clone());
    }
    out.join("\n")
}

/// Truncates or pads `text` to exactly `width` display columns.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let mut fitted = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width {
            break;
        }
        fitted.push(ch);
        used += ch_width;
    }
    fitted.push_str(&" ".repeat(width - used));
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use tm_core::{Priority, TaskStatus};
    use unicode_width::UnicodeWidthStr;

    fn task(id: i64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: String::new(),
            priority: Priority::new(2).unwrap(),
            status: TaskStatus::Pending,
            quadrant: None,
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn task_line_marks_completion() {
        let mut item = task(3, "Write report");
        assert_eq!(task_line(&item), "[ ] #3 Write report (P2)");
        item.status = TaskStatus::Completed;
        assert_eq!(task_line(&item), "[x] #3 Write report (P2)");
    }

    #[test]
    fn task_block_includes_description_and_quadrant() {
        let mut item = task(1, "Plan");
        item.description = "next quarter".to_string();
        item.quadrant = Some(Quadrant::ImportantNotUrgent);
        let block = task_block(&item);
        assert!(block.contains("next quarter"));
        assert!(block.contains("Q2: Important & Not Urgent"));
    }

    #[test]
    fn pad_to_width_handles_wide_characters() {
        assert_eq!(pad_to_width("abc", 5), "abc  ");
        assert_eq!(pad_to_width("abcdef", 4), "abcd");
        let padded = pad_to_width("任务清单", 5);
        assert_eq!(UnicodeWidthStr::width(padded.as_str()), 5);
    }

    #[test]
    fn grid_lists_at_most_three_titles_per_cell() {
        let mut stats = TaskStats::default();
        stats.by_quadrant.insert(Quadrant::ImportantUrgent, 4);
        let grid = quadrant_grid(&stats, |quadrant| {
            if quadrant == Quadrant::ImportantUrgent {
                (1..=4).map(|id| task(id, &format!("t{id}"))).collect()
            } else {
                Vec::new()
            }
        });

        assert!(grid.contains("[Q1] Important & Urgent (4)"));
        assert!(grid.contains("[Q4] Not Important & Not Urgent (0)"));
        assert!(grid.contains("- t3"));
        assert!(!grid.contains("- t4"));
        assert!(grid.contains("... 1 more"));
    }
}
