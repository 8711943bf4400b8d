//! Tracks the agent's task checklist across updates.
//!
//! Each update carries the full list, so recording is a plain overwrite
//! keyed by session. Rendering the same stored list twice gives the same
//! lines twice.

use std::collections::HashMap;

use difflens_stream::{Task, TaskStatus};

use crate::style;

/// Most recent task list per session key.
#[derive(Debug, Default)]
pub struct ChecklistStore {
    lists: HashMap<String, Vec<Task>>,
}

impl ChecklistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored list for `key`. Empty updates are ignored and
    /// leave the previous list standing.
    pub fn record(&mut self, key: &str, tasks: Vec<Task>) -> bool {
        if tasks.is_empty() {
            return false;
        }
        self.lists.insert(key.to_string(), tasks);
        true
    }

    pub fn get(&self, key: &str) -> Option<&[Task]> {
        self.lists.get(key).map(Vec::as_slice)
    }
}

/// One checkbox line per task, in list order.
pub fn render_tasks(tasks: &[Task]) -> String {
    tasks.iter().map(render_task).collect()
}

fn render_task(task: &Task) -> String {
    let (checkbox, text) = match task.status {
        TaskStatus::Completed => (
            style::green(style::CHECKBOX_DONE),
            style::green_strike(&task.content),
        ),
        TaskStatus::InProgress => (
            style::cyan(style::CHECKBOX_OPEN),
            style::cyan(&task.content),
        ),
        TaskStatus::Pending => (
            style::gray(style::CHECKBOX_OPEN),
            style::gray(&task.content),
        ),
    };
    format!("{}{checkbox} {text}\n", style::INDENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(content: &str, status: TaskStatus) -> Task {
        Task {
            content: content.to_string(),
            status,
        }
    }

    #[test]
    fn test_record_overwrites_previous_list() {
        let mut store = ChecklistStore::new();
        assert!(store.record("s1", vec![task("a", TaskStatus::Pending), task("b", TaskStatus::Pending)]));
        assert!(store.record("s1", vec![task("a", TaskStatus::Completed)]));

        let stored = store.get("s1").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, TaskStatus::Completed);
    }

    #[test]
    fn test_record_empty_is_a_noop() {
        let mut store = ChecklistStore::new();
        store.record("s1", vec![task("keep me", TaskStatus::InProgress)]);
        assert!(!store.record("s1", Vec::new()));
        assert_eq!(store.get("s1").unwrap().len(), 1);
    }

    #[test]
    fn test_sessions_do_not_share_lists() {
        let mut store = ChecklistStore::new();
        store.record("s1", vec![task("one", TaskStatus::Pending)]);
        store.record("s2", vec![task("two", TaskStatus::Pending)]);
        assert_eq!(store.get("s1").unwrap()[0].content, "one");
        assert_eq!(store.get("s2").unwrap()[0].content, "two");
        assert!(store.get("s3").is_none());
    }

    #[test]
    fn test_render_marks_statuses() {
        let tasks = vec![
            task("start server", TaskStatus::Completed),
            task("capture home", TaskStatus::InProgress),
            task("capture settings", TaskStatus::Pending),
        ];
        let out = render_tasks(&tasks);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("  "));
        assert!(lines[0].contains('☑'));
        assert!(lines[0].contains("\x1b[9;32mstart server\x1b[0m"));
        assert!(lines[1].contains('☐'));
        assert!(lines[1].contains("\x1b[36mcapture home\x1b[0m"));
        assert!(lines[2].contains("\x1b[90mcapture settings\x1b[0m"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let tasks = vec![task("only", TaskStatus::InProgress)];
        assert_eq!(render_tasks(&tasks), render_tasks(&tasks));
    }
}
