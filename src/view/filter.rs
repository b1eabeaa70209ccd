//! Client-side task filtering.

use crate::types::{Priority, Task, TaskStatus};

/// Status, priority and free-text filter over a loaded task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    /// Case-insensitive substring of the title or description.
    pub search: String,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.search.is_empty()
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        let status_ok = self.status.is_none_or(|s| task.status == s);
        let priority_ok = self.priority.is_none_or(|p| task.priority == p);
        let search_ok = self.search.is_empty() || {
            let needle = self.search.to_lowercase();
            task.title.to_lowercase().contains(&needle)
                || task.description.to_lowercase().contains(&needle)
        };
        status_ok && priority_ok && search_ok
    }

    /// Matching tasks, in their original order.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::seed::sample_tasks;
    use chrono::Utc;

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let tasks = sample_tasks(Utc::now());
        let filter = TaskFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&tasks).len(), 5);
    }

    #[test]
    fn status_and_priority_combine() {
        let tasks = sample_tasks(Utc::now());
        let filter = TaskFilter::default()
            .with_status(TaskStatus::Pending)
            .with_priority(Priority::High);
        assert_eq!(titles(&filter.apply(&tasks)), vec!["Update Dependencies"]);
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let tasks = sample_tasks(Utc::now());

        let by_title = TaskFilter::default().with_search("REACT");
        assert_eq!(
            titles(&by_title.apply(&tasks)),
            vec!["Migrate to React", "Create Component Library", "Write Unit Tests"]
        );

        let by_description = TaskFilter::default().with_search("jquery");
        assert_eq!(titles(&by_description.apply(&tasks)), vec!["Update Dependencies"]);

        let none = TaskFilter::default().with_search("kubernetes");
        assert!(none.apply(&tasks).is_empty());
    }
}
