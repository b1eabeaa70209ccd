//! Aggregation of task statistics.
//!
//! Statistics are derived on demand from a task collection and are never
//! persisted.

use crate::error::ServiceResult;
use crate::repo::TaskSource;
use crate::types::{ProjectId, Task, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counts over a task collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub overdue: usize,
}

/// Statistics for the tasks of one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub project_id: ProjectId,
    #[serde(flatten)]
    pub stats: TaskStats,
}

/// Aggregate statistics, judging overdue against the current time.
pub fn compute_stats(tasks: &[Task]) -> TaskStats {
    compute_stats_at(tasks, Utc::now())
}

/// Aggregate statistics, judging overdue against `now`.
pub fn compute_stats_at(tasks: &[Task], now: DateTime<Utc>) -> TaskStats {
    tasks.iter().fold(
        TaskStats {
            total: tasks.len(),
            ..TaskStats::default()
        },
        |mut stats, task| {
            if task.completed {
                stats.completed += 1;
            }
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => {}
            }
            if task.is_overdue_at(now) {
                stats.overdue += 1;
            }
            stats
        },
    )
}

/// Statistics for one project: narrow by project, then aggregate.
pub async fn project_stats(
    tasks: &dyn TaskSource,
    project_id: ProjectId,
) -> ServiceResult<ProjectStats> {
    let subset = tasks.list_by_project(project_id).await?;
    Ok(ProjectStats {
        project_id,
        stats: compute_stats(&subset),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::seed::sample_tasks;
    use crate::types::TaskDraft;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn empty_collection_is_all_zero() {
        assert_eq!(compute_stats(&[]), TaskStats::default());
    }

    #[test]
    fn sample_set_counts() {
        let tasks = sample_tasks(Utc::now());

        let before = compute_stats_at(&tasks, at("2025-11-01T00:00:00Z"));
        assert_eq!(
            before,
            TaskStats {
                total: 5,
                completed: 1,
                pending: 3,
                in_progress: 1,
                overdue: 0,
            }
        );

        let december = compute_stats_at(&tasks, at("2025-12-15T00:00:00Z"));
        assert_eq!(december.overdue, 1);

        let later = compute_stats_at(&tasks, at("2026-02-01T00:00:00Z"));
        assert_eq!(later.overdue, 3);
    }

    #[test]
    fn status_counts_partition_total() {
        let mut tasks: Vec<Task> = (0..9)
            .map(|i| TaskDraft::titled(format!("t{i}")).into_task(i, Utc::now()))
            .collect();
        tasks[0].mark_completed();
        tasks[1].set_status(TaskStatus::InProgress);
        tasks[2].set_status(TaskStatus::InProgress);

        let stats = compute_stats(&tasks);
        assert_eq!(stats.pending + stats.in_progress + stats.completed, stats.total);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 2);
    }

    #[test]
    fn serializes_camel_case() {
        let stats = ProjectStats {
            project_id: 2,
            stats: TaskStats {
                total: 2,
                in_progress: 1,
                ..TaskStats::default()
            },
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["projectId"], 2);
        assert_eq!(json["inProgress"], 1);
    }
}
