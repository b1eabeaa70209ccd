//! Sample data written to an empty store.

use crate::types::{Priority, Project, ProjectStatus, Task, TaskStatus};
use chrono::{DateTime, NaiveDate, Utc};

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn tags(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn task(
    id: i64,
    title: &str,
    description: &str,
    status: TaskStatus,
    priority: Priority,
    project_id: i64,
    assigned_to: &str,
    due_date: Option<NaiveDate>,
    tag_list: &[&str],
    now: DateTime<Utc>,
) -> Task {
    let mut task = Task {
        id,
        title: title.to_string(),
        description: description.to_string(),
        status,
        priority,
        project_id: Some(project_id),
        assigned_to: assigned_to.to_string(),
        due_date,
        created_at: now,
        updated_at: now,
        completed: false,
        tags: tags(tag_list),
    };
    task.normalize();
    task
}

/// The five sample tasks.
pub fn sample_tasks(now: DateTime<Utc>) -> Vec<Task> {
    vec![
        task(
            1,
            "Migrate to React",
            "Convert this legacy AngularJS application to modern React",
            TaskStatus::InProgress,
            Priority::High,
            1,
            "Development Team",
            date(2025, 12, 31),
            &["migration", "react", "modernization"],
            now,
        ),
        task(
            2,
            "Update Dependencies",
            "Remove jQuery and Bootstrap 3, use modern alternatives",
            TaskStatus::Pending,
            Priority::High,
            1,
            "Frontend Team",
            date(2025, 11, 30),
            &["dependencies", "cleanup"],
            now,
        ),
        task(
            3,
            "Implement State Management",
            "Replace AngularJS services with Redux or Context API",
            TaskStatus::Pending,
            Priority::Medium,
            1,
            "Architecture Team",
            None,
            &["state-management", "redux"],
            now,
        ),
        task(
            4,
            "Create Component Library",
            "Build reusable React components",
            TaskStatus::Completed,
            Priority::Medium,
            2,
            "UI Team",
            None,
            &["components", "ui"],
            now,
        ),
        task(
            5,
            "Write Unit Tests",
            "Add Jest and React Testing Library tests",
            TaskStatus::Pending,
            Priority::Low,
            2,
            "QA Team",
            date(2026, 1, 15),
            &["testing", "jest"],
            now,
        ),
    ]
}

/// The three sample projects.
pub fn sample_projects() -> Vec<Project> {
    vec![
        Project {
            id: 1,
            name: "App Modernization".to_string(),
            description: "Migrate legacy AngularJS app to React".to_string(),
            status: ProjectStatus::Active,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 12, 31),
        },
        Project {
            id: 2,
            name: "UI Component Library".to_string(),
            description: "Build reusable React component library".to_string(),
            status: ProjectStatus::Active,
            start_date: date(2025, 6, 1),
            end_date: date(2025, 9, 30),
        },
        Project {
            id: 3,
            name: "Performance Optimization".to_string(),
            description: "Improve application performance and load times".to_string(),
            status: ProjectStatus::Planning,
            start_date: date(2026, 1, 1),
            end_date: date(2026, 3, 31),
        },
    ]
}
