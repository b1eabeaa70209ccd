//! Core record types for tasks and projects.
//!
//! Records are persisted as camelCase JSON. Deserialization is lenient in
//! the same way the stored data has always been read: nulls and missing
//! optional fields fall back to their defaults.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Task identifier, assigned by the task repository.
pub type TaskId = i64;

/// Project identifier.
pub type ProjectId = i64;

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "inprogress", alias = "in-progress", alias = "in_progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "inprogress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(TaskStatus::Pending),
            "inprogress" | "in-progress" | "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Parse a priority string ("high", "medium", "low").
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    Completed,
}

/// A task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assigned_to: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default = "Utc::now", deserialize_with = "timestamp_or_now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "timestamp_or_now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl Task {
    /// Set the status and keep `completed` in step with it.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.completed = status == TaskStatus::Completed;
    }

    pub fn mark_completed(&mut self) {
        self.set_status(TaskStatus::Completed);
    }

    pub fn mark_pending(&mut self) {
        self.set_status(TaskStatus::Pending);
    }

    /// Completed tasks go back to pending; anything else becomes completed.
    pub fn toggle_completion(&mut self) {
        if self.completed {
            self.mark_pending();
        } else {
            self.mark_completed();
        }
    }

    /// Re-derive `completed` from `status`, which is authoritative.
    pub fn normalize(&mut self) {
        self.completed = self.status == TaskStatus::Completed;
    }

    /// A task is overdue when its due date (midnight UTC) has passed and it
    /// is not completed.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => due.and_time(NaiveTime::MIN).and_utc() < now && !self.completed,
            None => false,
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Utc::now())
    }

    /// Editable fields of this task.
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            project_id: self.project_id,
            assigned_to: self.assigned_to.clone(),
            due_date: self.due_date,
            tags: self.tags.clone(),
        }
    }

    /// Replace every editable field with the draft's values.
    pub fn apply_draft(&mut self, draft: TaskDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.priority = draft.priority;
        self.project_id = draft.project_id;
        self.assigned_to = draft.assigned_to;
        self.due_date = draft.due_date;
        self.tags = draft.tags;
        self.set_status(draft.status);
    }
}

/// Caller-supplied fields for a new task. Identity and timestamps are
/// assigned by the repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub project_id: Option<ProjectId>,
    pub assigned_to: String,
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<String>,
}

impl TaskDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Materialize the draft with the given identity and creation time.
    pub fn into_task(self, id: TaskId, now: DateTime<Utc>) -> Task {
        let mut task = Task {
            id,
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            project_id: self.project_id,
            assigned_to: self.assigned_to,
            due_date: self.due_date,
            created_at: now,
            updated_at: now,
            completed: false,
            tags: self.tags,
        };
        task.normalize();
        task
    }
}

/// A project record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ProjectStatus,
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn timestamp_or_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DateTime<Utc>>::deserialize(deserializer)?.unwrap_or_else(Utc::now))
}

/// Accepts `null`, `""`, `"YYYY-MM-DD"` or a full RFC 3339 timestamp.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| Some(dt.with_timezone(&Utc).date_naive()))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn sparse_record_materializes_with_defaults() {
        let task: Task = serde_json::from_value(json!({
            "id": 3,
            "title": "Implement State Management",
            "status": "pending",
            "projectId": 1,
            "description": null
        }))
        .unwrap();

        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.description, "");
        assert_eq!(task.due_date, None);
        assert!(task.tags.is_empty());
        assert!(!task.completed);
    }

    #[test]
    fn status_accepts_hyphenated_alias() {
        let task: Task =
            serde_json::from_value(json!({ "id": 1, "status": "in-progress" })).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);

        let out = serde_json::to_value(&task).unwrap();
        assert_eq!(out["status"], "inprogress");
        assert_eq!(out["assignedTo"], "");
    }

    #[test]
    fn due_date_accepts_timestamp_form() {
        let task: Task = serde_json::from_value(json!({
            "id": 1,
            "dueDate": "2025-12-31T00:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(task.due_date, Some(date("2025-12-31")));

        let empty: Task = serde_json::from_value(json!({ "id": 1, "dueDate": "" })).unwrap();
        assert_eq!(empty.due_date, None);
    }

    #[test]
    fn toggle_keeps_status_and_completed_together() {
        let mut task = TaskDraft::titled("x").into_task(1, Utc::now());
        assert_eq!(task.status, TaskStatus::Pending);

        task.toggle_completion();
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.completed);

        task.toggle_completion();
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(!task.completed);
    }

    #[test]
    fn draft_with_completed_status_is_completed() {
        let draft = TaskDraft {
            status: TaskStatus::Completed,
            ..TaskDraft::titled("done already")
        };
        let task = draft.into_task(5, Utc::now());
        assert!(task.completed);
    }

    #[test]
    fn overdue_requires_past_due_date_and_open_task() {
        let mut task = TaskDraft::titled("x").into_task(1, Utc::now());
        let now = at("2025-12-01T12:00:00Z");
        assert!(!task.is_overdue_at(now));

        task.due_date = Some(date("2025-11-30"));
        assert!(task.is_overdue_at(now));

        task.due_date = Some(date("2025-12-01"));
        assert!(task.is_overdue_at(now), "midnight of the due date has passed");

        task.due_date = Some(date("2025-12-02"));
        assert!(!task.is_overdue_at(now));

        task.due_date = Some(date("2025-11-30"));
        task.mark_completed();
        assert!(!task.is_overdue_at(now));
    }

    #[test]
    fn apply_draft_replaces_editable_fields() {
        let mut task = TaskDraft {
            tags: vec!["a".into()],
            assigned_to: "QA Team".into(),
            ..TaskDraft::titled("before")
        }
        .into_task(9, Utc::now());

        let mut draft = task.to_draft();
        draft.title = "after".into();
        draft.tags.clear();
        draft.status = TaskStatus::Completed;
        task.apply_draft(draft);

        assert_eq!(task.id, 9);
        assert_eq!(task.title, "after");
        assert!(task.tags.is_empty());
        assert_eq!(task.assigned_to, "QA Team");
        assert!(task.completed);
    }

    #[test]
    fn parse_helpers() {
        assert_eq!(Priority::parse("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(TaskStatus::parse("in_progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
    }
}
