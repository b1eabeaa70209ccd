//! Asynchronous repositories over the key/value store.
//!
//! Each repository persists one collection under a fixed key as a JSON
//! array of records. Operations suspend for a configurable latency before
//! touching the store; writes read, modify and rewrite the whole collection.

pub mod projects;
pub mod seed;
pub mod tasks;

pub use projects::ProjectRepository;
pub use tasks::TaskRepository;

use crate::error::ServiceResult;
use crate::stats::{TaskStats, compute_stats};
use crate::store::Store;
use crate::types::{Project, ProjectId, Task, TaskDraft, TaskId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// Simulated latency per operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    /// Whole-collection reads.
    pub list: Duration,
    /// Single-record reads.
    pub get: Duration,
    /// Create, update and delete.
    pub write: Duration,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(300),
            get: Duration::from_millis(200),
            write: Duration::from_millis(200),
        }
    }
}

impl Latency {
    /// No artificial delay. Operations still yield once to the scheduler.
    pub fn none() -> Self {
        Self::uniform(Duration::ZERO)
    }

    pub fn uniform(delay: Duration) -> Self {
        Self {
            list: delay,
            get: delay,
            write: delay,
        }
    }

    async fn pause(delay: Duration) {
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Task operations consumed by the views.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Every stored task. Never fails; missing data is an empty list.
    async fn list_all(&self) -> ServiceResult<Vec<Task>>;

    async fn get_by_id(&self, id: TaskId) -> ServiceResult<Task>;

    async fn create(&self, draft: TaskDraft) -> ServiceResult<Task>;

    /// Replace the whole record stored under `id`.
    async fn update(&self, id: TaskId, task: Task) -> ServiceResult<Task>;

    /// Remove every record with `id`. Deleting an absent id succeeds.
    async fn delete(&self, id: TaskId) -> ServiceResult<()>;

    async fn list_by_project(&self, project_id: ProjectId) -> ServiceResult<Vec<Task>> {
        let tasks = self.list_all().await?;
        Ok(tasks
            .into_iter()
            .filter(|t| t.project_id == Some(project_id))
            .collect())
    }

    async fn stats(&self) -> ServiceResult<TaskStats> {
        let tasks = self.list_all().await?;
        Ok(compute_stats(&tasks))
    }
}

/// Project operations consumed by the views.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    async fn list_all(&self) -> ServiceResult<Vec<Project>>;

    async fn get_by_id(&self, id: ProjectId) -> ServiceResult<Project>;
}

/// Raw records stored under `key`; absent or unreadable data is empty.
fn load_records(store: &Store, key: &str) -> Vec<Value> {
    store.get::<Vec<Value>>(key).unwrap_or_default()
}

/// Id of a raw record.
fn record_id(record: &Value) -> Option<i64> {
    record.get("id")?.as_i64()
}

/// Typed view of the raw records; malformed records are skipped.
fn materialize<T: DeserializeOwned>(key: &str, records: Vec<Value>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<T>(record) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(key, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_id_reads_numeric_ids() {
        assert_eq!(record_id(&json!({ "id": 7 })), Some(7));
        assert_eq!(record_id(&json!({ "id": "8" })), None);
        assert_eq!(record_id(&json!({ "title": "no id" })), None);
    }

    #[test]
    fn materialize_skips_bad_records() {
        let records = vec![
            json!({ "id": 1, "title": "ok" }),
            json!({ "title": "missing id" }),
            json!({ "id": 2, "status": "bogus" }),
        ];
        let tasks: Vec<Task> = materialize("tasks", records);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, 1);
    }

    #[test]
    fn latency_defaults_and_none() {
        let latency = Latency::default();
        assert_eq!(latency.list, Duration::from_millis(300));
        assert_eq!(latency.get, Duration::from_millis(200));
        assert_eq!(Latency::none().write, Duration::ZERO);
    }
}
