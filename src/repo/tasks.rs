//! Task CRUD over the `tasks` collection.

use super::{Latency, TaskSource, load_records, materialize, record_id, seed};
use crate::db::now_ms;
use crate::error::{ServiceError, ServiceResult};
use crate::store::{Store, TASKS_KEY};
use crate::types::{Task, TaskDraft, TaskId};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Issues task ids: the current time in milliseconds, bumped past the last
/// issued id and past every id already stored so rapid creations within one
/// millisecond never collide.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: AtomicI64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id strictly greater than `floor_exclusive` and every id issued so
    /// far, or `None` once the id space is exhausted.
    pub fn next(&self, floor_exclusive: i64) -> Option<TaskId> {
        let now = now_ms();
        let floor = floor_exclusive.checked_add(1)?;
        let mut issued = None;
        // fetch_update retries until no other caller raced us
        let _ = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                issued = last.checked_add(1).map(|next| next.max(now).max(floor));
                issued
            });
        issued
    }
}

/// Repository for task records.
pub struct TaskRepository {
    store: Store,
    latency: Latency,
    ids: IdAllocator,
    /// Serializes read-modify-write cycles on the collection.
    write_lock: Mutex<()>,
}

impl TaskRepository {
    /// Create the repository, seeding sample tasks into an empty store.
    pub fn new(store: Store, latency: Latency) -> Self {
        let repo = Self::without_seed(store, latency);
        repo.seed_sample_data();
        repo
    }

    /// Create the repository without touching the stored collection.
    pub fn without_seed(store: Store, latency: Latency) -> Self {
        Self {
            store,
            latency,
            ids: IdAllocator::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Write the sample tasks if the stored collection is missing or empty.
    /// Returns `true` if anything was written.
    pub fn seed_sample_data(&self) -> bool {
        let existing = self.store.get::<Vec<Value>>(TASKS_KEY);
        if existing.is_some_and(|records| !records.is_empty()) {
            return false;
        }
        let tasks = seed::sample_tasks(Utc::now());
        let written = self.store.set(TASKS_KEY, &tasks);
        if written {
            info!(count = tasks.len(), "Seeded sample tasks");
        }
        written
    }

    /// Overdue check against the current time.
    pub fn is_overdue(task: &Task) -> bool {
        task.is_overdue()
    }

    fn persist(&self, records: &[Value]) {
        if !self.store.set(TASKS_KEY, records) {
            warn!("Task collection not persisted; change kept in memory only");
        }
    }
}

/// A timestamp strictly later than `previous`.
fn touch(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}

#[async_trait]
impl TaskSource for TaskRepository {
    async fn list_all(&self) -> ServiceResult<Vec<Task>> {
        Latency::pause(self.latency.list).await;
        let tasks: Vec<Task> = materialize(TASKS_KEY, load_records(&self.store, TASKS_KEY));
        debug!(count = tasks.len(), "Listed tasks");
        Ok(tasks)
    }

    async fn get_by_id(&self, id: TaskId) -> ServiceResult<Task> {
        Latency::pause(self.latency.get).await;
        load_records(&self.store, TASKS_KEY)
            .into_iter()
            .find(|record| record_id(record) == Some(id))
            .and_then(|record| serde_json::from_value::<Task>(record).ok())
            .ok_or_else(|| ServiceError::task_not_found(id))
    }

    async fn create(&self, draft: TaskDraft) -> ServiceResult<Task> {
        Latency::pause(self.latency.write).await;
        let _guard = self.write_lock.lock().await;

        let mut records = load_records(&self.store, TASKS_KEY);
        let max_existing = records.iter().filter_map(record_id).max().unwrap_or(0);
        let id = self
            .ids
            .next(max_existing)
            .ok_or_else(|| ServiceError::internal("task id space exhausted"))?;
        let task = draft.into_task(id, Utc::now());

        records.push(serde_json::to_value(&task).map_err(ServiceError::internal)?);
        self.persist(&records);

        debug!(task_id = id, title = %task.title, "Task created");
        Ok(task)
    }

    async fn update(&self, id: TaskId, task: Task) -> ServiceResult<Task> {
        Latency::pause(self.latency.write).await;
        let _guard = self.write_lock.lock().await;

        let mut records = load_records(&self.store, TASKS_KEY);
        let index = records
            .iter()
            .position(|record| record_id(record) == Some(id))
            .ok_or_else(|| ServiceError::task_not_found(id))?;

        let previous = serde_json::from_value::<Task>(records[index].clone()).ok();
        let mut task = task;
        task.id = id;
        if let Some(prev) = &previous {
            task.created_at = prev.created_at;
        }
        task.updated_at = touch(previous.map(|p| p.updated_at).or(Some(task.created_at)));
        task.normalize();

        records[index] = serde_json::to_value(&task).map_err(ServiceError::internal)?;
        self.persist(&records);

        debug!(task_id = id, status = task.status.as_str(), "Task updated");
        Ok(task)
    }

    async fn delete(&self, id: TaskId) -> ServiceResult<()> {
        Latency::pause(self.latency.write).await;
        let _guard = self.write_lock.lock().await;

        let mut records = load_records(&self.store, TASKS_KEY);
        let before = records.len();
        records.retain(|record| record_id(record) != Some(id));
        self.persist(&records);

        debug!(task_id = id, removed = before - records.len(), "Task deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_never_repeats_within_a_millisecond() {
        let ids = IdAllocator::new();
        let issued: Vec<i64> = (0..1000).map(|_| ids.next(0).unwrap()).collect();
        for pair in issued.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn allocator_respects_floor() {
        let ids = IdAllocator::new();
        let far_future = now_ms() + 1_000_000;
        assert_eq!(ids.next(far_future), Some(far_future + 1));
        assert_eq!(ids.next(0), Some(far_future + 2));
    }

    #[test]
    fn allocator_reports_exhausted_id_space() {
        let ids = IdAllocator::new();
        assert_eq!(ids.next(i64::MAX), None);

        assert_eq!(ids.next(i64::MAX - 1), Some(i64::MAX));
        assert_eq!(ids.next(0), None);
    }

    #[test]
    fn touch_is_strictly_later() {
        let future = Utc::now() + Duration::seconds(60);
        assert!(touch(Some(future)) > future);
        assert!(touch(None) <= Utc::now());
    }

    #[test]
    fn seeding_is_idempotent() {
        let store = Store::in_memory();
        let repo = TaskRepository::without_seed(store.clone(), Latency::none());
        assert!(repo.seed_sample_data());
        assert!(!repo.seed_sample_data());
        assert_eq!(store.get::<Vec<Value>>(TASKS_KEY).unwrap().len(), 5);
    }

    #[test]
    fn empty_collection_is_reseeded() {
        let store = Store::in_memory();
        store.set(TASKS_KEY, &Vec::<Value>::new());
        let _repo = TaskRepository::new(store.clone(), Latency::none());
        assert_eq!(store.get::<Vec<Value>>(TASKS_KEY).unwrap().len(), 5);
    }
}
