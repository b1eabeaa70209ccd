//! Task list screen: list + stats, filtering, delete and completion toggle.

use super::{Confirm, Phase, TaskFilter, ViewState};
use crate::error::{ServiceError, ServiceResult};
use crate::repo::TaskSource;
use crate::stats::TaskStats;
use crate::types::{Task, TaskId};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this task?";

/// State of the task list screen.
#[derive(Debug, Clone, Default)]
pub struct TaskListState {
    pub phase: Phase,
    /// Last successfully loaded collection.
    pub tasks: Vec<Task>,
    /// `tasks` narrowed by `filter`.
    pub visible: Vec<Task>,
    pub filter: TaskFilter,
    pub stats: Option<TaskStats>,
    pub error: Option<String>,
}

impl TaskListState {
    fn refilter(&mut self) {
        self.visible = self.filter.apply(&self.tasks);
    }
}

pub struct TaskListView {
    tasks: Arc<dyn TaskSource>,
    state: ViewState<TaskListState>,
}

impl TaskListView {
    pub fn new(tasks: Arc<dyn TaskSource>) -> Self {
        Self {
            tasks,
            state: ViewState::default(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskListState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> TaskListState {
        self.state.snapshot()
    }

    /// Fetch the task list and stats concurrently; ready only once both
    /// have arrived.
    pub async fn load(&self) -> Phase {
        self.state.update(|s| {
            s.phase = Phase::Loading;
            s.error = None;
        });

        let (list, stats) = tokio::join!(self.tasks.list_all(), self.tasks.stats());

        match (list, stats) {
            (Ok(tasks), Ok(stats)) => {
                debug!(count = tasks.len(), "Task list loaded");
                self.state.update(|s| {
                    s.tasks = tasks;
                    s.stats = Some(stats);
                    s.refilter();
                    s.phase = Phase::Ready;
                });
                Phase::Ready
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Error loading tasks");
                self.state.update(|s| {
                    s.phase = Phase::Failed;
                    s.error = Some(format!("Failed to load tasks: {}", e));
                });
                Phase::Failed
            }
        }
    }

    /// Replace the filter. Filters the loaded collection; no fetch.
    pub fn set_filter(&self, filter: TaskFilter) {
        self.state.update(|s| {
            s.filter = filter;
            s.refilter();
        });
    }

    pub fn clear_filter(&self) {
        self.set_filter(TaskFilter::default());
    }

    /// Delete after confirmation, then reload list and stats. Returns
    /// whether the task was deleted.
    pub async fn delete(&self, id: TaskId, confirm: &dyn Confirm) -> bool {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!(task_id = id, "Delete cancelled");
            return false;
        }

        self.state.update(|s| s.phase = Phase::Loading);
        match self.tasks.delete(id).await {
            Ok(()) => {
                self.load().await;
                true
            }
            Err(e) => {
                warn!(task_id = id, error = %e, "Failed to delete task");
                self.state.update(|s| {
                    s.phase = Phase::Ready;
                    s.error = Some(format!("Failed to delete task: {}", e));
                });
                false
            }
        }
    }

    /// Flip a loaded task between completed and pending, persist it, then
    /// refresh the stats.
    pub async fn toggle_completion(&self, id: TaskId) -> ServiceResult<Task> {
        let Some(mut task) = self.state.snapshot().tasks.into_iter().find(|t| t.id == id) else {
            let e = ServiceError::task_not_found(id);
            warn!(task_id = id, "Toggled task is not in the loaded list");
            self.state
                .update(|s| s.error = Some(format!("Failed to update task: {}", e)));
            return Err(e);
        };
        task.toggle_completion();

        self.state.update(|s| s.phase = Phase::Loading);
        let updated = match self.tasks.update(id, task).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!(task_id = id, error = %e, "Failed to update task");
                self.state.update(|s| {
                    s.phase = Phase::Ready;
                    s.error = Some(format!("Failed to update task: {}", e));
                });
                return Err(e);
            }
        };

        self.state.update(|s| {
            if let Some(slot) = s.tasks.iter_mut().find(|t| t.id == id) {
                *slot = updated.clone();
            }
            s.refilter();
        });
        self.refresh_stats().await;
        Ok(updated)
    }

    async fn refresh_stats(&self) {
        match self.tasks.stats().await {
            Ok(stats) => self.state.update(|s| {
                s.stats = Some(stats);
                s.phase = Phase::Ready;
            }),
            Err(e) => {
                warn!(error = %e, "Error loading task stats");
                self.state.update(|s| {
                    s.phase = Phase::Ready;
                    s.error = Some(format!("Failed to load stats: {}", e));
                });
            }
        }
    }
}
