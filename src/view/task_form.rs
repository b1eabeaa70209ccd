//! Task create/edit form.

use super::{Phase, ViewState};
use crate::error::{ServiceError, ServiceResult};
use crate::repo::{ProjectSource, TaskSource};
use crate::types::{Project, Task, TaskDraft, TaskId};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Whether the form creates a new task or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    Edit(TaskId),
}

/// State of the task form.
#[derive(Debug, Clone, Default)]
pub struct TaskFormState {
    pub phase: Phase,
    pub mode: FormMode,
    /// Working copy of the editable fields.
    pub draft: TaskDraft,
    /// The stored task being edited.
    pub original: Option<Task>,
    /// Project choices.
    pub projects: Vec<Project>,
    /// Inline validation message; no repository call was made.
    pub validation: Option<String>,
    /// Form-level error from loading or saving.
    pub error: Option<String>,
    /// The task as persisted by the last successful save.
    pub saved: Option<Task>,
}

pub struct TaskFormView {
    tasks: Arc<dyn TaskSource>,
    projects: Arc<dyn ProjectSource>,
    state: ViewState<TaskFormState>,
}

impl TaskFormView {
    pub fn new(
        mode: FormMode,
        tasks: Arc<dyn TaskSource>,
        projects: Arc<dyn ProjectSource>,
    ) -> Self {
        Self {
            tasks,
            projects,
            state: ViewState::new(TaskFormState {
                mode,
                ..TaskFormState::default()
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskFormState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> TaskFormState {
        self.state.snapshot()
    }

    /// Load project choices and, when editing, the task itself. Failing to
    /// load projects leaves the choice list empty; failing to load the task
    /// fails the form.
    pub async fn open(&self) -> Phase {
        let mode = self.state.snapshot().mode;
        self.state.update(|s| {
            s.phase = Phase::Loading;
            s.error = None;
        });

        let (projects, task) = match mode {
            FormMode::Create => (self.projects.list_all().await, None),
            FormMode::Edit(id) => {
                let (projects, task) =
                    tokio::join!(self.projects.list_all(), self.tasks.get_by_id(id));
                (projects, Some(task))
            }
        };

        let projects = projects.unwrap_or_else(|e| {
            warn!(error = %e, "Error loading project choices");
            Vec::new()
        });

        match task {
            None => {
                self.state.update(|s| {
                    s.projects = projects;
                    s.draft = TaskDraft::default();
                    s.phase = Phase::Ready;
                });
                Phase::Ready
            }
            Some(Ok(task)) => {
                self.state.update(|s| {
                    s.projects = projects;
                    s.draft = task.to_draft();
                    s.original = Some(task);
                    s.phase = Phase::Ready;
                });
                Phase::Ready
            }
            Some(Err(e)) => {
                warn!(error = %e, "Error loading task for editing");
                self.state.update(|s| {
                    s.projects = projects;
                    s.phase = Phase::Failed;
                    s.error = Some(format!("Failed to load task: {}", e));
                });
                Phase::Failed
            }
        }
    }

    /// Change the working copy.
    pub fn edit(&self, f: impl FnOnce(&mut TaskDraft)) {
        self.state.update(|s| {
            f(&mut s.draft);
            s.validation = None;
        });
    }

    /// Validate, then create or replace the task.
    pub async fn save(&self) -> ServiceResult<Task> {
        let current = self.state.snapshot();

        if let Err(e) = validate(&current.draft) {
            self.state.update(|s| s.validation = Some(e.message.clone()));
            return Err(e);
        }

        self.state.update(|s| {
            s.phase = Phase::Loading;
            s.validation = None;
            s.error = None;
        });

        let result = match current.mode {
            FormMode::Create => self.tasks.create(current.draft).await,
            FormMode::Edit(id) => match current.original {
                Some(mut task) => {
                    task.apply_draft(current.draft);
                    self.tasks.update(id, task).await
                }
                None => Err(ServiceError::task_not_found(id)),
            },
        };

        match result {
            Ok(task) => {
                debug!(task_id = task.id, "Task saved");
                self.state.update(|s| {
                    s.original = Some(task.clone());
                    s.saved = Some(task.clone());
                    s.phase = Phase::Saved;
                });
                Ok(task)
            }
            Err(e) => {
                warn!(error = %e, "Failed to save task");
                self.state.update(|s| {
                    s.phase = Phase::Ready;
                    s.error = Some(format!("Failed to save task: {}", e));
                });
                Err(e)
            }
        }
    }
}

/// Preconditions checked before any repository call. A title made only of
/// whitespace counts as missing.
pub fn validate(draft: &TaskDraft) -> ServiceResult<()> {
    if draft.title.trim().is_empty() {
        return Err(ServiceError::missing_field("title"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        assert!(validate(&TaskDraft::default()).unwrap_err().is_validation());
        assert!(validate(&TaskDraft::titled("   ")).is_err());
        assert!(validate(&TaskDraft::titled("Write docs")).is_ok());
    }
}
