//! Application wiring.
//!
//! The store and repositories are built once at startup and handed to the
//! views explicitly.

use crate::config::{BackendKind, Config};
use crate::db::Database;
use crate::repo::{ProjectRepository, ProjectSource, TaskRepository, TaskSource};
use crate::store::{Backend, MemoryBackend, Store};
use crate::view::{FormMode, ProjectListView, TaskFormView, TaskListView};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Shared services for every screen.
#[derive(Clone)]
pub struct AppContext {
    pub store: Store,
    pub tasks: Arc<TaskRepository>,
    pub projects: Arc<ProjectRepository>,
}

impl AppContext {
    /// Open the configured backend and build the repositories.
    pub fn open(config: &Config) -> Result<Self> {
        let backend: Arc<dyn Backend> = match config.store.backend {
            BackendKind::Sqlite => {
                config.ensure_db_dir()?;
                info!(path = %config.store.db_path.display(), "Opening task store");
                Arc::new(Database::open(&config.store.db_path)?)
            }
            BackendKind::Memory => {
                info!("Using in-memory task store");
                Arc::new(MemoryBackend::new())
            }
        };
        Ok(Self::with_store(Store::new(backend), config))
    }

    /// Build the repositories over an existing store.
    pub fn with_store(store: Store, config: &Config) -> Self {
        let latency = config.latency.to_latency();
        let (tasks, projects) = if config.seed_sample_data {
            (
                TaskRepository::new(store.clone(), latency),
                ProjectRepository::new(store.clone(), latency),
            )
        } else {
            (
                TaskRepository::without_seed(store.clone(), latency),
                ProjectRepository::without_seed(store.clone(), latency),
            )
        };

        Self {
            store,
            tasks: Arc::new(tasks),
            projects: Arc::new(projects),
        }
    }

    pub fn task_source(&self) -> Arc<dyn TaskSource> {
        self.tasks.clone()
    }

    pub fn project_source(&self) -> Arc<dyn ProjectSource> {
        self.projects.clone()
    }

    pub fn task_list(&self) -> TaskListView {
        TaskListView::new(self.task_source())
    }

    pub fn project_list(&self) -> ProjectListView {
        ProjectListView::new(self.project_source(), self.task_source())
    }

    pub fn task_form(&self, mode: FormMode) -> TaskFormView {
        TaskFormView::new(mode, self.task_source(), self.project_source())
    }
}
