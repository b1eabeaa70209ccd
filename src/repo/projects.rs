//! Read access to the `projects` collection.

use super::{Latency, ProjectSource, load_records, materialize, record_id, seed};
use crate::error::{ServiceError, ServiceResult};
use crate::store::{PROJECTS_KEY, Store};
use crate::types::{Project, ProjectId};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

/// Repository for project records.
pub struct ProjectRepository {
    store: Store,
    latency: Latency,
}

impl ProjectRepository {
    /// Create the repository, seeding sample projects into an empty store.
    pub fn new(store: Store, latency: Latency) -> Self {
        let repo = Self::without_seed(store, latency);
        repo.seed_sample_data();
        repo
    }

    pub fn without_seed(store: Store, latency: Latency) -> Self {
        Self { store, latency }
    }

    /// Write the sample projects if the stored collection is missing or
    /// empty. Returns `true` if anything was written.
    pub fn seed_sample_data(&self) -> bool {
        let existing = self.store.get::<Vec<Value>>(PROJECTS_KEY);
        if existing.is_some_and(|records| !records.is_empty()) {
            return false;
        }
        let projects = seed::sample_projects();
        let written = self.store.set(PROJECTS_KEY, &projects);
        if written {
            info!(count = projects.len(), "Seeded sample projects");
        }
        written
    }
}

#[async_trait]
impl ProjectSource for ProjectRepository {
    async fn list_all(&self) -> ServiceResult<Vec<Project>> {
        Latency::pause(self.latency.list).await;
        let projects: Vec<Project> =
            materialize(PROJECTS_KEY, load_records(&self.store, PROJECTS_KEY));
        debug!(count = projects.len(), "Listed projects");
        Ok(projects)
    }

    async fn get_by_id(&self, id: ProjectId) -> ServiceResult<Project> {
        Latency::pause(self.latency.get).await;
        load_records(&self.store, PROJECTS_KEY)
            .into_iter()
            .find(|record| record_id(record) == Some(id))
            .and_then(|record| serde_json::from_value::<Project>(record).ok())
            .ok_or_else(|| ServiceError::project_not_found(id))
    }
}
