//! Project list screen with per-project task statistics.

use super::{Phase, ViewState};
use crate::repo::{ProjectSource, TaskSource};
use crate::stats::{TaskStats, project_stats};
use crate::types::{Project, ProjectId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Statistics slot for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectStatsEntry {
    Loading,
    Ready(TaskStats),
    Failed(String),
}

/// State of the project list screen.
#[derive(Debug, Clone, Default)]
pub struct ProjectListState {
    pub phase: Phase,
    pub projects: Vec<Project>,
    pub stats: BTreeMap<ProjectId, ProjectStatsEntry>,
    pub error: Option<String>,
}

impl ProjectListState {
    /// Number of projects whose stats have not arrived yet.
    pub fn pending_stats(&self) -> usize {
        self.stats
            .values()
            .filter(|e| matches!(e, ProjectStatsEntry::Loading))
            .count()
    }
}

pub struct ProjectListView {
    projects: Arc<dyn ProjectSource>,
    tasks: Arc<dyn TaskSource>,
    state: ViewState<ProjectListState>,
}

impl ProjectListView {
    pub fn new(projects: Arc<dyn ProjectSource>, tasks: Arc<dyn TaskSource>) -> Self {
        Self {
            projects,
            tasks,
            state: ViewState::default(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProjectListState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ProjectListState {
        self.state.snapshot()
    }

    /// Load the projects, then every project's stats concurrently. The list
    /// is shown as soon as it arrives; each project's stats fill in, or fail,
    /// on their own.
    pub async fn load(&self) -> Phase {
        self.state.update(|s| {
            s.phase = Phase::Loading;
            s.error = None;
        });

        let projects = match self.projects.list_all().await {
            Ok(projects) => projects,
            Err(e) => {
                warn!(error = %e, "Error loading projects");
                self.state.update(|s| {
                    s.phase = Phase::Failed;
                    s.error = Some(format!("Failed to load projects: {}", e));
                });
                return Phase::Failed;
            }
        };

        let ids: Vec<ProjectId> = projects.iter().map(|p| p.id).collect();
        self.state.update(|s| {
            s.stats = ids
                .iter()
                .map(|id| (*id, ProjectStatsEntry::Loading))
                .collect();
            s.projects = projects;
            s.phase = Phase::Ready;
        });

        let mut set = JoinSet::new();
        let mut owners = HashMap::new();
        for project_id in ids {
            let tasks = Arc::clone(&self.tasks);
            let handle = set.spawn(async move { project_stats(tasks.as_ref(), project_id).await });
            owners.insert(handle.id(), project_id);
        }

        while let Some(joined) = set.join_next_with_id().await {
            let (task_id, outcome) = match joined {
                Ok((task_id, result)) => (task_id, result.map(|ps| ps.stats).map_err(|e| e.to_string())),
                Err(join_err) => (join_err.id(), Err(join_err.to_string())),
            };
            let Some(project_id) = owners.get(&task_id).copied() else {
                continue;
            };
            let entry = match outcome {
                Ok(stats) => ProjectStatsEntry::Ready(stats),
                Err(message) => {
                    warn!(project_id, error = %message, "Error loading project stats");
                    ProjectStatsEntry::Failed(message)
                }
            };
            debug!(project_id, "Project stats settled");
            self.state.update(|s| {
                s.stats.insert(project_id, entry);
            });
        }

        Phase::Ready
    }
}
