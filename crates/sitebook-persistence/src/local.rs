//! File-backed [`RecordStore`].

use std::path::{Path, PathBuf};

use tracing::info;

use sitebook_models::{Project, ProjectId, RecordStore, TimelineEntry, TimelineId};

use crate::error::{PersistenceError, Result};
use crate::project_store::ProjectStore;
use crate::timeline_store::TimelineStore;

/// Projects and timelines kept as JSON files under one state directory.
pub struct LocalStore {
    base_path: PathBuf,
    projects: ProjectStore,
    timelines: TimelineStore,
}

impl LocalStore {
    /// Opens (without creating) a store rooted at `base_path`.
    pub fn open(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        Self {
            projects: ProjectStore::new(&base_path),
            timelines: TimelineStore::new(&base_path),
            base_path,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    pub fn timelines(&self) -> &TimelineStore {
        &self.timelines
    }
}

impl RecordStore for LocalStore {
    type Error = PersistenceError;

    fn list_projects(&self) -> Result<Vec<Project>> {
        self.projects.list()
    }

    fn list_timelines(&self, project_id: Option<&ProjectId>) -> Result<Vec<TimelineEntry>> {
        self.timelines.list(project_id)
    }

    fn create_project(&self, project: &Project) -> Result<Project> {
        self.projects.insert(project)?;
        info!(id = %project.id, code = %project.code, "Created project");
        Ok(project.clone())
    }

    fn update_project(&self, project: &Project) -> Result<Project> {
        // Fails with NotFound for unknown IDs.
        self.projects.load(&project.id)?;
        self.projects.save(project)?;
        Ok(project.clone())
    }

    /// Deletes the project together with its timeline entries.
    fn delete_project(&self, id: &ProjectId) -> Result<()> {
        if !self.projects.delete(id)? {
            return Err(PersistenceError::NotFound {
                kind: "project",
                id: id.to_string(),
            });
        }
        let removed = self.timelines.delete_for_project(id)?;
        info!(id = %id, timelines = removed, "Deleted project");
        Ok(())
    }

    fn create_timeline(&self, entry: &TimelineEntry) -> Result<TimelineEntry> {
        if let Some(project_id) = &entry.project_id {
            self.projects.load(project_id)?;
        }
        self.timelines.save(entry)?;
        info!(id = %entry.id, "Created timeline entry");
        Ok(entry.clone())
    }

    fn delete_timeline(&self, id: &TimelineId) -> Result<()> {
        if self.timelines.delete(id)? {
            Ok(())
        } else {
            Err(PersistenceError::NotFound {
                kind: "timeline entry",
                id: id.to_string(),
            })
        }
    }

    fn find_project(&self, key: &str) -> Result<Option<Project>> {
        self.projects.find(key)
    }
}
