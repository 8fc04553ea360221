//! The seam between record consumers and wherever records live.

use crate::ids::{ProjectId, TimelineId};
use crate::project::Project;
use crate::timeline::TimelineEntry;

/// Read/write access to projects and timeline entries.
///
/// Implemented by the local file store and by the backend client, so the
/// same commands run against either.
pub trait RecordStore {
    /// Error raised by the underlying storage or transport.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns every project.
    fn list_projects(&self) -> Result<Vec<Project>, Self::Error>;

    /// Returns timeline entries, optionally only those of one project.
    fn list_timelines(&self, project_id: Option<&ProjectId>)
        -> Result<Vec<TimelineEntry>, Self::Error>;

    /// Stores a new project and returns it as stored.
    fn create_project(&self, project: &Project) -> Result<Project, Self::Error>;

    /// Replaces an existing project and returns it as stored.
    fn update_project(&self, project: &Project) -> Result<Project, Self::Error>;

    fn delete_project(&self, id: &ProjectId) -> Result<(), Self::Error>;

    /// Stores a new timeline entry and returns it as stored.
    fn create_timeline(&self, entry: &TimelineEntry) -> Result<TimelineEntry, Self::Error>;

    fn delete_timeline(&self, id: &TimelineId) -> Result<(), Self::Error>;

    /// Finds a project by ID or code.
    fn find_project(&self, key: &str) -> Result<Option<Project>, Self::Error> {
        Ok(self
            .list_projects()?
            .into_iter()
            .find(|p| p.matches_key(key)))
    }
}
