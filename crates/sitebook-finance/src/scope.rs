//! Which timeline entries an aggregation covers.

use chrono::NaiveDate;

use sitebook_models::{ProjectId, TimelineEntry};

/// Aggregation scope: the whole dashboard, one project, and/or a date range.
///
/// Date bounds are inclusive. With a date bound set, entries without a
/// date fall outside the scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub project_id: Option<ProjectId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Scope {
    /// The whole dashboard.
    pub fn all() -> Self {
        Self::default()
    }

    /// A single project.
    pub fn project(project_id: impl Into<ProjectId>) -> Self {
        Self::default().with_project_id(project_id)
    }

    pub fn with_project_id(mut self, project_id: impl Into<ProjectId>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_from(mut self, from: NaiveDate) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_to(mut self, to: NaiveDate) -> Self {
        self.to = Some(to);
        self
    }

    /// Returns true if the entry falls inside this scope.
    pub fn matches(&self, entry: &TimelineEntry) -> bool {
        if let Some(ref project_id) = self.project_id {
            if !entry.belongs_to(project_id) {
                return false;
            }
        }

        if self.from.is_some() || self.to.is_some() {
            let Some(date) = entry.date else {
                return false;
            };
            if self.from.is_some_and(|from| date < from) {
                return false;
            }
            if self.to.is_some_and(|to| date > to) {
                return false;
            }
        }

        true
    }
}
