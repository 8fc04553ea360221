//! Core records for SiteBook.
//!
//! Projects, the daily timeline entries recorded against them, and the
//! lenient decoding rules that keep hand-entered data loadable.

pub mod builders;
pub mod ids;
pub mod lenient;
pub mod project;
pub mod source;
pub mod timeline;

pub use builders::TimelineEntryBuilder;
pub use ids::{ProjectId, TimelineId};
pub use project::{Owner, Project, ProjectPriority, ProjectStatus};
pub use source::RecordStore;
pub use timeline::{
    Architect, Engineer, Expense, Material, ProjectManager, TimelineEntry, Tool, Worker,
};
