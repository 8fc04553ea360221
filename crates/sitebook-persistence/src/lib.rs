//! Local JSON storage for SiteBook.
//!
//! Every record is one pretty-printed JSON file, written atomically:
//!
//! ```text
//! ~/.sitebook/
//! ├── projects/
//! │   └── proj-....json
//! └── timelines/
//!     └── proj-.../
//!         └── tl-....json
//! ```
//!
//! # Example
//!
//! ```no_run
//! use sitebook_models::{Project, RecordStore};
//! use sitebook_persistence::LocalStore;
//!
//! let store = LocalStore::open("/tmp/sitebook");
//! store.create_project(&Project::new("TWR-01", "Tower"))?;
//! assert_eq!(store.list_projects()?.len(), 1);
//! # Ok::<(), sitebook_persistence::PersistenceError>(())
//! ```

pub mod atomic;
pub mod error;
pub mod local;
pub mod project_store;
pub mod timeline_store;

pub use atomic::{atomic_write, atomic_write_json, ensure_dir, read_json, read_json_optional};
pub use error::{PersistenceError, Result};
pub use local::LocalStore;
pub use project_store::ProjectStore;
pub use timeline_store::TimelineStore;
