//! Timeline entry storage, grouped by project.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use sitebook_models::{ProjectId, TimelineEntry, TimelineId};

use crate::atomic::{atomic_write_json, ensure_dir, read_json, remove_if_exists};
use crate::error::{PersistenceError, Result};
use crate::project_store::{file_stem, json_files};

/// Directory for entries that reference no project. `_` is always escaped
/// in project directory names, so no project can land here.
const UNASSIGNED_DIR: &str = "_unassigned";

/// Stores one JSON file per timeline entry:
/// ```text
/// base_path/
/// └── timelines/
///     ├── proj-1b9d.../
///     │   ├── tl-02aa....json
///     │   └── tl-9f01....json
///     └── _unassigned/
///         └── tl-77c3....json
/// ```
pub struct TimelineStore {
    base_path: PathBuf,
}

impl TimelineStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn timelines_dir(&self) -> PathBuf {
        self.base_path.join("timelines")
    }

    fn project_dir(&self, project_id: Option<&ProjectId>) -> PathBuf {
        match project_id {
            Some(id) => self.timelines_dir().join(file_stem(id.as_str())),
            None => self.timelines_dir().join(UNASSIGNED_DIR),
        }
    }

    fn entry_path(&self, entry: &TimelineEntry) -> PathBuf {
        self.project_dir(entry.project_id.as_ref())
            .join(format!("{}.json", file_stem(entry.id.as_str())))
    }

    /// Every per-project directory currently on disk.
    fn project_dirs(&self) -> Result<Vec<PathBuf>> {
        let root = self.timelines_dir();
        if !root.exists() {
            return Ok(Vec::new());
        }
        let read_err = |source| PersistenceError::Read {
            path: root.clone(),
            source,
        };

        let mut dirs = Vec::new();
        for entry in fs::read_dir(&root).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Finds the file holding `id`, whichever project it is filed under.
    fn locate(&self, id: &TimelineId) -> Result<Option<PathBuf>> {
        let file_name = format!("{}.json", file_stem(id.as_str()));
        Ok(self
            .project_dirs()?
            .into_iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.exists()))
    }

    /// Writes an entry under its project's directory.
    ///
    /// An entry moved to another project leaves no copy behind.
    pub fn save(&self, entry: &TimelineEntry) -> Result<()> {
        let path = self.entry_path(entry);
        if let Some(previous) = self.locate(&entry.id)? {
            if previous != path {
                remove_if_exists(&previous)?;
            }
        }

        ensure_dir(&self.project_dir(entry.project_id.as_ref()))?;
        atomic_write_json(&path, entry)?;
        debug!(id = %entry.id, "Saved timeline entry");
        Ok(())
    }

    pub fn load(&self, id: &TimelineId) -> Result<TimelineEntry> {
        match self.locate(id)? {
            Some(path) => read_json(&path),
            None => Err(PersistenceError::NotFound {
                kind: "timeline entry",
                id: id.to_string(),
            }),
        }
    }

    /// Loads entries, all of them or one project's, ordered by date then ID.
    ///
    /// Undated entries sort last. Unreadable files are logged and skipped.
    pub fn list(&self, project_id: Option<&ProjectId>) -> Result<Vec<TimelineEntry>> {
        let dirs = match project_id {
            Some(_) => vec![self.project_dir(project_id)],
            None => self.project_dirs()?,
        };

        let mut entries = Vec::new();
        for dir in dirs {
            entries.extend(read_dir_entries(&dir)?);
        }

        entries.sort_by(|a, b| {
            let by_date = match (a.date, b.date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            by_date.then_with(|| a.id.cmp(&b.id))
        });
        Ok(entries)
    }

    /// Deletes one entry. Returns whether it existed.
    pub fn delete(&self, id: &TimelineId) -> Result<bool> {
        match self.locate(id)? {
            Some(path) => remove_if_exists(&path),
            None => Ok(false),
        }
    }

    /// Deletes every entry filed under a project. Returns how many went.
    pub fn delete_for_project(&self, project_id: &ProjectId) -> Result<usize> {
        let dir = self.project_dir(Some(project_id));
        let mut removed = 0;
        for path in json_files(&dir)? {
            if remove_if_exists(&path)? {
                removed += 1;
            }
        }
        if dir.exists() {
            let _ = fs::remove_dir(&dir);
        }
        Ok(removed)
    }
}

fn read_dir_entries(dir: &Path) -> Result<Vec<TimelineEntry>> {
    let mut entries = Vec::new();
    for path in json_files(dir)? {
        match read_json::<TimelineEntry>(&path) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable timeline entry"),
        }
    }
    Ok(entries)
}
